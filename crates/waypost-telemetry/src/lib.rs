//! `waypost-telemetry` – interaction telemetry plumbing.
//!
//! Every lookup path emits [`TelemetryEvent`][waypost_types::TelemetryEvent]s
//! toward the external analytics backend through a cheap [`EventSink`];
//! a single supervised background task batches them and POSTs each batch as
//! one JSON array with a bearer credential. Delivery is best-effort and
//! at-most-once: telemetry must never slow or fail a user-facing lookup.
//!
//! # Modules
//!
//! - [`forwarder`] – [`EventForwarder`]: the bounded intake queue, the
//!   size/interval batch loop, and the drain-once-on-shutdown contract.

pub mod forwarder;

pub use forwarder::{EventForwarder, EventSink, ForwarderConfig, ForwarderStats, StatsSnapshot};
