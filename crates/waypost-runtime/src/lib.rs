//! `waypost-runtime` – the interaction engine.
//!
//! Sits between the conversational front-end (an external collaborator)
//! and the two-tier lookup cache, dispatching each guest utterance to a
//! closed set of tools and emitting interaction telemetry along the way.
//!
//! # Modules
//!
//! - [`tools`] – the closed [`ToolKind`][tools::ToolKind] set (lookup,
//!   promotion, engagement, movement) behind one uniform
//!   [`execute`][tools::execute] dispatch, the keyword intent classifier,
//!   and the [`GestureDriver`][tools::GestureDriver] seam to the robot
//!   body.
//! - [`llm`] – [`LlmClient`][llm::LlmClient]: an OpenAI-compatible
//!   chat-completions client. The core hands it a bounded top-K item
//!   context and passes the returned free text through unvalidated.
//! - [`service`] – [`EdgeService`][service::EdgeService]: the facade
//!   owning one persistent-tier handle per worker context, exposing the
//!   Lookup API (`search` / `lookup_best`), the Sync API, the interaction
//!   surface, and graceful shutdown (which drains telemetry once).

pub mod llm;
pub mod service;
pub mod tools;

pub use llm::{ChatMessage, LlmClient, LlmError, Role};
pub use service::{EdgeService, LlmConfig, ServiceConfig, ServiceError};
pub use tools::{GestureDriver, ToolContext, ToolError, ToolKind, ToolOutcome, UnitIdentity};

// Re-export the telemetry surface so embedders configure the forwarder
// without an additional explicit dependency on waypost-telemetry.
pub use waypost_telemetry::{EventSink, ForwarderConfig, StatsSnapshot};
