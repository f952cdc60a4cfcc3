//! `waypost-cache` – the two-tier lookup cache.
//!
//! Answers free-form guest questions against a small catalog fast enough
//! for a live, spoken conversation.
//!
//! # Modules
//!
//! - [`query`] – the spoken-query token pipeline: normalisation, typo
//!   correction against a closed vocabulary, and synonym expansion.
//! - [`volatile`] – [`VolatileCache`][volatile::VolatileCache]: the L1
//!   tier, a capacity-bounded TTL/LRU map safe for concurrent callers.
//! - [`store`] – [`CatalogStore`][store::CatalogStore]: the persistent L2
//!   tier over SQLite FTS5 with BM25-ranked matching, plus the
//!   [`CatalogRepository`][store::CatalogRepository] /
//!   [`CatalogWriter`][store::CatalogWriter] seams.
//! - [`coordinator`] – [`CacheCoordinator`][coordinator::CacheCoordinator]:
//!   preload-on-start, invalidate-on-sync, and L1 → L2 lookup routing.
//! - [`sync`] – the versioned sync ingress
//!   ([`CacheCoordinator::apply_sync`][coordinator::CacheCoordinator::apply_sync]).
//!
//! # Tiering
//!
//! | tier | store | expiry | sharing |
//! |---|---|---|---|
//! | L1 | in-process map | write-time TTL + LRU capacity bound | `Arc`, mutex-guarded |
//! | L2 | SQLite FTS5 | replaced wholesale per sync generation | one connection per worker context, never shared |

pub mod coordinator;
pub mod query;
pub mod store;
pub mod sync;
pub mod volatile;

pub use coordinator::{CacheCoordinator, CachedValue, CoordinatorConfig};
pub use store::{CatalogRepository, CatalogStore, CatalogWriter, StoreError};
pub use volatile::{CacheStats, VolatileCache};
