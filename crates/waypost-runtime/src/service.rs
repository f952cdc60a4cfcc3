//! [`EdgeService`] – the facade the conversational front-end talks to.
//!
//! Wires together the two-tier cache, the tool set, the telemetry
//! forwarder, and the optional LLM collaborator, and exposes the public
//! Lookup and Sync APIs.
//!
//! # Thread model
//!
//! An `EdgeService` owns its persistent-tier connection and therefore
//! belongs to exactly one worker context; open one service per context.
//! The volatile tier and the telemetry sink are the shareable halves — the
//! compiler enforces the rest (`CatalogStore` is `!Sync`).

use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use waypost_cache::coordinator::{CacheCoordinator, CoordinatorConfig};
use waypost_cache::store::{CatalogStore, StoreError};
use waypost_cache::volatile::{CacheStats, VolatileCache};
use waypost_telemetry::{EventForwarder, EventSink, ForwarderConfig, StatsSnapshot};
use waypost_types::{
    CatalogItem, EventKind, InteractionRequest, InteractionResponse, SyncPayload, SyncReport,
    TelemetryEvent,
};

use crate::llm::{self, ChatMessage, LlmClient, Role};
use crate::tools::{self, GestureDriver, ToolContext, ToolKind, UnitIdentity};

// ─────────────────────────────────────────────────────────────────────────────
// Error type and configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise while bringing the service up.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("persistent tier error: {0}")]
    Store(#[from] StoreError),
}

/// LLM collaborator endpoint settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
}

/// Configuration bundle for [`EdgeService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path of the persistent catalog store.
    pub db_path: std::path::PathBuf,
    /// Volatile tier capacity.
    pub l1_max_size: usize,
    /// Volatile tier write-time TTL.
    pub l1_ttl: Duration,
    /// How many most-recent records to preload on start and after sync.
    pub hot_items: usize,
    /// How many top-priority promotions to preload and serve.
    pub hot_promotions: usize,
    /// Default result-list bound for [`EdgeService::lookup_best`] callers.
    pub max_results: usize,
    pub identity: UnitIdentity,
    pub telemetry: ForwarderConfig,
    /// When `None`, tools answer with their canned responses only.
    pub llm: Option<LlmConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: std::path::PathBuf::from("./data/waypost.db"),
            l1_max_size: 1000,
            l1_ttl: Duration::from_secs(300),
            hot_items: 20,
            hot_promotions: 3,
            max_results: 5,
            identity: UnitIdentity::default(),
            telemetry: ForwarderConfig::default(),
            llm: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EdgeService
// ─────────────────────────────────────────────────────────────────────────────

const FALLBACK_RESPONSE: &str =
    "I'm having trouble with that. Let me get a staff member to help you.";

/// Hard bound on the LLM phrasing call; past this the canned response wins.
const LLM_TIMEOUT: Duration = Duration::from_secs(2);

/// The assistant's lookup/sync/interaction surface.
pub struct EdgeService {
    coordinator: CacheCoordinator<CatalogStore>,
    forwarder: EventForwarder,
    sink: EventSink,
    identity: UnitIdentity,
    llm: Option<LlmClient>,
    max_results: usize,
    gestures: Option<Box<dyn GestureDriver>>,
}

impl EdgeService {
    /// Open the persistent store at the configured path, preload the hot
    /// set, and start the telemetry worker (when enabled).
    ///
    /// Must be called within a tokio runtime when telemetry is enabled.
    pub fn open(config: ServiceConfig) -> Result<Self, ServiceError> {
        let store = CatalogStore::open(&config.db_path)?;
        Self::with_store(config, store)
    }

    /// Service over a temporary in-memory store (tests and demos).
    pub fn open_in_memory(config: ServiceConfig) -> Result<Self, ServiceError> {
        let store = CatalogStore::open_in_memory()?;
        Self::with_store(config, store)
    }

    fn with_store(config: ServiceConfig, store: CatalogStore) -> Result<Self, ServiceError> {
        let hot = Arc::new(VolatileCache::new(config.l1_max_size, config.l1_ttl));
        let coordinator = CacheCoordinator::new(
            store,
            hot,
            CoordinatorConfig {
                hot_items: config.hot_items,
                hot_promotions: config.hot_promotions,
            },
        );
        let preloaded = coordinator.preload()?;

        let forwarder = EventForwarder::spawn(config.telemetry);
        let sink = forwarder.sink();
        let llm = config
            .llm
            .map(|c| LlmClient::new(c.base_url, c.model));

        info!(
            unit_id = %config.identity.unit_id,
            preloaded,
            llm = llm.is_some(),
            "edge service ready"
        );

        Ok(Self {
            coordinator,
            forwarder,
            sink,
            identity: config.identity,
            llm,
            max_results: config.max_results,
            gestures: None,
        })
    }

    /// Install the robot-body gesture seam.
    pub fn set_gesture_driver(&mut self, driver: Box<dyn GestureDriver>) {
        self.gestures = Some(driver);
    }

    // ── Lookup API ────────────────────────────────────────────────────────────

    /// Ranked search. Never fails for malformed input: internal errors are
    /// logged, reported as an `error` telemetry event, and absorbed into an
    /// empty result.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<CatalogItem> {
        match self.coordinator.search(query, max_results) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, query, "search failed; returning empty result");
                self.emit_error(query, &e.to_string());
                Vec::new()
            }
        }
    }

    /// The single best match for `query`, if any.
    pub fn lookup_best(&self, query: &str) -> Option<CatalogItem> {
        self.search(query, self.max_results).into_iter().next()
    }

    // ── Interaction surface ───────────────────────────────────────────────────

    /// Classify the query, run the matching tool, and (when configured)
    /// hand the matched items to the LLM collaborator for phrasing.
    pub async fn interact(&self, request: InteractionRequest) -> InteractionResponse {
        let start = Instant::now();
        let kind = ToolKind::classify(&request.query);
        let ctx = ToolContext {
            coordinator: &self.coordinator,
            telemetry: &self.sink,
            identity: &self.identity,
            session_id: &request.session_id,
            gestures: self.gestures.as_deref(),
        };

        let outcome = match tools::execute(kind, &request.query, &ctx) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, tool = kind.name(), "tool execution failed");
                self.emit_error(&request.query, &e.to_string());
                return InteractionResponse {
                    response: FALLBACK_RESPONSE.to_string(),
                    intent: Some(kind.name().to_string()),
                    tool_used: Some(kind.name().to_string()),
                    latency_ms: elapsed_ms(start),
                    cache_hit: false,
                    metadata: None,
                };
            }
        };

        let mut response = outcome.response;
        if outcome.success && !outcome.items.is_empty() {
            if let Some(text) = self.phrase_with_llm(&request.query, &outcome.items).await {
                response = text;
            }
        }

        InteractionResponse {
            response,
            intent: Some(kind.name().to_string()),
            tool_used: Some(kind.name().to_string()),
            latency_ms: elapsed_ms(start),
            cache_hit: outcome.cache_hit,
            metadata: None,
        }
    }

    /// Pass the matched items across the LLM boundary. Failure falls back
    /// to the tool's canned response and never fails the lookup.
    async fn phrase_with_llm(&self, query: &str, items: &[CatalogItem]) -> Option<String> {
        let client = self.llm.as_ref()?;
        let messages = vec![
            ChatMessage {
                role: Role::System,
                content: llm::system_prompt(&self.identity.store_id),
            },
            ChatMessage {
                role: Role::User,
                content: format!(
                    "Guest asked: {query}\n\nMatched items:\n{}",
                    llm::item_context(items, 3)
                ),
            },
        ];
        match tokio::time::timeout(LLM_TIMEOUT, client.complete(&messages)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(error = %e, "LLM phrasing failed; using canned response");
                None
            }
            Err(_) => {
                warn!(timeout_ms = LLM_TIMEOUT.as_millis() as u64, "LLM phrasing timed out");
                None
            }
        }
    }

    // ── Sync API ─────────────────────────────────────────────────────────────

    /// Apply a versioned bulk update. See
    /// [`CacheCoordinator::apply_sync`] for the commit contract.
    pub fn apply_sync(&mut self, payload: SyncPayload) -> Result<SyncReport, StoreError> {
        self.coordinator.apply_sync(payload)
    }

    // ── Introspection ────────────────────────────────────────────────────────

    pub fn cache_stats(&self) -> CacheStats {
        self.coordinator.hot_stats()
    }

    pub fn telemetry_stats(&self) -> StatsSnapshot {
        self.forwarder.stats()
    }

    pub fn catalog_version(&self) -> Result<Option<String>, StoreError> {
        self.coordinator.repo().version()
    }

    pub fn catalog_size(&self) -> Result<usize, StoreError> {
        self.coordinator.repo().item_count()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Stop accepting flush cycles and drain the telemetry queue once.
    pub async fn shutdown(self) {
        self.forwarder.shutdown().await;
        info!("edge service shut down");
    }

    fn emit_error(&self, query: &str, detail: &str) {
        self.sink.emit(TelemetryEvent {
            kind: EventKind::Error,
            session_id: String::new(),
            timestamp: Utc::now(),
            unit_id: self.identity.unit_id.clone(),
            store_id: self.identity.store_id.clone(),
            zone_id: self.identity.zone_id.clone(),
            query: Some(query.to_string()),
            response: None,
            tool: None,
            latency_ms: None,
            metadata: Some(serde_json::json!({ "error": detail })),
        });
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: &str, name: &str, location: &str) -> CatalogItem {
        CatalogItem {
            sku: sku.to_string(),
            name: name.to_string(),
            category: "Fuel & Fluids".to_string(),
            location: location.to_string(),
            price: 3.89,
            description: format!("{} in stock", name.to_lowercase()),
            relevance: None,
        }
    }

    fn payload() -> SyncPayload {
        SyncPayload {
            version: "v1".to_string(),
            timestamp: Utc::now(),
            items: Some(vec![
                item("FUEL-DIESEL-001", "Premium Diesel Fuel", "Fuel Island 1"),
                item("SERV-SHOWER-001", "Shower Credit", "Service Desk"),
            ]),
            promotions: None,
            store_config: None,
        }
    }

    async fn service() -> EdgeService {
        let mut svc = EdgeService::open_in_memory(ServiceConfig::default()).unwrap();
        svc.apply_sync(payload()).unwrap();
        svc
    }

    #[tokio::test]
    async fn search_never_fails_on_malformed_input() {
        let svc = service().await;
        assert!(svc.search("", 5).is_empty());
        assert!(svc.search("   ", 5).is_empty());
        assert!(svc.search("test@#$%", 5).is_empty());
        svc.shutdown().await;
    }

    #[tokio::test]
    async fn lookup_best_returns_top_match() {
        let svc = service().await;
        let best = svc.lookup_best("where can I get diesel").unwrap();
        assert_eq!(best.sku, "FUEL-DIESEL-001");
        svc.shutdown().await;
    }

    #[tokio::test]
    async fn interact_answers_wayfinding_query() {
        let svc = service().await;
        let response = svc
            .interact(InteractionRequest {
                query: "where can I get diesel".to_string(),
                session_id: "session-1".to_string(),
                timestamp: Utc::now(),
            })
            .await;
        assert!(response.response.contains("Fuel Island 1"));
        assert_eq!(response.tool_used.as_deref(), Some("lookup"));
        assert!(!response.cache_hit);
        svc.shutdown().await;
    }

    #[tokio::test]
    async fn second_interaction_is_a_cache_hit() {
        let svc = service().await;
        let request = InteractionRequest {
            query: "diesel".to_string(),
            session_id: "session-1".to_string(),
            timestamp: Utc::now(),
        };
        let first = svc.interact(request.clone()).await;
        let second = svc.interact(request).await;
        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        svc.shutdown().await;
    }

    #[tokio::test]
    async fn interact_routes_deal_queries_to_promotion_tool() {
        let svc = service().await;
        let response = svc
            .interact(InteractionRequest {
                query: "any deals today?".to_string(),
                session_id: "session-1".to_string(),
                timestamp: Utc::now(),
            })
            .await;
        assert_eq!(response.tool_used.as_deref(), Some("promotion"));
        svc.shutdown().await;
    }

    #[tokio::test]
    async fn sync_updates_version_and_catalog() {
        let mut svc = EdgeService::open_in_memory(ServiceConfig::default()).unwrap();
        assert_eq!(svc.catalog_version().unwrap(), None);

        let report = svc.apply_sync(payload()).unwrap();
        assert_eq!(report.items_updated, 2);
        assert_eq!(svc.catalog_version().unwrap().as_deref(), Some("v1"));
        assert_eq!(svc.catalog_size().unwrap(), 2);
        svc.shutdown().await;
    }

    #[tokio::test]
    async fn preload_serves_first_lookup_from_hot_set() {
        let mut svc = EdgeService::open_in_memory(ServiceConfig::default()).unwrap();
        svc.apply_sync(payload()).unwrap();
        // apply_sync preloaded "item:premium diesel fuel"; the exact-name
        // lookup is answered without touching the persistent tier.
        let response = svc
            .interact(InteractionRequest {
                query: "Premium Diesel Fuel".to_string(),
                session_id: "session-1".to_string(),
                timestamp: Utc::now(),
            })
            .await;
        assert!(response.cache_hit);
        svc.shutdown().await;
    }
}
