use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single catalog record: something a guest can buy or use at the site.
///
/// Created by the sync ingress and immutable once indexed; a full
/// replace-on-sync is the only way to change an existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stock-keeping identifier. Unique within a sync generation, but the
    /// full-text index does not enforce uniqueness.
    pub sku: String,
    /// Display name (e.g. "Premium Diesel Fuel").
    pub name: String,
    /// Category label (e.g. "Fuel & Fluids").
    pub category: String,
    /// Where to find it on site (e.g. "Fuel Island 1", "Aisle 4").
    pub location: String,
    /// Price in USD. Non-negative.
    pub price: f64,
    /// Free-text description used for full-text matching.
    pub description: String,
    /// Positive, larger-is-better relevance score. Populated only on search
    /// results; never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

/// An active deal or promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub description: String,
    /// Item this promotion applies to, if any.
    #[serde(default)]
    pub sku: Option<String>,
    /// Category this promotion applies to, if any.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    /// Promotions past this instant are no longer shown.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Higher priority is shown first.
    #[serde(default)]
    pub priority: i64,
}

/// Versioned bulk update to the catalog and promotions, pushed by the
/// upstream backend.
///
/// Applying the same payload twice is idempotent at the persistent tier:
/// both item and promotion lists are committed with replace semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Monotonically-advancing version token for this sync generation.
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub items: Option<Vec<CatalogItem>>,
    #[serde(default)]
    pub promotions: Option<Vec<Promotion>>,
    /// Opaque site configuration; stored verbatim, never interpreted here.
    #[serde(default)]
    pub store_config: Option<HashMap<String, serde_json::Value>>,
}

/// Result of applying a [`SyncPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub accepted_version: String,
    pub items_updated: usize,
    pub promos_updated: usize,
}

/// Classification of a telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CacheHit,
    CacheMiss,
    Lookup,
    PromotionShown,
    Navigation,
    Engagement,
    Clarification,
    Error,
}

/// One interaction record forwarded to the analytics backend.
///
/// Owned exclusively by the event batch forwarder once emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub kind: EventKind,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    /// Which assistant unit produced the event.
    pub unit_id: String,
    pub store_id: String,
    pub zone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Name of the tool that handled the interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A guest utterance handed to the interaction surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRequest {
    pub query: String,
    pub session_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// The answer produced for one [`InteractionRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_used: Option<String>,
    pub latency_ms: f64,
    #[serde(default)]
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}
