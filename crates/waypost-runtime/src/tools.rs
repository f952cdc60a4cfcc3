//! The closed tool set and its dispatch interface.
//!
//! Every guest interaction is routed to exactly one [`ToolKind`] variant
//! through the uniform [`execute`] contract. Adding a tool is a
//! compile-time-checked enumeration change, not string routing.
//!
//! | tool | what it does | telemetry |
//! |---|---|---|
//! | [`ToolKind::Lookup`] | find an item via the two-tier cache | `cache_hit` / `lookup` / `cache_miss` |
//! | [`ToolKind::Promotion`] | surface the top active deals | one `promotion_shown` per promo |
//! | [`ToolKind::Engagement`] | selfie / engagement banter | `engagement` |
//! | [`ToolKind::Movement`] | delegate a gesture to the robot body | `navigation` |

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::warn;
use waypost_cache::coordinator::CacheCoordinator;
use waypost_cache::store::{CatalogRepository, StoreError};
use waypost_telemetry::EventSink;
use waypost_types::{CatalogItem, EventKind, Promotion, TelemetryEvent};

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise from tool execution.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("persistent tier error: {0}")]
    Store(#[from] StoreError),
}

// ─────────────────────────────────────────────────────────────────────────────
// ToolKind
// ─────────────────────────────────────────────────────────────────────────────

/// The closed set of interaction tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Lookup,
    Promotion,
    Engagement,
    Movement,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Lookup => "lookup",
            ToolKind::Promotion => "promotion",
            ToolKind::Engagement => "engagement",
            ToolKind::Movement => "movement",
        }
    }

    /// Keyword intent classification. Defaults to [`ToolKind::Lookup`]:
    /// most guest questions are wayfinding.
    pub fn classify(query: &str) -> ToolKind {
        const PROMO_WORDS: &[&str] = &["deal", "sale", "promo", "discount", "offer", "special"];
        const ENGAGE_WORDS: &[&str] = &["selfie", "picture", "photo"];

        let q = query.to_lowercase();
        if PROMO_WORDS.iter().any(|w| q.contains(w)) {
            return ToolKind::Promotion;
        }
        if ENGAGE_WORDS.iter().any(|w| q.contains(w)) {
            return ToolKind::Engagement;
        }
        ToolKind::Lookup
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gesture seam
// ─────────────────────────────────────────────────────────────────────────────

/// Boundary to the physical gesture system. The robot body is an external
/// collaborator; only this seam is part of the core.
pub trait GestureDriver: Send + Sync {
    /// Perform `gesture` toward `direction`. Returns whether the gesture
    /// was actually executed.
    fn perform(&self, gesture: &str, direction: &str) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Context and outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Identity labels stamped onto every telemetry event.
#[derive(Debug, Clone)]
pub struct UnitIdentity {
    pub unit_id: String,
    pub store_id: String,
    pub zone_id: String,
}

impl Default for UnitIdentity {
    fn default() -> Self {
        Self {
            unit_id: "WP-DEV-001".to_string(),
            store_id: "STORE-DEV".to_string(),
            zone_id: "ENTRANCE".to_string(),
        }
    }
}

/// Everything a tool needs, injected per call.
pub struct ToolContext<'a, R> {
    pub coordinator: &'a CacheCoordinator<R>,
    pub telemetry: &'a EventSink,
    pub identity: &'a UnitIdentity,
    pub session_id: &'a str,
    pub gestures: Option<&'a dyn GestureDriver>,
}

/// Result of one tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub success: bool,
    /// Canned spoken response; may be re-phrased by the LLM collaborator.
    pub response: String,
    /// Matched catalog items, if any. Feeds the LLM context window.
    pub items: Vec<CatalogItem>,
    pub promotions: Vec<Promotion>,
    pub cache_hit: bool,
    pub latency_ms: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Uniform dispatch: run `kind` against `query` with the given context.
pub fn execute<R: CatalogRepository>(
    kind: ToolKind,
    query: &str,
    ctx: &ToolContext<'_, R>,
) -> Result<ToolOutcome, ToolError> {
    match kind {
        ToolKind::Lookup => lookup(query, ctx),
        ToolKind::Promotion => promotions(query, ctx),
        ToolKind::Engagement => engagement(query, ctx),
        ToolKind::Movement => movement(query, ctx),
    }
}

fn lookup<R: CatalogRepository>(
    query: &str,
    ctx: &ToolContext<'_, R>,
) -> Result<ToolOutcome, ToolError> {
    let start = Instant::now();
    let (found, cache_hit) = ctx.coordinator.lookup_item(query)?;
    let latency_ms = elapsed_ms(start);

    match found {
        Some(item) => {
            let response = format!(
                "{} is at {}. Head that way and look for the {} section.",
                item.name, item.location, item.category
            );
            let kind = if cache_hit {
                EventKind::CacheHit
            } else {
                EventKind::Lookup
            };
            emit(
                ctx,
                kind,
                query,
                &response,
                ToolKind::Lookup,
                latency_ms,
                Some(serde_json::json!({ "sku": item.sku, "location": item.location })),
            );
            Ok(ToolOutcome {
                success: true,
                response,
                items: vec![item],
                promotions: Vec::new(),
                cache_hit,
                latency_ms,
            })
        }
        None => {
            let response = format!(
                "I'm not sure where to find {query}. Let me get a staff member to help you."
            );
            emit(
                ctx,
                EventKind::CacheMiss,
                query,
                &response,
                ToolKind::Lookup,
                latency_ms,
                None,
            );
            Ok(ToolOutcome {
                success: false,
                response,
                items: Vec::new(),
                promotions: Vec::new(),
                cache_hit: false,
                latency_ms,
            })
        }
    }
}

fn promotions<R: CatalogRepository>(
    query: &str,
    ctx: &ToolContext<'_, R>,
) -> Result<ToolOutcome, ToolError> {
    let start = Instant::now();
    let (promos, cache_hit) = ctx.coordinator.promotions()?;
    let latency_ms = elapsed_ms(start);

    if promos.is_empty() {
        return Ok(ToolOutcome {
            success: true,
            response: "We don't have any special deals right now, but I can help you find \
                       what you're looking for!"
                .to_string(),
            items: Vec::new(),
            promotions: Vec::new(),
            cache_hit,
            latency_ms,
        });
    }

    let response = format_promotions(&promos);
    for promo in &promos {
        emit(
            ctx,
            EventKind::PromotionShown,
            query,
            &response,
            ToolKind::Promotion,
            latency_ms,
            Some(serde_json::json!({ "promo_id": promo.id, "description": promo.description })),
        );
    }

    Ok(ToolOutcome {
        success: true,
        response,
        items: Vec::new(),
        promotions: promos,
        cache_hit,
        latency_ms,
    })
}

fn engagement<R>(query: &str, ctx: &ToolContext<'_, R>) -> Result<ToolOutcome, ToolError> {
    let start = Instant::now();
    let response = "Would you like to take a selfie with me? I love taking pictures!".to_string();
    let latency_ms = elapsed_ms(start);
    emit(
        ctx,
        EventKind::Engagement,
        query,
        &response,
        ToolKind::Engagement,
        latency_ms,
        Some(serde_json::json!({ "action": "offer" })),
    );
    Ok(ToolOutcome {
        success: true,
        response,
        items: Vec::new(),
        promotions: Vec::new(),
        cache_hit: false,
        latency_ms,
    })
}

fn movement<R>(query: &str, ctx: &ToolContext<'_, R>) -> Result<ToolOutcome, ToolError> {
    let start = Instant::now();
    let gesture = "point";
    let direction = "forward";

    let executed = match ctx.gestures {
        Some(driver) => driver.perform(gesture, direction),
        None => {
            warn!("gesture driver not available");
            false
        }
    };
    let latency_ms = elapsed_ms(start);
    let response = "Right this way!".to_string();
    emit(
        ctx,
        EventKind::Navigation,
        query,
        &response,
        ToolKind::Movement,
        latency_ms,
        Some(serde_json::json!({ "gesture": gesture, "direction": direction, "executed": executed })),
    );
    Ok(ToolOutcome {
        success: true,
        response,
        items: Vec::new(),
        promotions: Vec::new(),
        cache_hit: false,
        latency_ms,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn format_promotions(promos: &[Promotion]) -> String {
    if promos.len() == 1 {
        return format!("Great deal today: {}!", promos[0].description);
    }
    let listed = promos
        .iter()
        .take(2)
        .map(|p| p.description.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if promos.len() > 2 {
        format!("Today's deals: {listed}, and more. Want to hear details?")
    } else {
        format!("Today's deals: {listed}.")
    }
}

fn emit<R>(
    ctx: &ToolContext<'_, R>,
    kind: EventKind,
    query: &str,
    response: &str,
    tool: ToolKind,
    latency_ms: f64,
    metadata: Option<serde_json::Value>,
) {
    ctx.telemetry.emit(TelemetryEvent {
        kind,
        session_id: ctx.session_id.to_string(),
        timestamp: Utc::now(),
        unit_id: ctx.identity.unit_id.clone(),
        store_id: ctx.identity.store_id.clone(),
        zone_id: ctx.identity.zone_id.clone(),
        query: Some(query.to_string()),
        response: Some(response.to_string()),
        tool: Some(tool.name().to_string()),
        latency_ms: Some(latency_ms),
        metadata,
    });
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
