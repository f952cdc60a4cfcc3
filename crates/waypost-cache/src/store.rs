//! Persistent catalog tier backed by SQLite FTS5.
//!
//! Stores catalog records in a full-text virtual table and answers ranked
//! queries using the BM25 relevance function, with the spoken-query token
//! pipeline (normalize → correct → expand) applied in front.
//!
//! # Storage layout
//!
//! | object | kind | description |
//! |---|---|---|
//! | `catalog_fts` | FTS5 virtual table | `sku, name, category, location, price UNINDEXED, description`, porter/unicode61 tokenizer |
//! | `promotions`  | table | promotion rows, priority-ordered retrieval |
//! | `sync_meta`   | table | key/value: current sync version marker, opaque store config |
//!
//! # Thread model
//!
//! A [`CatalogStore`] owns its [`Connection`] and is deliberately not
//! shareable across concurrent contexts (`Connection` is `!Sync`). Each
//! worker context opens and owns its own handle via [`CatalogStore::open`];
//! handles are never pooled or shared. This is a hard constraint inherited
//! from the storage engine.
//!
//! # Example
//!
//! ```rust
//! use waypost_cache::store::CatalogStore;
//! use waypost_types::CatalogItem;
//!
//! let store = CatalogStore::open_in_memory().unwrap();
//! store.insert_item(&CatalogItem {
//!     sku: "FUEL-DIESEL-001".into(),
//!     name: "Premium Diesel Fuel".into(),
//!     category: "Fuel & Fluids".into(),
//!     location: "Fuel Island 1".into(),
//!     price: 3.89,
//!     description: "Ultra-low sulfur diesel for commercial trucks".into(),
//!     relevance: None,
//! }).unwrap();
//!
//! let hits = store.search("where can I get diesel", 5).unwrap();
//! assert_eq!(hits[0].location, "Fuel Island 1");
//! ```

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};
use waypost_types::{CatalogItem, Promotion};

use crate::query;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise from persistent-tier operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store-config serialization error: {0}")]
    Config(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository traits
// ─────────────────────────────────────────────────────────────────────────────

/// Read side of the persistent tier, injected into the cache coordinator.
pub trait CatalogRepository {
    /// Ranked full-text search. Never fails on malformed query text.
    fn search(&self, raw_query: &str, limit: usize) -> Result<Vec<CatalogItem>, StoreError>;
    /// Most-recently indexed records, newest first.
    fn recent_items(&self, limit: usize) -> Result<Vec<CatalogItem>, StoreError>;
    /// Unexpired promotions, highest priority first.
    fn active_promotions(&self, limit: usize) -> Result<Vec<Promotion>, StoreError>;
}

/// Write side of the persistent tier, used by the sync ingress.
///
/// Every method commits as a single all-or-nothing operation: a failure
/// leaves the store at its pre-call state.
pub trait CatalogWriter {
    fn replace_items(&mut self, items: &[CatalogItem]) -> Result<usize, StoreError>;
    fn replace_promotions(&mut self, promos: &[Promotion]) -> Result<usize, StoreError>;
    fn set_version(&mut self, version: &str) -> Result<(), StoreError>;
    fn set_store_config(
        &mut self,
        config: &HashMap<String, serde_json::Value>,
    ) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// CatalogStore
// ─────────────────────────────────────────────────────────────────────────────

const VERSION_KEY: &str = "catalog_version";
const STORE_CONFIG_KEY: &str = "store_config";

/// SQLite-backed catalog store with full-text search.
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open (or create) a persistent store at `path`, creating parent
    /// directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        info!(path = %path.display(), "catalog store opened");
        Ok(store)
    }

    /// Open a temporary in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Idempotent; safe to call on every open.
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE VIRTUAL TABLE IF NOT EXISTS catalog_fts USING fts5(
                sku,
                name,
                category,
                location,
                price UNINDEXED,
                description,
                tokenize='porter unicode61'
            );
            CREATE TABLE IF NOT EXISTS promotions (
                id               TEXT NOT NULL PRIMARY KEY,
                description      TEXT NOT NULL,
                sku              TEXT,
                category         TEXT,
                discount_percent REAL,
                expires_at       TEXT,
                priority         INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS sync_meta (
                key   TEXT NOT NULL PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Append a single record to the index.
    ///
    /// FTS5 virtual tables cannot enforce a primary key, so inserting a
    /// previously-seen `sku` creates a second, independent record. The sync
    /// path uses [`CatalogWriter::replace_items`] instead, which dedupes the
    /// whole generation wholesale.
    pub fn insert_item(&self, item: &CatalogItem) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO catalog_fts (sku, name, category, location, price, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.sku,
                item.name,
                item.category,
                item.location,
                item.price,
                item.description
            ],
        )?;
        debug!(sku = %item.sku, "catalog item indexed");
        Ok(())
    }

    /// Append a batch of records in one transaction; either all are indexed
    /// or none are. Duplicate-`sku` caveats as for [`Self::insert_item`].
    pub fn insert_items(&mut self, items: &[CatalogItem]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO catalog_fts (sku, name, category, location, price, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for item in items {
                stmt.execute(params![
                    item.sku,
                    item.name,
                    item.category,
                    item.location,
                    item.price,
                    item.description
                ])?;
            }
        }
        tx.commit()?;
        info!(count = items.len(), "catalog items bulk indexed");
        Ok(items.len())
    }

    /// Ranked full-text search over the indexed fields.
    ///
    /// An empty or whitespace-only query returns an empty list. The query
    /// runs through the token pipeline and is matched as an OR-combination
    /// of terms ordered by BM25; when the exact-term match yields no rows,
    /// the query is retried once with every term as a prefix. Relevance is
    /// presented as a positive larger-is-better number (the absolute value
    /// of the BM25 rank, which is more negative for better matches). Any
    /// residual match-syntax failure is treated as "no results".
    pub fn search(&self, raw_query: &str, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
        if raw_query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let terms = query::search_terms(raw_query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let match_expr = terms.join(" OR ");
        debug!(query = raw_query, fts = %match_expr, "catalog search");
        let items = self.ranked_match(&match_expr, limit)?;
        if !items.is_empty() {
            return Ok(items);
        }

        // Exact terms found nothing: retry once with trailing-wildcard
        // prefix terms ("cobr*" matches "cobra").
        let prefix_expr = terms
            .iter()
            .map(|t| format!("{t}*"))
            .collect::<Vec<_>>()
            .join(" OR ");
        debug!(fts = %prefix_expr, "no exact match, retrying with prefix terms");
        self.ranked_match(&prefix_expr, limit)
    }

    fn ranked_match(&self, match_expr: &str, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT sku, name, category, location, price, description,
                    bm25(catalog_fts) AS rank
             FROM catalog_fts
             WHERE catalog_fts MATCH ?1
             ORDER BY bm25(catalog_fts)
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![match_expr, limit as i64], |row| {
            let mut item = row_to_item(row)?;
            item.relevance = Some(row.get::<_, f64>(6)?.abs());
            Ok(item)
        })?;

        let mut items = Vec::new();
        for row in rows {
            match row {
                Ok(item) => items.push(item),
                Err(e) => {
                    // A term that still collides with the match syntax lands
                    // here; the contract is "no results", never an error.
                    warn!(error = %e, "FTS match rejected, returning no results");
                    return Ok(Vec::new());
                }
            }
        }
        Ok(items)
    }

    /// Most-recently indexed records, newest first. No relevance scores.
    pub fn recent_items(&self, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT sku, name, category, location, price, description
             FROM catalog_fts
             ORDER BY rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_item)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::Sqlite)
    }

    /// Unexpired promotions ordered by descending priority.
    pub fn active_promotions(&self, limit: usize) -> Result<Vec<Promotion>, StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.conn.prepare(
            "SELECT id, description, sku, category, discount_percent, expires_at, priority
             FROM promotions
             WHERE expires_at IS NULL OR expires_at > ?1
             ORDER BY priority DESC, id ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![now, limit as i64], row_to_promotion)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::Sqlite)
    }

    /// The currently committed sync version, if any sync has been applied.
    pub fn version(&self) -> Result<Option<String>, StoreError> {
        let version = self
            .conn
            .query_row(
                "SELECT value FROM sync_meta WHERE key = ?1",
                params![VERSION_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }

    /// Total number of indexed records (duplicates included).
    pub fn item_count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM catalog_fts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl CatalogRepository for CatalogStore {
    fn search(&self, raw_query: &str, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
        CatalogStore::search(self, raw_query, limit)
    }

    fn recent_items(&self, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
        CatalogStore::recent_items(self, limit)
    }

    fn active_promotions(&self, limit: usize) -> Result<Vec<Promotion>, StoreError> {
        CatalogStore::active_promotions(self, limit)
    }
}

impl CatalogWriter for CatalogStore {
    fn replace_items(&mut self, items: &[CatalogItem]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM catalog_fts", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO catalog_fts (sku, name, category, location, price, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for item in items {
                stmt.execute(params![
                    item.sku,
                    item.name,
                    item.category,
                    item.location,
                    item.price,
                    item.description
                ])?;
            }
        }
        tx.commit()?;
        info!(count = items.len(), "catalog replaced");
        Ok(items.len())
    }

    fn replace_promotions(&mut self, promos: &[Promotion]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM promotions", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO promotions
                     (id, description, sku, category, discount_percent, expires_at, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for promo in promos {
                stmt.execute(params![
                    promo.id,
                    promo.description,
                    promo.sku,
                    promo.category,
                    promo.discount_percent,
                    promo.expires_at.map(|d| d.to_rfc3339()),
                    promo.priority
                ])?;
            }
        }
        tx.commit()?;
        info!(count = promos.len(), "promotions replaced");
        Ok(promos.len())
    }

    fn set_version(&mut self, version: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?1, ?2)",
            params![VERSION_KEY, version],
        )?;
        Ok(())
    }

    fn set_store_config(
        &mut self,
        config: &HashMap<String, serde_json::Value>,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(config)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?1, ?2)",
            params![STORE_CONFIG_KEY, raw],
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogItem> {
    Ok(CatalogItem {
        sku: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        location: row.get(3)?,
        price: row.get(4)?,
        description: row.get(5)?,
        relevance: None,
    })
}

fn row_to_promotion(row: &rusqlite::Row<'_>) -> rusqlite::Result<Promotion> {
    let expires_raw: Option<String> = row.get(5)?;
    let expires_at = match expires_raw {
        Some(raw) => Some(raw.parse::<DateTime<Utc>>().map_err(|e| {
            rusqlite::Error::InvalidColumnType(5, e.to_string(), rusqlite::types::Type::Text)
        })?),
        None => None,
    };
    Ok(Promotion {
        id: row.get(0)?,
        description: row.get(1)?,
        sku: row.get(2)?,
        category: row.get(3)?,
        discount_percent: row.get(4)?,
        expires_at,
        priority: row.get(6)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn item(sku: &str, name: &str, category: &str, location: &str, description: &str) -> CatalogItem {
        CatalogItem {
            sku: sku.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            location: location.to_string(),
            price: 9.99,
            description: description.to_string(),
            relevance: None,
        }
    }

    fn promo(id: &str, description: &str, priority: i64) -> Promotion {
        Promotion {
            id: id.to_string(),
            description: description.to_string(),
            sku: None,
            category: None,
            discount_percent: None,
            expires_at: None,
            priority,
        }
    }

    fn loaded_store() -> CatalogStore {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store
            .insert_items(&[
                item(
                    "FUEL-DIESEL-001",
                    "Premium Diesel Fuel",
                    "Fuel & Fluids",
                    "Fuel Island 1",
                    "Ultra-low sulfur diesel fuel for commercial trucks and RVs",
                ),
                item(
                    "ELECT-CB-105",
                    "Cobra 29 LX CB Radio",
                    "Electronics",
                    "Aisle 4",
                    "40-channel CB radio with weather alerts",
                ),
                item(
                    "SERV-SHOWER-001",
                    "Shower Credit",
                    "Services",
                    "Service Desk",
                    "Clean private shower for longhaul drivers",
                ),
            ])
            .unwrap();
        store
    }

    // ── schema ───────────────────────────────────────────────────────────────

    #[test]
    fn open_creates_database_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let store = CatalogStore::open(&path).unwrap();
            store
                .insert_item(&item("A", "Apple", "Food", "Aisle 1", "fresh apple"))
                .unwrap();
        }
        assert!(path.exists());
        // Re-opening runs init_schema again and keeps existing data.
        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.item_count().unwrap(), 1);
    }

    // ── search ───────────────────────────────────────────────────────────────

    #[test]
    fn empty_or_blank_query_returns_empty() {
        let store = loaded_store();
        assert!(store.search("", 5).unwrap().is_empty());
        assert!(store.search("   \t ", 5).unwrap().is_empty());
    }

    #[test]
    fn verbatim_name_token_is_found() {
        let store = loaded_store();
        let hits = store.search("shower", 5).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].sku, "SERV-SHOWER-001");
    }

    #[test]
    fn natural_language_query_ranks_diesel_first() {
        let store = loaded_store();
        let hits = store.search("where can I get diesel fuel", 5).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].name, "Premium Diesel Fuel");
    }

    #[test]
    fn multi_word_query_ranks_radio_first() {
        let store = loaded_store();
        let hits = store.search("cb radio", 5).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].name, "Cobra 29 LX CB Radio");
    }

    #[test]
    fn unmatched_query_returns_empty() {
        let store = loaded_store();
        assert!(store.search("xyzabc123", 5).unwrap().is_empty());
    }

    #[test]
    fn typo_query_matches_corrected_term() {
        let store = loaded_store();
        let exact = store.search("diesel", 5).unwrap();
        let typo = store.search("dielsle", 5).unwrap();
        assert!(!typo.is_empty());
        assert_eq!(typo[0].sku, exact[0].sku);
    }

    #[test]
    fn prefix_fallback_matches_partial_token() {
        let store = loaded_store();
        // "cobr" is neither a vocabulary term nor an indexed token, so the
        // exact match fails and the wildcard retry finds "Cobra".
        let hits = store.search("cobr", 5).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].sku, "ELECT-CB-105");
    }

    #[test]
    fn relevance_scores_are_positive_and_sorted() {
        let store = loaded_store();
        let hits = store.search("diesel fuel shower radio", 5).unwrap();
        assert!(hits.len() >= 2);
        let scores: Vec<f64> = hits.iter().map(|h| h.relevance.unwrap()).collect();
        assert!(scores.iter().all(|s| *s >= 0.0));
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn search_respects_limit() {
        let store = loaded_store();
        let hits = store.search("diesel fuel shower radio", 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn operator_like_input_is_absorbed() {
        let store = loaded_store();
        // Characters outside the sanitised set can still upset the match
        // parser; the contract is an empty list, never an error.
        let hits = store.search("test@#$%", 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn synonym_expansion_reaches_catalog_terms() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store
            .insert_items(&[item(
                "FOOD-PIZZA-001",
                "Hot Pizza Slice",
                "Hot Food",
                "Deli Counter",
                "Fresh pepperoni pizza slice",
            )])
            .unwrap();
        let hits = store.search("I'm hungry", 5).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].sku, "FOOD-PIZZA-001");
    }

    // ── plain reads ──────────────────────────────────────────────────────────

    #[test]
    fn recent_items_returns_newest_first_without_relevance() {
        let store = loaded_store();
        let recent = store.recent_items(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sku, "SERV-SHOWER-001");
        assert!(recent.iter().all(|i| i.relevance.is_none()));
    }

    #[test]
    fn duplicate_sku_append_creates_second_record() {
        let store = loaded_store();
        store
            .insert_item(&item(
                "FUEL-DIESEL-001",
                "Premium Diesel Fuel",
                "Fuel & Fluids",
                "Fuel Island 1",
                "Ultra-low sulfur diesel fuel",
            ))
            .unwrap();
        assert_eq!(store.item_count().unwrap(), 4);
    }

    // ── promotions ───────────────────────────────────────────────────────────

    #[test]
    fn active_promotions_ordered_by_priority() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store
            .replace_promotions(&[
                promo("P-LOW", "Low priority deal", 1),
                promo("P-HIGH", "High priority deal", 10),
                promo("P-MID", "Mid priority deal", 5),
            ])
            .unwrap();
        let promos = store.active_promotions(10).unwrap();
        let ids: Vec<&str> = promos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P-HIGH", "P-MID", "P-LOW"]);
    }

    #[test]
    fn expired_promotions_are_filtered() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut expired = promo("P-OLD", "Yesterday's deal", 10);
        expired.expires_at = Some(Utc::now() - ChronoDuration::hours(1));
        let mut live = promo("P-NEW", "Today's deal", 1);
        live.expires_at = Some(Utc::now() + ChronoDuration::hours(1));
        store.replace_promotions(&[expired, live]).unwrap();

        let promos = store.active_promotions(10).unwrap();
        assert_eq!(promos.len(), 1);
        assert_eq!(promos[0].id, "P-NEW");
    }

    #[test]
    fn promotion_roundtrips_optional_fields() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut full = promo("P-FULL", "20% off showers", 3);
        full.sku = Some("SERV-SHOWER-001".to_string());
        full.category = Some("Services".to_string());
        full.discount_percent = Some(20.0);
        full.expires_at = Some(Utc::now() + ChronoDuration::days(7));
        store.replace_promotions(std::slice::from_ref(&full)).unwrap();

        let promos = store.active_promotions(10).unwrap();
        assert_eq!(promos[0].sku.as_deref(), Some("SERV-SHOWER-001"));
        assert_eq!(promos[0].discount_percent, Some(20.0));
        assert!(promos[0].expires_at.is_some());
    }

    // ── replace semantics ────────────────────────────────────────────────────

    #[test]
    fn replace_items_is_idempotent() {
        let mut store = loaded_store();
        let generation = vec![
            item("A", "Apple", "Food", "Aisle 1", "fresh apple"),
            item("B", "Banana", "Food", "Aisle 1", "ripe banana"),
        ];
        let first = store.replace_items(&generation).unwrap();
        let second = store.replace_items(&generation).unwrap();
        assert_eq!(first, 2);
        assert_eq!(second, 2);
        assert_eq!(store.item_count().unwrap(), 2);
    }

    // ── version marker ───────────────────────────────────────────────────────

    #[test]
    fn version_marker_is_recorded_and_overwritten() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        assert!(store.version().unwrap().is_none());
        store.set_version("v1").unwrap();
        assert_eq!(store.version().unwrap().as_deref(), Some("v1"));
        store.set_version("v2").unwrap();
        assert_eq!(store.version().unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn store_config_is_persisted_opaquely() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut config = HashMap::new();
        config.insert("greeting".to_string(), serde_json::json!("Welcome!"));
        store.set_store_config(&config).unwrap();
        // The config is opaque; only its presence matters to this tier.
        let raw: String = store
            .conn
            .query_row(
                "SELECT value FROM sync_meta WHERE key = ?1",
                params![STORE_CONFIG_KEY],
                |row| row.get(0),
            )
            .unwrap();
        assert!(raw.contains("Welcome!"));
    }
}
