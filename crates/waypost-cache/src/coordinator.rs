//! Cache coordinator: routes lookups L1 → L2 and owns the hot-set lifecycle.
//!
//! The coordinator is constructed with an injected repository handle (no
//! process-wide singleton) and a shared volatile tier. On startup it
//! preloads a bounded hot set — a fixed-size most-recent slice of catalog
//! records plus the top-priority promotions — so the first live queries are
//! answered from memory. After every successful sync the volatile tier is
//! invalidated wholesale and the preload re-runs; stale answers are never
//! served past a sync.
//!
//! The repository handle is owned by value: the persistent tier's
//! connection must not be shared across concurrent contexts, so each
//! context builds its own coordinator around its own handle. The volatile
//! tier is the shareable half (`Arc`).

use crate::store::{CatalogRepository, StoreError};
use crate::volatile::{CacheStats, VolatileCache};
use std::sync::Arc;
use tracing::{debug, info};
use waypost_types::{CatalogItem, Promotion};

// ─────────────────────────────────────────────────────────────────────────────
// Cached values and keys
// ─────────────────────────────────────────────────────────────────────────────

/// Closed set of value shapes held in the volatile tier.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Item(CatalogItem),
    Promotions(Vec<Promotion>),
}

/// Volatile-tier key for the active-promotions list.
pub const ACTIVE_PROMOTIONS_KEY: &str = "active_promotions";

/// Volatile-tier key for a single-item lookup.
pub fn item_key(query: &str) -> String {
    format!("item:{}", query.trim().to_lowercase())
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Hot-set sizing for the preload step.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How many most-recent catalog records to preload.
    pub hot_items: usize,
    /// How many top-priority promotions to preload (and to serve from the
    /// promotion lookup path).
    pub hot_promotions: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            hot_items: 20,
            hot_promotions: 3,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CacheCoordinator
// ─────────────────────────────────────────────────────────────────────────────

/// Composes the volatile tier with an injected persistent-tier handle.
pub struct CacheCoordinator<R> {
    repo: R,
    hot: Arc<VolatileCache<CachedValue>>,
    config: CoordinatorConfig,
}

impl<R: CatalogRepository> CacheCoordinator<R> {
    pub fn new(
        repo: R,
        hot: Arc<VolatileCache<CachedValue>>,
        config: CoordinatorConfig,
    ) -> Self {
        Self { repo, hot, config }
    }

    /// Pull the hot set from the persistent tier into the volatile tier.
    ///
    /// Returns the number of volatile entries written.
    pub fn preload(&self) -> Result<usize, StoreError> {
        let mut loaded = 0;
        for item in self.repo.recent_items(self.config.hot_items)? {
            self.hot.set(item_key(&item.name), CachedValue::Item(item));
            loaded += 1;
        }
        let promos = self.repo.active_promotions(self.config.hot_promotions)?;
        if !promos.is_empty() {
            self.hot
                .set(ACTIVE_PROMOTIONS_KEY, CachedValue::Promotions(promos));
            loaded += 1;
        }
        info!(entries = loaded, "volatile tier preloaded");
        Ok(loaded)
    }

    /// Clear the volatile tier and re-run the preload. Called after every
    /// successful sync commit.
    pub fn invalidate_and_preload(&self) -> Result<usize, StoreError> {
        self.hot.invalidate_all();
        self.preload()
    }

    /// Single-item lookup routed L1 → L2.
    ///
    /// Returns the best match (if any) and whether the volatile tier
    /// answered. An L2 hit is written back into L1 for subsequent lookups.
    pub fn lookup_item(&self, query: &str) -> Result<(Option<CatalogItem>, bool), StoreError> {
        let key = item_key(query);
        if let Some(CachedValue::Item(item)) = self.hot.get(&key) {
            debug!(query, "volatile tier hit");
            return Ok((Some(item), true));
        }

        let results = self.repo.search(query, 1)?;
        match results.into_iter().next() {
            Some(item) => {
                self.hot.set(key, CachedValue::Item(item.clone()));
                Ok((Some(item), false))
            }
            None => Ok((None, false)),
        }
    }

    /// Ranked multi-result search. Goes straight to the persistent tier;
    /// only single-item lookups and the promotion list are cached.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
        self.repo.search(query, limit)
    }

    /// Active promotions routed L1 → L2, with cache-fill on an L2 hit.
    pub fn promotions(&self) -> Result<(Vec<Promotion>, bool), StoreError> {
        if let Some(CachedValue::Promotions(promos)) = self.hot.get(ACTIVE_PROMOTIONS_KEY) {
            return Ok((promos, true));
        }
        let promos = self.repo.active_promotions(self.config.hot_promotions)?;
        if !promos.is_empty() {
            self.hot
                .set(ACTIVE_PROMOTIONS_KEY, CachedValue::Promotions(promos.clone()));
        }
        Ok((promos, false))
    }

    /// The injected persistent-tier handle.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub(crate) fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    /// The shared volatile tier.
    pub fn hot(&self) -> &Arc<VolatileCache<CachedValue>> {
        &self.hot
    }

    /// Volatile-tier statistics.
    pub fn hot_stats(&self) -> CacheStats {
        self.hot.stats()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    /// Minimal in-process repository used only for tests.
    struct MockRepo {
        items: Vec<CatalogItem>,
        promos: Vec<Promotion>,
        search_calls: Cell<usize>,
    }

    impl MockRepo {
        fn new(items: Vec<CatalogItem>, promos: Vec<Promotion>) -> Self {
            Self {
                items,
                promos,
                search_calls: Cell::new(0),
            }
        }
    }

    impl CatalogRepository for MockRepo {
        fn search(&self, raw_query: &str, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
            self.search_calls.set(self.search_calls.get() + 1);
            let needle = raw_query.to_lowercase();
            Ok(self
                .items
                .iter()
                .filter(|i| i.name.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect())
        }

        fn recent_items(&self, limit: usize) -> Result<Vec<CatalogItem>, StoreError> {
            Ok(self.items.iter().rev().take(limit).cloned().collect())
        }

        fn active_promotions(&self, limit: usize) -> Result<Vec<Promotion>, StoreError> {
            Ok(self.promos.iter().take(limit).cloned().collect())
        }
    }

    fn sample_item(sku: &str, name: &str) -> CatalogItem {
        CatalogItem {
            sku: sku.to_string(),
            name: name.to_string(),
            category: "Test".to_string(),
            location: "Aisle 1".to_string(),
            price: 1.0,
            description: String::new(),
            relevance: None,
        }
    }

    fn sample_promo(id: &str) -> Promotion {
        Promotion {
            id: id.to_string(),
            description: "deal".to_string(),
            sku: None,
            category: None,
            discount_percent: None,
            expires_at: None,
            priority: 1,
        }
    }

    fn coordinator(repo: MockRepo) -> CacheCoordinator<MockRepo> {
        let hot = Arc::new(VolatileCache::new(100, Duration::from_secs(300)));
        CacheCoordinator::new(repo, hot, CoordinatorConfig::default())
    }

    // ── preload ──────────────────────────────────────────────────────────────

    #[test]
    fn preload_populates_hot_set() {
        let repo = MockRepo::new(
            vec![sample_item("A", "Apple"), sample_item("B", "Banana")],
            vec![sample_promo("P1")],
        );
        let coord = coordinator(repo);
        let loaded = coord.preload().unwrap();
        assert_eq!(loaded, 3); // two items + promotion list
        assert!(coord.hot().get(&item_key("Apple")).is_some());
        assert!(coord.hot().get(ACTIVE_PROMOTIONS_KEY).is_some());
    }

    #[test]
    fn preload_without_promotions_skips_promo_entry() {
        let repo = MockRepo::new(vec![sample_item("A", "Apple")], Vec::new());
        let coord = coordinator(repo);
        assert_eq!(coord.preload().unwrap(), 1);
        assert!(coord.hot().get(ACTIVE_PROMOTIONS_KEY).is_none());
    }

    // ── lookup routing ───────────────────────────────────────────────────────

    #[test]
    fn lookup_fills_volatile_tier_then_hits_it() {
        let repo = MockRepo::new(vec![sample_item("A", "Apple")], Vec::new());
        let coord = coordinator(repo);

        let (first, first_hit) = coord.lookup_item("apple").unwrap();
        assert_eq!(first.unwrap().sku, "A");
        assert!(!first_hit);
        assert_eq!(coord.repo().search_calls.get(), 1);

        let (second, second_hit) = coord.lookup_item("apple").unwrap();
        assert_eq!(second.unwrap().sku, "A");
        assert!(second_hit);
        // The persistent tier was not consulted again.
        assert_eq!(coord.repo().search_calls.get(), 1);
    }

    #[test]
    fn lookup_miss_returns_none_without_cache_fill() {
        let repo = MockRepo::new(Vec::new(), Vec::new());
        let coord = coordinator(repo);
        let (found, hit) = coord.lookup_item("ghost").unwrap();
        assert!(found.is_none());
        assert!(!hit);
        assert!(coord.hot().get(&item_key("ghost")).is_none());
    }

    #[test]
    fn lookup_key_is_case_insensitive() {
        let repo = MockRepo::new(vec![sample_item("A", "Apple")], Vec::new());
        let coord = coordinator(repo);
        let _ = coord.lookup_item("Apple").unwrap();
        let (_, hit) = coord.lookup_item("  apple ").unwrap();
        assert!(hit);
    }

    // ── promotions routing ───────────────────────────────────────────────────

    #[test]
    fn promotions_cached_after_first_fetch() {
        let repo = MockRepo::new(Vec::new(), vec![sample_promo("P1"), sample_promo("P2")]);
        let coord = coordinator(repo);

        let (first, first_hit) = coord.promotions().unwrap();
        assert_eq!(first.len(), 2);
        assert!(!first_hit);

        let (second, second_hit) = coord.promotions().unwrap();
        assert_eq!(second.len(), 2);
        assert!(second_hit);
    }

    #[test]
    fn empty_promotions_are_not_cached() {
        let repo = MockRepo::new(Vec::new(), Vec::new());
        let coord = coordinator(repo);
        let (promos, hit) = coord.promotions().unwrap();
        assert!(promos.is_empty());
        assert!(!hit);
        assert!(coord.hot().get(ACTIVE_PROMOTIONS_KEY).is_none());
    }

    // ── invalidate-and-preload ───────────────────────────────────────────────

    #[test]
    fn invalidate_and_preload_replaces_hot_set() {
        let repo = MockRepo::new(vec![sample_item("A", "Apple")], Vec::new());
        let coord = coordinator(repo);
        coord.hot().set("stale-key", CachedValue::Promotions(Vec::new()));

        coord.invalidate_and_preload().unwrap();

        assert!(coord.hot().get("stale-key").is_none());
        assert!(coord.hot().get(&item_key("Apple")).is_some());
    }
}
