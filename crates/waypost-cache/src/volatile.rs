//! Volatile (L1) lookup cache.
//!
//! A capacity-bounded, TTL-bounded key/value store fronting the persistent
//! tier for repeat lookups. Two independent expiry forces act on entries:
//!
//! * a **write-time TTL** – entries older than the configured TTL since
//!   their last write are treated as absent and evicted lazily on access;
//! * a **capacity bound** – writing a new key at capacity evicts the entry
//!   with the oldest last-access timestamp (LRU).
//!
//! All operations take `&self` and are safe to call from any number of
//! concurrent callers; a single mutex guards the map and the hit/miss
//! counters.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use waypost_cache::volatile::VolatileCache;
//!
//! let cache: VolatileCache<String> = VolatileCache::new(100, Duration::from_secs(300));
//! cache.set("item:diesel", "Fuel Island 1".to_string());
//! assert_eq!(cache.get("item:diesel").as_deref(), Some("Fuel Island 1"));
//! assert_eq!(cache.stats().hits, 1);
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Entry and statistics
// ─────────────────────────────────────────────────────────────────────────────

struct Entry<V> {
    value: V,
    written_at: Instant,
    last_access: Instant,
}

/// Point-in-time cache statistics. Querying them has no side effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate_pct: f64,
}

struct State<V> {
    entries: HashMap<String, Entry<V>>,
    hits: u64,
    misses: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// VolatileCache
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded in-process cache with write-time TTL and LRU eviction.
pub struct VolatileCache<V> {
    max_size: usize,
    ttl: Duration,
    state: Mutex<State<V>>,
}

impl<V: Clone> VolatileCache<V> {
    /// Create a cache holding at most `max_size` entries, each valid for
    /// `ttl` after its last write. A `max_size` of zero is clamped to one.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            max_size: max_size.max(1),
            ttl,
            state: Mutex::new(State {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch `key` if present and unexpired.
    ///
    /// A hit refreshes the entry's last-access time and increments the hit
    /// counter; a miss (absent or expired) increments the miss counter. An
    /// expired entry is removed on the spot.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let now = Instant::now();

        let expired = match state.entries.get(key) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(entry) => now.duration_since(entry.written_at) > self.ttl,
        };
        if expired {
            state.entries.remove(key);
            state.misses += 1;
            debug!(key, "volatile entry expired");
            return None;
        }

        let entry = state.entries.get_mut(key)?;
        entry.last_access = now;
        let value = entry.value.clone();
        state.hits += 1;
        Some(value)
    }

    /// Insert or overwrite `key`, refreshing its TTL window.
    ///
    /// When the write would grow the cache past its capacity, the entry with
    /// the oldest last-access time is evicted first.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut state = self.lock();
        let now = Instant::now();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_size {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest {
                state.entries.remove(&oldest_key);
                debug!(key = %oldest_key, "volatile entry evicted (LRU)");
            }
        }

        state.entries.insert(
            key,
            Entry {
                value,
                written_at: now,
                last_access: now,
            },
        );
    }

    /// Remove a single entry. Returns whether anything was removed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Remove every entry. Counters are retained.
    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.entries.clear();
        info!("volatile cache invalidated");
    }

    /// Number of entries currently held (expired entries not yet touched are
    /// still counted).
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Current statistics snapshot. Does not mutate any state.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let total = state.hits + state.misses;
        let hit_rate_pct = if total > 0 {
            (state.hits as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };
        CacheStats {
            size: state.entries.len(),
            max_size: self.max_size,
            hits: state.hits,
            misses: state.misses,
            hit_rate_pct,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
