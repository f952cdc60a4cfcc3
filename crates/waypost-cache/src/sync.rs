//! Sync ingress: versioned bulk updates from the upstream backend.
//!
//! A [`SyncPayload`] carries optional item and promotion lists plus a
//! monotonically-advancing version token. Each present list is committed to
//! the persistent tier as a single all-or-nothing replace; the version is
//! then recorded, the volatile tier is invalidated and re-preloaded, and
//! the accepted version and update counts are reported back.
//!
//! Applying the same payload twice is idempotent: replace semantics make
//! the second application a no-op in effect, and both calls report the same
//! counts and version.

use crate::coordinator::CacheCoordinator;
use crate::store::{CatalogRepository, CatalogWriter, StoreError};
use tracing::info;
use waypost_types::{SyncPayload, SyncReport};

impl<R: CatalogRepository + CatalogWriter> CacheCoordinator<R> {
    /// Commit `payload` to the persistent tier and refresh the volatile
    /// tier.
    ///
    /// Item and promotion lists are each committed in their own
    /// transaction; a failure propagates to the caller and leaves the
    /// persistent tier at its pre-sync state for that list, with the
    /// volatile tier untouched. The volatile tier is invalidated and
    /// preloaded before this returns, so no stale answer outlives a
    /// successful sync.
    pub fn apply_sync(&mut self, payload: SyncPayload) -> Result<SyncReport, StoreError> {
        let items_updated = match &payload.items {
            Some(items) => self.repo_mut().replace_items(items)?,
            None => 0,
        };
        let promos_updated = match &payload.promotions {
            Some(promos) => self.repo_mut().replace_promotions(promos)?,
            None => 0,
        };
        self.repo_mut().set_version(&payload.version)?;
        if let Some(config) = &payload.store_config {
            self.repo_mut().set_store_config(config)?;
        }

        let preloaded = self.invalidate_and_preload()?;
        info!(
            version = %payload.version,
            items_updated,
            promos_updated,
            preloaded,
            "sync applied"
        );

        Ok(SyncReport {
            accepted_version: payload.version,
            items_updated,
            promos_updated,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
