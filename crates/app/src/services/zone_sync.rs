//! Zone sync service — remote fetch with offline cache fallback.
//!
//! Loads the zone definition set from the remote directory, writing every
//! successful fetch through to the cache. When the fetch fails (offline,
//! server down) the most recently cached set is used instead, so monitoring
//! keeps working with the last known definitions.

use zonekit_domain::definition::ZoneDefinition;
use zonekit_domain::error::ZoneKitError;

use crate::ports::{ZoneCache, ZoneDirectory};

/// Fetch-and-cache orchestration for the zone definition set.
pub struct ZoneSyncService<D, S> {
    directory: D,
    cache: S,
    caching_enabled: bool,
}

impl<D, S> ZoneSyncService<D, S>
where
    D: ZoneDirectory,
    S: ZoneCache,
{
    /// Create a sync service with caching enabled.
    pub fn new(directory: D, cache: S) -> Self {
        Self {
            directory,
            cache,
            caching_enabled: true,
        }
    }

    /// Toggle whether fetched zone sets are written to (and restored from)
    /// the cache.
    #[must_use]
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.caching_enabled = enabled;
        self
    }

    /// Load the current zone definition set.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when the remote fetch fails and no cached
    /// set is available (or caching is disabled). A cache write failure
    /// after a successful fetch is logged, not propagated.
    pub async fn load_zones(&self) -> Result<Vec<ZoneDefinition>, ZoneKitError> {
        match self.directory.fetch_zones().await {
            Ok(definitions) => {
                tracing::info!(zones = definitions.len(), "zone definitions fetched");
                if self.caching_enabled {
                    if let Err(err) = self.cache.save(&definitions).await {
                        tracing::warn!(%err, "failed to cache zone definitions");
                    }
                }
                Ok(definitions)
            }
            Err(fetch_err) => {
                if !self.caching_enabled {
                    return Err(fetch_err);
                }
                tracing::warn!(%fetch_err, "zone fetch failed, falling back to cache");
                match self.cache.load().await {
                    Ok(Some(definitions)) => {
                        tracing::info!(zones = definitions.len(), "loaded cached zone definitions");
                        Ok(definitions)
                    }
                    Ok(None) => Err(fetch_err),
                    Err(cache_err) => {
                        tracing::warn!(%cache_err, "zone cache unreadable");
                        Err(fetch_err)
                    }
                }
            }
        }
    }
}
