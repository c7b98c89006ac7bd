//! # zonekit-adapter-storage-json
//!
//! Storage adapter — persists the most recently fetched zone definition set
//! as a JSON document so monitoring can resume offline.
//!
//! The cache holds whole snapshots: `save` atomically replaces the file
//! (write to a sibling temp file, then rename), `load` returns `None` when
//! no snapshot exists yet.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `zonekit-app` and `zonekit-domain`.

use std::future::Future;
use std::path::{Path, PathBuf};

use zonekit_app::ports::ZoneCache;
use zonekit_domain::definition::ZoneDefinition;
use zonekit_domain::error::ZoneKitError;

/// Errors specific to the JSON file cache.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the cache file failed.
    #[error("cache file IO error")]
    Io(#[from] std::io::Error),

    /// The cache file holds something that is not a zone definition set.
    #[error("cache file is corrupt")]
    Corrupt(#[from] serde_json::Error),
}

impl From<StorageError> for ZoneKitError {
    fn from(err: StorageError) -> Self {
        ZoneKitError::Cache(Box::new(err))
    }
}

/// Zone cache backed by a single JSON file.
pub struct FileZoneCache {
    path: PathBuf,
}

impl FileZoneCache {
    /// Create a cache at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cache file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_snapshot(&self, zones: &[ZoneDefinition]) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(zones)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, &body).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    async fn read_snapshot(&self) -> Result<Option<Vec<ZoneDefinition>>, StorageError> {
        let body = match tokio::fs::read(&self.path).await {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let zones = serde_json::from_slice(&body)?;
        Ok(Some(zones))
    }
}

impl ZoneCache for FileZoneCache {
    fn save(
        &self,
        zones: &[ZoneDefinition],
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        async move {
            self.write_snapshot(zones).await.map_err(|err| {
                tracing::warn!(path = %self.path.display(), %err, "failed to write zone cache");
                ZoneKitError::from(err)
            })?;
            tracing::debug!(path = %self.path.display(), zones = zones.len(), "zone cache written");
            Ok(())
        }
    }

    fn load(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<ZoneDefinition>>, ZoneKitError>> + Send {
        async move {
            let snapshot = self.read_snapshot().await?;
            Ok(snapshot)
        }
    }
}
