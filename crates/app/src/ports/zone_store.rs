//! Zone store ports — remote definition fetch and offline cache.

use std::future::Future;

use zonekit_domain::definition::ZoneDefinition;
use zonekit_domain::error::ZoneKitError;

/// Fetches the current zone definition set from the remote source.
pub trait ZoneDirectory {
    fn fetch_zones(
        &self,
    ) -> impl Future<Output = Result<Vec<ZoneDefinition>, ZoneKitError>> + Send;
}

impl<T: ZoneDirectory + Send + Sync> ZoneDirectory for std::sync::Arc<T> {
    fn fetch_zones(
        &self,
    ) -> impl Future<Output = Result<Vec<ZoneDefinition>, ZoneKitError>> + Send {
        (**self).fetch_zones()
    }
}

/// Stores the most recent zone definition set for offline reloads.
///
/// The cache holds whole snapshots — `save` replaces the previous set,
/// `load` returns `None` when nothing has been cached yet.
pub trait ZoneCache {
    fn save(
        &self,
        zones: &[ZoneDefinition],
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send;

    fn load(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<ZoneDefinition>>, ZoneKitError>> + Send;
}

impl<T: ZoneCache + Send + Sync> ZoneCache for std::sync::Arc<T> {
    fn save(
        &self,
        zones: &[ZoneDefinition],
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        (**self).save(zones)
    }

    fn load(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<ZoneDefinition>>, ZoneKitError>> + Send {
        (**self).load()
    }
}
