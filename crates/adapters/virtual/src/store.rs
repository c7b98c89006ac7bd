//! In-memory zone directory and cache.

use std::future::Future;
use std::sync::Mutex;

use zonekit_app::ports::{ZoneCache, ZoneDirectory};
use zonekit_domain::definition::ZoneDefinition;
use zonekit_domain::error::ZoneKitError;

/// A zone directory serving a fixed definition set from memory.
pub struct StaticZoneDirectory {
    definitions: Vec<ZoneDefinition>,
}

impl StaticZoneDirectory {
    #[must_use]
    pub fn new(definitions: Vec<ZoneDefinition>) -> Self {
        Self { definitions }
    }
}

impl ZoneDirectory for StaticZoneDirectory {
    fn fetch_zones(
        &self,
    ) -> impl Future<Output = Result<Vec<ZoneDefinition>, ZoneKitError>> + Send {
        let definitions = self.definitions.clone();
        async { Ok(definitions) }
    }
}

/// A zone cache holding the latest snapshot in memory.
#[derive(Default)]
pub struct MemoryZoneCache {
    stored: Mutex<Option<Vec<ZoneDefinition>>>,
}

impl MemoryZoneCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ZoneCache for MemoryZoneCache {
    fn save(
        &self,
        zones: &[ZoneDefinition],
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        let mut stored = self
            .stored
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *stored = Some(zones.to_vec());
        drop(stored);
        async { Ok(()) }
    }

    fn load(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<ZoneDefinition>>, ZoneKitError>> + Send {
        let stored = self
            .stored
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        async { Ok(stored) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonekit_domain::geo::Coordinate;
    use zonekit_domain::zone::ZoneKind;

    fn definition(uid: &str) -> ZoneDefinition {
        ZoneDefinition {
            uid: uid.to_string(),
            name: String::new(),
            kind: ZoneKind::Radius {
                center: Coordinate::new(0.0, 0.0),
                radius_m: 25.0,
            },
            triggers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn should_serve_the_fixed_definition_set() {
        let directory = StaticZoneDirectory::new(vec![definition("z1")]);
        let fetched = directory.fetch_zones().await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].uid, "z1");
    }

    #[tokio::test]
    async fn should_return_none_before_first_save() {
        let cache = MemoryZoneCache::new();
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_replace_snapshot_on_save() {
        let cache = MemoryZoneCache::new();
        cache.save(&[definition("a")]).await.unwrap();
        cache.save(&[definition("b"), definition("c")]).await.unwrap();

        let loaded = cache.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].uid, "b");
    }
}
