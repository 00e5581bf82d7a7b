//! Reference cache host.
//!
//! Owns the running caches and answers registry lookups for the
//! dispatcher. Caches are keyed by `(container, cache)`.

mod cache;
mod dashmap_ext;
mod stages;

pub use cache::{CacheSettings, LocalCache, LockGuard, LockTable};
pub use stages::StageKind;

use crate::error::HostError;
use cachewatch_core::{CacheInstance, ComponentStatus, InstanceKey, InstanceRegistry};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap_ext::DashMapExt;
use std::sync::Arc;
use tracing::info;

/// Running caches, by address.
#[derive(Debug, Default)]
pub struct CacheHost {
    caches: DashMap<InstanceKey, Arc<LocalCache>>,
}

impl CacheHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a cache and register it under `key`.
    pub fn start(
        &self,
        key: InstanceKey,
        settings: &CacheSettings,
    ) -> Result<Arc<LocalCache>, HostError> {
        if !key.is_well_formed() {
            return Err(HostError::MalformedKey(key));
        }
        match self.caches.entry(key.clone()) {
            Entry::Occupied(_) => Err(HostError::AlreadyRunning(key)),
            Entry::Vacant(slot) => {
                let cache = Arc::new(LocalCache::new(key.clone(), settings));
                cache.set_status(ComponentStatus::Initializing);
                slot.insert(Arc::clone(&cache));
                cache.set_status(ComponentStatus::Running);
                info!(
                    cache = %key,
                    clustered = settings.clustered,
                    stages = settings.stages.len(),
                    "Cache started"
                );
                Ok(cache)
            }
        }
    }

    /// Stop a cache and unregister it. Handles held elsewhere observe
    /// `Terminated` afterwards.
    pub fn stop(&self, key: &InstanceKey) -> Result<(), HostError> {
        let Some((_, cache)) = self.caches.remove(key) else {
            return Err(HostError::NotRunning(key.clone()));
        };
        cache.set_status(ComponentStatus::Stopping);
        cache.set_status(ComponentStatus::Terminated);
        info!(cache = %key, "Cache stopped");
        Ok(())
    }

    /// Stop every running cache.
    pub fn stop_all(&self) {
        for cache in self.caches.values_sorted() {
            // A concurrent stop may already have removed it.
            let _ = self.stop(cache.key());
        }
    }

    pub fn get(&self, key: &InstanceKey) -> Option<Arc<LocalCache>> {
        self.caches.get_cloned(key)
    }

    /// Running caches, ordered by address.
    pub fn caches(&self) -> Vec<Arc<LocalCache>> {
        self.caches.values_sorted()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

impl InstanceRegistry for CacheHost {
    fn find(&self, key: &InstanceKey) -> Option<Arc<dyn CacheInstance>> {
        self.caches
            .get_cloned(key)
            .map(|cache| cache as Arc<dyn CacheInstance>)
    }
}
