//! Locate a live cache instance by composite key.

use crate::instance::{CacheInstance, InstanceKey, InstanceRegistry};
use std::sync::Arc;
use tracing::trace;

/// Resolves [`InstanceKey`]s against an external registry.
#[derive(Clone)]
pub struct ComponentLocator {
    registry: Arc<dyn InstanceRegistry>,
}

impl ComponentLocator {
    /// Wrap a registry.
    pub fn new(registry: Arc<dyn InstanceRegistry>) -> Self {
        Self { registry }
    }

    /// The live instance for `key`.
    ///
    /// `None` when the key is malformed, the instance was never started,
    /// or it has already terminated.
    pub fn resolve(&self, key: &InstanceKey) -> Option<Arc<dyn CacheInstance>> {
        if !key.is_well_formed() {
            trace!(%key, "Malformed instance key");
            return None;
        }
        let instance = self.registry.find(key)?;
        if instance.status().is_terminated() {
            trace!(%key, "Instance already terminated");
            return None;
        }
        Some(instance)
    }
}

impl std::fmt::Debug for ComponentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLocator").finish_non_exhaustive()
    }
}
