//! Management model.
//!
//! One resource per running cache, each holding the attribute bindings the
//! registration splitter handed it. Reads go through the binding, so a name
//! that was never registered on a resource (a clustered metric on a local
//! cache, say) is unknown there even though the catalog knows it.

use crate::error::ApiError;
use cachewatch_core::{
    DispatchError, InstanceKey, MetricBinding, MetricDescriptor, MetricResult,
    RegistrationSplitter, RegistrationTarget,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

/// Attribute bindings of one cache.
#[derive(Debug, Default)]
pub struct ManagedResource {
    attributes: HashMap<&'static str, MetricBinding>,
}

impl ManagedResource {
    pub fn binding(&self, attribute: &str) -> Option<&MetricBinding> {
        self.attributes.get(attribute)
    }

    /// Registered attribute names, sorted.
    pub fn attribute_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.attributes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl RegistrationTarget for ManagedResource {
    fn register_metric(&mut self, descriptor: &MetricDescriptor, binding: MetricBinding) {
        self.attributes.insert(descriptor.name(), binding);
    }
}

/// All managed resources, by cache address.
#[derive(Debug)]
pub struct ManagementModel {
    splitter: RegistrationSplitter,
    resources: RwLock<HashMap<InstanceKey, ManagedResource>>,
}

impl ManagementModel {
    pub fn new(splitter: RegistrationSplitter) -> Self {
        Self {
            splitter,
            resources: RwLock::new(HashMap::new()),
        }
    }

    /// Build the resource for `key`, replacing any earlier one. Returns the
    /// number of attributes registered.
    pub fn attach(&self, key: InstanceKey, clustered: bool) -> usize {
        let mut resource = ManagedResource::default();
        self.splitter.register_local(&mut resource);
        if clustered {
            self.splitter.register_clustered(&mut resource);
        }
        let count = resource.len();
        info!(cache = %key, clustered, attributes = count, "Management resource attached");
        self.resources.write().insert(key, resource);
        count
    }

    /// Drop the resource for `key`. Returns whether one existed.
    pub fn detach(&self, key: &InstanceKey) -> bool {
        self.resources.write().remove(key).is_some()
    }

    /// Read one attribute of the cache at `key`.
    ///
    /// Failures found before dispatch are counted here; the dispatcher's
    /// observer counts the rest.
    pub fn read(&self, key: &InstanceKey, attribute: &str) -> Result<MetricResult, ApiError> {
        let binding = self
            .binding(key, attribute)
            .inspect_err(|e| crate::metrics::record_failure(e.error_code()))?;
        binding.read(key).into_result().map_err(ApiError::from)
    }

    fn binding(&self, key: &InstanceKey, attribute: &str) -> Result<MetricBinding, ApiError> {
        let resources = self.resources.read();
        let resource = resources
            .get(key)
            .ok_or_else(|| ApiError::UnknownResource(key.clone()))?;
        resource
            .binding(attribute)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownMetric(attribute.to_string()).into())
    }

    /// Attribute names registered for `key`, if it is managed.
    pub fn attributes(&self, key: &InstanceKey) -> Option<Vec<&'static str>> {
        self.resources.read().get(key).map(ManagedResource::attribute_names)
    }

    /// Managed cache addresses, sorted.
    pub fn keys(&self) -> Vec<InstanceKey> {
        let mut keys: Vec<_> = self.resources.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.resources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.read().is_empty()
    }
}
