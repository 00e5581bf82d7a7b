//! Expose the catalog to management registration targets.
//!
//! Local metrics go to every cache resource; clustered metrics only to
//! resources backed by a clustered cache.

use crate::catalog::MetricDescriptor;
use crate::dispatch::{DispatchOutcome, MetricDispatcher, MetricRequest};
use crate::instance::InstanceKey;
use std::sync::Arc;
use tracing::{debug, info};

/// A readable attribute bound to the dispatcher.
#[derive(Clone, Debug)]
pub struct MetricBinding {
    dispatcher: Arc<MetricDispatcher>,
    attribute: &'static str,
}

impl MetricBinding {
    /// Attribute this binding reads.
    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    /// Read the bound attribute from the cache at `key`.
    pub fn read(&self, key: &InstanceKey) -> DispatchOutcome {
        self.dispatcher.handle(&MetricRequest::new(key, self.attribute))
    }
}

/// Something that accepts readable attribute registrations.
///
/// Registering a name twice replaces the earlier binding.
pub trait RegistrationTarget {
    /// Register `descriptor` as a readable attribute served by `binding`.
    fn register_metric(&mut self, descriptor: &MetricDescriptor, binding: MetricBinding);
}

/// Splits the dispatcher's catalog into local and clustered registrations.
#[derive(Clone, Debug)]
pub struct RegistrationSplitter {
    dispatcher: Arc<MetricDispatcher>,
}

impl RegistrationSplitter {
    /// Create a splitter for `dispatcher`'s catalog.
    pub fn new(dispatcher: Arc<MetricDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Register every non-clustered metric. Returns how many were registered.
    pub fn register_local(&self, target: &mut dyn RegistrationTarget) -> usize {
        self.register_all(target, self.dispatcher.catalog().local_subset())
    }

    /// Register every clustered metric. Returns how many were registered.
    pub fn register_clustered(&self, target: &mut dyn RegistrationTarget) -> usize {
        self.register_all(target, self.dispatcher.catalog().clustered_subset())
    }

    fn register_all<'a>(
        &self,
        target: &mut dyn RegistrationTarget,
        descriptors: impl Iterator<Item = &'a MetricDescriptor>,
    ) -> usize {
        let mut count = 0;
        for descriptor in descriptors {
            debug!(
                metric = descriptor.name(),
                clustered = descriptor.clustered(),
                "Registering metric"
            );
            let binding = MetricBinding {
                dispatcher: Arc::clone(&self.dispatcher),
                attribute: descriptor.name(),
            };
            target.register_metric(descriptor, binding);
            count += 1;
        }
        info!(count, "Metrics registered");
        count
    }
}
