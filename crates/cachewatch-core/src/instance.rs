//! The surface of a live cache instance, as seen by the resolver.
//!
//! These traits are implemented by whatever hosts the caches. The core
//! borrows an instance for the duration of one dispatch and never keeps
//! it afterwards.

use crate::stage::ProcessingStage;
use std::fmt;
use std::sync::Arc;

/// Composite identity of a cache: container name plus instance name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
    /// Name of the cache container.
    pub container: String,
    /// Name of the cache within the container.
    pub instance: String,
}

impl InstanceKey {
    /// Create a key.
    pub fn new(container: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            instance: instance.into(),
        }
    }

    /// A key with an empty component can never name a live instance.
    pub fn is_well_formed(&self) -> bool {
        !self.container.is_empty() && !self.instance.is_empty()
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.instance)
    }
}

/// Lifecycle status of a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ComponentStatus {
    /// Created, not yet started.
    Instantiated,
    /// Starting.
    Initializing,
    /// Serving requests.
    Running,
    /// Shutting down.
    Stopping,
    /// Stopped.
    Terminated,
    /// Failed to start or crashed.
    Failed,
}

impl ComponentStatus {
    /// Upper-case status name as reported on the management surface.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instantiated => "INSTANTIATED",
            Self::Initializing => "INITIALIZING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Terminated => "TERMINATED",
            Self::Failed => "FAILED",
        }
    }

    /// Whether the instance has been stopped for good.
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock table view.
pub trait LockState: Send + Sync {
    /// Lock stripes currently free.
    fn number_of_locks_available(&self) -> i64;
    /// Lock stripes currently held.
    fn number_of_locks_held(&self) -> i64;
    /// Configured concurrency level.
    fn concurrency_level(&self) -> i64;
}

/// Replication counters of a clustered instance.
pub trait ReplicationStats: Send + Sync {
    /// Average replication latency in milliseconds.
    fn average_replication_time(&self) -> i64;
    /// Successful replications.
    fn replication_count(&self) -> i64;
    /// Failed replications.
    fn replication_failures(&self) -> i64;
    /// Successful over attempted replications, `0.0` before the first attempt.
    fn success_ratio(&self) -> f64;
}

/// Internal manager that moves entries out to the store.
pub trait PassivationManager: Send + Sync {
    /// Entries passivated.
    fn passivations(&self) -> i64;
}

/// Internal manager that brings entries back from the store.
pub trait ActivationManager: Send + Sync {
    /// Entries activated.
    fn activation_count(&self) -> i64;
}

/// A live cache instance.
pub trait CacheInstance: Send + Sync {
    /// Instance name.
    fn name(&self) -> &str;

    /// Implementation version.
    fn version(&self) -> &str;

    /// Current lifecycle status.
    fn status(&self) -> ComponentStatus;

    /// Processing chain, head first.
    fn stages(&self) -> &[Arc<dyn ProcessingStage>];

    /// Lock table view.
    fn lock_state(&self) -> &dyn LockState;

    /// Replication view; `None` on a non-clustered instance.
    fn replication(&self) -> Option<&dyn ReplicationStats> {
        None
    }

    /// Passivation manager, if one is configured.
    fn passivation_manager(&self) -> Option<&dyn PassivationManager> {
        None
    }

    /// Activation manager, if one is configured.
    fn activation_manager(&self) -> Option<&dyn ActivationManager> {
        None
    }
}

/// External lookup of live instances by key.
pub trait InstanceRegistry: Send + Sync {
    /// The instance registered under `key`, if any. Must not block.
    fn find(&self, key: &InstanceKey) -> Option<Arc<dyn CacheInstance>>;
}
