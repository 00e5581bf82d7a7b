//! Static catalog of readable cache metrics.
//!
//! Every metric the management surface can read is listed once in
//! [`define_metrics!`] below, together with its attribute name, value type,
//! and whether it only makes sense on a clustered (replicated) cache. The
//! process-wide [`MetricCatalog::standard`] table is built from that list
//! on first use and never mutated afterwards.

use crate::value::ValueType;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

// ============================================================================
// Metric Definition Macro
// ============================================================================

/// Defines the closed [`Metric`] enum and its static metadata.
///
/// Each line is `Variant => "attribute-name", ValueType, clustered;`.
macro_rules! define_metrics {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, $ty:ident, $clustered:literal; )*) => {
        /// A metric known to the resolver.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Metric {
            $( $(#[$doc])* $variant, )*
        }

        impl Metric {
            /// Every metric, in catalog order.
            pub const ALL: &'static [Metric] = &[ $( Metric::$variant, )* ];

            /// Attribute name on the management surface.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Metric::$variant => $name, )*
                }
            }

            /// Declared value type.
            pub const fn value_type(self) -> ValueType {
                match self {
                    $( Metric::$variant => ValueType::$ty, )*
                }
            }

            /// Whether the metric requires a clustered deployment.
            pub const fn clustered(self) -> bool {
                match self {
                    $( Metric::$variant => $clustered, )*
                }
            }
        }
    };
}

define_metrics! {
    /// Lifecycle status of the cache.
    CacheStatus => "cache-status", String, false;
    /// Version string of the cache implementation.
    Version => "version", String, false;
    /// Name of the cache instance.
    CacheName => "cache-name", String, false;

    // Lock state
    /// Lock stripes currently free.
    NumberOfLocksAvailable => "number-of-locks-available", Int, false;
    /// Lock stripes currently held.
    NumberOfLocksHeld => "number-of-locks-held", Int, false;
    /// Configured lock concurrency level.
    ConcurrencyLevel => "concurrency-level", Int, false;

    // Cache management stage
    /// Average read latency in milliseconds.
    AverageReadTime => "average-read-time", Long, false;
    /// Average write latency in milliseconds.
    AverageWriteTime => "average-write-time", Long, false;
    /// Average remove latency in milliseconds.
    AverageRemoveTime => "average-remove-time", Long, false;
    /// Seconds since statistics collection started.
    ElapsedTime => "elapsed-time", Long, false;
    /// Entries evicted.
    Evictions => "evictions", Long, false;
    /// Hits over total reads.
    HitRatio => "hit-ratio", Double, false;
    /// Reads that found an entry.
    Hits => "hits", Long, false;
    /// Reads that found nothing.
    Misses => "misses", Long, false;
    /// Entries currently stored.
    NumberOfEntries => "number-of-entries", Int, false;
    /// Reads over writes.
    ReadWriteRatio => "read-write-ratio", Double, false;
    /// Removes that found an entry.
    RemoveHits => "remove-hits", Long, false;
    /// Removes that found nothing.
    RemoveMisses => "remove-misses", Long, false;
    /// Writes.
    Stores => "stores", Long, false;
    /// Seconds since statistics were last reset.
    TimeSinceReset => "time-since-reset", Long, false;

    // Transaction stage
    /// Committed transactions.
    Commits => "commits", Long, false;
    /// Prepared transactions.
    Prepares => "prepares", Long, false;
    /// Rolled back transactions.
    Rollbacks => "rollbacks", Long, false;

    // Invalidation stage
    /// Invalidations issued.
    Invalidations => "invalidations", Long, false;

    // Named managers
    /// Entries passivated to the store.
    Passivations => "passivations", Long, false;
    /// Entries activated from the store.
    Activations => "activations", Long, false;

    // Activation and store-write stages
    /// Entries loaded from the cache loader.
    CacheLoaderLoads => "cache-loader-loads", Long, false;
    /// Loader lookups that found nothing.
    CacheLoaderMisses => "cache-loader-misses", Long, false;
    /// Writes propagated to the cache store.
    CacheLoaderStores => "cache-loader-stores", Long, false;

    // Replication
    /// Average replication latency in milliseconds.
    AverageReplicationTime => "average-replication-time", Long, true;
    /// Successful replications.
    ReplicationCount => "replication-count", Long, true;
    /// Failed replications.
    ReplicationFailures => "replication-failures", Long, true;
    /// Successful over attempted replications.
    SuccessRatio => "success-ratio", Double, true;
}

/// Static description of one readable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricDescriptor {
    metric: Metric,
    value_type: ValueType,
    clustered: bool,
}

impl MetricDescriptor {
    /// Descriptor carrying the metric's own metadata.
    pub const fn of(metric: Metric) -> Self {
        Self {
            metric,
            value_type: metric.value_type(),
            clustered: metric.clustered(),
        }
    }

    /// Same descriptor with a different clustering classification.
    pub const fn with_clustered(self, clustered: bool) -> Self {
        Self { clustered, ..self }
    }

    /// The metric this descriptor resolves to.
    #[inline]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Attribute name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.metric.name()
    }

    /// Declared value type.
    #[inline]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Whether the descriptor belongs to the clustered subset.
    #[inline]
    pub const fn clustered(&self) -> bool {
        self.clustered
    }
}

/// Immutable, ordered table of metric descriptors with a name index.
#[derive(Debug)]
pub struct MetricCatalog {
    descriptors: Vec<MetricDescriptor>,
    index: HashMap<&'static str, usize>,
}

static STANDARD: OnceLock<Arc<MetricCatalog>> = OnceLock::new();

impl MetricCatalog {
    /// Build a catalog from descriptors, preserving their order.
    ///
    /// # Panics
    ///
    /// Panics if two descriptors share a name.
    pub fn new(descriptors: impl IntoIterator<Item = MetricDescriptor>) -> Self {
        let descriptors: Vec<MetricDescriptor> = descriptors.into_iter().collect();
        let mut index = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.name(), position).is_some() {
                panic!("duplicate metric descriptor: {}", descriptor.name());
            }
        }
        Self { descriptors, index }
    }

    /// The process-wide catalog of every [`Metric`].
    pub fn standard() -> Arc<MetricCatalog> {
        let catalog = STANDARD.get_or_init(|| {
            let descriptors = Metric::ALL.iter().copied().map(MetricDescriptor::of);
            Arc::new(MetricCatalog::new(descriptors))
        });
        Arc::clone(catalog)
    }

    /// Look up a descriptor by exact attribute name.
    pub fn lookup(&self, name: &str) -> Option<&MetricDescriptor> {
        self.index.get(name).map(|&position| &self.descriptors[position])
    }

    /// Descriptors readable on every cache.
    pub fn local_subset(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.descriptors.iter().filter(|d| !d.clustered())
    }

    /// Descriptors readable only on clustered caches.
    pub fn clustered_subset(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.descriptors.iter().filter(|d| d.clustered())
    }

    /// All descriptors in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.descriptors.iter()
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
