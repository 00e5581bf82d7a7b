//! Compute a metric's value against a resolved instance.
//!
//! Every [`Metric`] maps to exactly one rule:
//!
//! - **direct**: status, name, version read off the instance
//! - **lock**: read off the instance's lock table
//! - **replication**: read off the replication view (clustered caches only)
//! - **chain**: first stage in the processing chain declaring a capability
//! - **manager**: a named internal manager
//!
//! A missing stage or manager is not an error. The metric is reported as
//! present with the zero value of its type, so that monitoring keeps working
//! on caches configured without that subcomponent.

use crate::catalog::{Metric, MetricDescriptor};
use crate::instance::{CacheInstance, ReplicationStats};
use crate::scanner::first_implementing;
use crate::stage::{
    ActivationStats, CacheManagementStats, Capability, InvalidationStats, ProcessingStage,
    StoreWriteStats, TransactionStats,
};
use crate::value::{MetricResult, MetricValue};
use tracing::warn;

/// Stateless resolver; see the module docs for the rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricResolver;

type ManagementRead = fn(&dyn CacheManagementStats) -> MetricValue;
type ReplicationRead = fn(&dyn ReplicationStats) -> MetricValue;

impl MetricResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Compute `descriptor` against `instance`.
    ///
    /// Reads are independent: two metrics read in sequence may reflect
    /// different moments of a cache under load.
    pub fn compute(
        &self,
        instance: &dyn CacheInstance,
        descriptor: &MetricDescriptor,
    ) -> MetricResult {
        let locks = instance.lock_state();
        let lock_count = |count: i64| MetricResult::present(MetricValue::int_saturating(count));
        let management = |read: ManagementRead| self.management(instance, descriptor, read);
        let replication = |read: ReplicationRead| self.replication(instance, descriptor, read);
        let transactions = |f: fn(&dyn TransactionStats) -> i64| {
            self.scan(instance, descriptor, Capability::Transactions, |s| s.transactions().map(f))
        };
        let invalidation = |f: fn(&dyn InvalidationStats) -> i64| {
            self.scan(instance, descriptor, Capability::Invalidation, |s| s.invalidation().map(f))
        };
        let activation = |f: fn(&dyn ActivationStats) -> i64| {
            self.scan(instance, descriptor, Capability::Activation, |s| s.activation().map(f))
        };
        let store_writes = |f: fn(&dyn StoreWriteStats) -> i64| {
            self.scan(instance, descriptor, Capability::StoreWrites, |s| s.store_writes().map(f))
        };

        match descriptor.metric() {
            Metric::CacheStatus => MetricResult::present(instance.status().as_str()),
            Metric::CacheName => MetricResult::present(instance.name()),
            Metric::Version => MetricResult::present(instance.version()),

            Metric::NumberOfLocksAvailable => lock_count(locks.number_of_locks_available()),
            Metric::NumberOfLocksHeld => lock_count(locks.number_of_locks_held()),
            Metric::ConcurrencyLevel => lock_count(locks.concurrency_level()),

            Metric::AverageReadTime => management(|s| s.average_read_time().into()),
            Metric::AverageWriteTime => management(|s| s.average_write_time().into()),
            Metric::AverageRemoveTime => management(|s| s.average_remove_time().into()),
            Metric::ElapsedTime => management(|s| s.elapsed_time().into()),
            Metric::Evictions => management(|s| s.evictions().into()),
            Metric::HitRatio => management(|s| s.hit_ratio().into()),
            Metric::Hits => management(|s| s.hits().into()),
            Metric::Misses => management(|s| s.misses().into()),
            Metric::NumberOfEntries => {
                management(|s| MetricValue::int_saturating(s.number_of_entries()))
            }
            Metric::ReadWriteRatio => management(|s| s.read_write_ratio().into()),
            Metric::RemoveHits => management(|s| s.remove_hits().into()),
            Metric::RemoveMisses => management(|s| s.remove_misses().into()),
            Metric::Stores => management(|s| s.stores().into()),
            Metric::TimeSinceReset => management(|s| s.time_since_reset().into()),

            Metric::Commits => transactions(|tx| tx.commits()),
            Metric::Prepares => transactions(|tx| tx.prepares()),
            Metric::Rollbacks => transactions(|tx| tx.rollbacks()),
            Metric::Invalidations => invalidation(|inv| inv.invalidations()),
            Metric::CacheLoaderLoads => activation(|act| act.cache_loader_loads()),
            Metric::CacheLoaderMisses => activation(|act| act.cache_loader_misses()),
            Metric::CacheLoaderStores => store_writes(|w| w.writes_to_the_stores()),

            Metric::Passivations => MetricResult::or_zero(
                instance.passivation_manager().map(|m| m.passivations().into()),
                descriptor.value_type(),
            ),
            Metric::Activations => MetricResult::or_zero(
                instance.activation_manager().map(|m| m.activation_count().into()),
                descriptor.value_type(),
            ),

            Metric::AverageReplicationTime => replication(|r| r.average_replication_time().into()),
            Metric::ReplicationCount => replication(|r| r.replication_count().into()),
            Metric::ReplicationFailures => replication(|r| r.replication_failures().into()),
            Metric::SuccessRatio => replication(|r| r.success_ratio().into()),
        }
    }

    /// Scan the chain for `capability` and read a counter from the first
    /// match.
    fn scan<F>(
        &self,
        instance: &dyn CacheInstance,
        descriptor: &MetricDescriptor,
        capability: Capability,
        read: F,
    ) -> MetricResult
    where
        F: FnOnce(&dyn ProcessingStage) -> Option<i64>,
    {
        let value = first_implementing(instance.stages(), capability)
            .and_then(|stage| read(stage.as_ref()))
            .map(MetricValue::from);
        MetricResult::or_zero(value, descriptor.value_type())
    }

    fn management(
        &self,
        instance: &dyn CacheInstance,
        descriptor: &MetricDescriptor,
        read: ManagementRead,
    ) -> MetricResult {
        let value = first_implementing(instance.stages(), Capability::CacheManagement)
            .and_then(|stage| stage.cache_management())
            .map(read);
        MetricResult::or_zero(value, descriptor.value_type())
    }

    fn replication(
        &self,
        instance: &dyn CacheInstance,
        descriptor: &MetricDescriptor,
        read: ReplicationRead,
    ) -> MetricResult {
        match instance.replication() {
            Some(stats) => MetricResult::present(read(stats)),
            None => {
                // Clustered metrics are only registered on clustered caches.
                warn!(
                    cache = %instance.name(),
                    metric = descriptor.name(),
                    "Replication metric read on a cache without replication"
                );
                MetricResult::absent(descriptor.value_type())
            }
        }
    }
}
