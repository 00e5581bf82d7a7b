//! Test doubles for the instance surface.
//!
//! `FakeCache` is a cache with a configurable stage chain and optional
//! replication/managers; `FakeRegistry` is a map of live instances.

#![allow(dead_code)]

use cachewatch_core::{
    ActivationManager, ActivationStats, CacheInstance, CacheManagementStats, ComponentLocator,
    ComponentStatus, InstanceKey, InstanceRegistry, LockState, MetricCatalog, MetricDispatcher,
    PassivationManager, ProcessingStage, ReplicationStats, TransactionStats,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

/// Statistics stage whose counters are all derived from one hit counter.
pub struct HitCounter {
    pub hits: AtomicI64,
}

impl HitCounter {
    pub fn new(hits: i64) -> Self {
        Self {
            hits: AtomicI64::new(hits),
        }
    }
}

impl CacheManagementStats for HitCounter {
    fn average_read_time(&self) -> i64 {
        2
    }
    fn average_write_time(&self) -> i64 {
        3
    }
    fn average_remove_time(&self) -> i64 {
        1
    }
    fn elapsed_time(&self) -> i64 {
        60
    }
    fn evictions(&self) -> i64 {
        0
    }
    fn hit_ratio(&self) -> f64 {
        0.5
    }
    fn hits(&self) -> i64 {
        self.hits.load(Ordering::Relaxed)
    }
    fn misses(&self) -> i64 {
        self.hits()
    }
    fn number_of_entries(&self) -> i64 {
        i64::MAX
    }
    fn read_write_ratio(&self) -> f64 {
        2.0
    }
    fn remove_hits(&self) -> i64 {
        0
    }
    fn remove_misses(&self) -> i64 {
        0
    }
    fn stores(&self) -> i64 {
        self.hits()
    }
    fn time_since_reset(&self) -> i64 {
        30
    }
}

impl ProcessingStage for HitCounter {
    fn name(&self) -> &str {
        "statistics"
    }
    fn cache_management(&self) -> Option<&dyn CacheManagementStats> {
        Some(self)
    }
}

/// A stage that only forwards requests.
pub struct Passthrough;

impl ProcessingStage for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Transaction stage with fixed counters.
pub struct Transactions {
    pub commits: i64,
}

impl TransactionStats for Transactions {
    fn commits(&self) -> i64 {
        self.commits
    }
    fn prepares(&self) -> i64 {
        self.commits + 1
    }
    fn rollbacks(&self) -> i64 {
        1
    }
}

impl ProcessingStage for Transactions {
    fn name(&self) -> &str {
        "transactions"
    }
    fn transactions(&self) -> Option<&dyn TransactionStats> {
        Some(self)
    }
}

/// Activation stage with fixed loader counters.
pub struct Loader;

impl ActivationStats for Loader {
    fn cache_loader_loads(&self) -> i64 {
        11
    }
    fn cache_loader_misses(&self) -> i64 {
        4
    }
}

impl ProcessingStage for Loader {
    fn name(&self) -> &str {
        "activation"
    }
    fn activation(&self) -> Option<&dyn ActivationStats> {
        Some(self)
    }
}

pub struct Locks;

impl LockState for Locks {
    fn number_of_locks_available(&self) -> i64 {
        990
    }
    fn number_of_locks_held(&self) -> i64 {
        10
    }
    fn concurrency_level(&self) -> i64 {
        1000
    }
}

pub struct Replication;

impl ReplicationStats for Replication {
    fn average_replication_time(&self) -> i64 {
        7
    }
    fn replication_count(&self) -> i64 {
        3
    }
    fn replication_failures(&self) -> i64 {
        1
    }
    fn success_ratio(&self) -> f64 {
        0.75
    }
}

pub struct Managers;

impl PassivationManager for Managers {
    fn passivations(&self) -> i64 {
        5
    }
}

impl ActivationManager for Managers {
    fn activation_count(&self) -> i64 {
        6
    }
}

pub struct FakeCache {
    pub name: String,
    pub status: RwLock<ComponentStatus>,
    pub stages: Vec<Arc<dyn ProcessingStage>>,
    pub locks: Locks,
    pub replication: Option<Replication>,
    pub managers: Option<Managers>,
}

impl FakeCache {
    pub fn new(name: &str, stages: Vec<Arc<dyn ProcessingStage>>) -> Self {
        Self {
            name: name.to_string(),
            status: RwLock::new(ComponentStatus::Running),
            stages,
            locks: Locks,
            replication: None,
            managers: None,
        }
    }

    pub fn clustered(mut self) -> Self {
        self.replication = Some(Replication);
        self
    }

    pub fn with_managers(mut self) -> Self {
        self.managers = Some(Managers);
        self
    }

    pub fn set_status(&self, status: ComponentStatus) {
        *self.status.write().unwrap() = status;
    }
}

impl CacheInstance for FakeCache {
    fn name(&self) -> &str {
        &self.name
    }
    fn version(&self) -> &str {
        "9.4.0"
    }
    fn status(&self) -> ComponentStatus {
        *self.status.read().unwrap()
    }
    fn stages(&self) -> &[Arc<dyn ProcessingStage>] {
        &self.stages
    }
    fn lock_state(&self) -> &dyn LockState {
        &self.locks
    }
    fn replication(&self) -> Option<&dyn ReplicationStats> {
        self.replication.as_ref().map(|r| r as &dyn ReplicationStats)
    }
    fn passivation_manager(&self) -> Option<&dyn PassivationManager> {
        self.managers.as_ref().map(|m| m as &dyn PassivationManager)
    }
    fn activation_manager(&self) -> Option<&dyn ActivationManager> {
        self.managers.as_ref().map(|m| m as &dyn ActivationManager)
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    caches: RwLock<HashMap<InstanceKey, Arc<FakeCache>>>,
}

impl FakeRegistry {
    pub fn insert(&self, key: InstanceKey, cache: FakeCache) -> Arc<FakeCache> {
        let cache = Arc::new(cache);
        self.caches.write().unwrap().insert(key, Arc::clone(&cache));
        cache
    }
}

impl InstanceRegistry for FakeRegistry {
    fn find(&self, key: &InstanceKey) -> Option<Arc<dyn CacheInstance>> {
        self.caches
            .read()
            .unwrap()
            .get(key)
            .map(|c| Arc::clone(c) as Arc<dyn CacheInstance>)
    }
}

/// A dispatcher over the standard catalog and `registry`.
pub fn dispatcher(registry: &Arc<FakeRegistry>) -> MetricDispatcher {
    let registry: Arc<dyn InstanceRegistry> = registry.clone();
    MetricDispatcher::new(MetricCatalog::standard(), ComponentLocator::new(registry))
}
