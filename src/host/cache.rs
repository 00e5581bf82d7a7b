//! A hosted in-memory cache.
//!
//! Operations update the counters of every stage of the matching kind in
//! the chain. Reads through the dispatcher see only the first such stage.

use super::stages::{HostedStage, StageKind};
use cachewatch_core::{
    ActivationManager, CacheInstance, ComponentStatus, InstanceKey, LockState, PassivationManager,
    ProcessingStage, ReplicationStats,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Settings a cache is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub version: String,
    pub clustered: bool,
    pub stages: Vec<StageKind>,
    pub concurrency_level: u32,
    pub passivation: bool,
    pub activation: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            clustered: false,
            stages: vec![StageKind::Management],
            concurrency_level: 1000,
            passivation: false,
            activation: false,
        }
    }
}

// ============================================================================
// Lock table
// ============================================================================

/// Striped lock table; only the number of held stripes is tracked.
#[derive(Debug)]
pub struct LockTable {
    concurrency_level: i64,
    held: AtomicI64,
}

impl LockTable {
    fn new(concurrency_level: u32) -> Self {
        Self {
            concurrency_level: i64::from(concurrency_level),
            held: AtomicI64::new(0),
        }
    }

    /// Acquire a stripe for the lifetime of the returned guard.
    pub fn acquire(&self) -> LockGuard<'_> {
        self.held.fetch_add(1, Ordering::Relaxed);
        LockGuard { table: self }
    }
}

impl LockState for LockTable {
    fn number_of_locks_available(&self) -> i64 {
        (self.concurrency_level - self.held.load(Ordering::Relaxed)).max(0)
    }

    fn number_of_locks_held(&self) -> i64 {
        self.held.load(Ordering::Relaxed)
    }

    fn concurrency_level(&self) -> i64 {
        self.concurrency_level
    }
}

/// Releases its stripe on drop.
#[derive(Debug)]
pub struct LockGuard<'a> {
    table: &'a LockTable,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.table.held.fetch_sub(1, Ordering::Relaxed);
    }
}

// ============================================================================
// Replication and managers
// ============================================================================

#[derive(Debug, Default)]
pub struct ReplicationCounters {
    attempts: AtomicI64,
    failures: AtomicI64,
    total_nanos: AtomicI64,
}

impl ReplicationCounters {
    fn record(&self, success: bool, elapsed: Duration) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        let nanos = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.attempts.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.total_nanos.store(0, Ordering::Relaxed);
    }
}

impl ReplicationStats for ReplicationCounters {
    fn average_replication_time(&self) -> i64 {
        match self.attempts.load(Ordering::Relaxed) {
            0 => 0,
            n => self.total_nanos.load(Ordering::Relaxed) / n / 1_000_000,
        }
    }

    fn replication_count(&self) -> i64 {
        self.attempts.load(Ordering::Relaxed)
    }

    fn replication_failures(&self) -> i64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn success_ratio(&self) -> f64 {
        match self.attempts.load(Ordering::Relaxed) {
            0 => 0.0,
            n => (n - self.failures.load(Ordering::Relaxed)) as f64 / n as f64,
        }
    }
}

/// Counts entries moved out to the store.
#[derive(Debug, Default)]
pub struct Passivator {
    passivations: AtomicI64,
}

impl PassivationManager for Passivator {
    fn passivations(&self) -> i64 {
        self.passivations.load(Ordering::Relaxed)
    }
}

/// Counts entries brought back from the store.
#[derive(Debug, Default)]
pub struct Activator {
    activations: AtomicI64,
}

impl ActivationManager for Activator {
    fn activation_count(&self) -> i64 {
        self.activations.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Cache
// ============================================================================

/// A running cache with its chain and optional subcomponents.
pub struct LocalCache {
    key: InstanceKey,
    version: String,
    status: RwLock<ComponentStatus>,
    entries: Arc<DashMap<String, String>>,
    /// Passivated entries, keyed like `entries`.
    store: DashMap<String, String>,
    hosted: Vec<Arc<HostedStage>>,
    chain: Vec<Arc<dyn ProcessingStage>>,
    locks: LockTable,
    replication: Option<ReplicationCounters>,
    passivator: Option<Passivator>,
    activator: Option<Activator>,
}

impl LocalCache {
    /// Build a cache in the `Instantiated` state.
    pub fn new(key: InstanceKey, settings: &CacheSettings) -> Self {
        let entries = Arc::new(DashMap::new());
        let hosted: Vec<Arc<HostedStage>> = settings
            .stages
            .iter()
            .map(|kind| Arc::new(HostedStage::build(*kind, &entries)))
            .collect();
        let chain = hosted
            .iter()
            .map(|stage| Arc::clone(stage) as Arc<dyn ProcessingStage>)
            .collect();

        Self {
            key,
            version: settings.version.clone(),
            status: RwLock::new(ComponentStatus::Instantiated),
            entries,
            store: DashMap::new(),
            hosted,
            chain,
            locks: LockTable::new(settings.concurrency_level),
            replication: settings.clustered.then(ReplicationCounters::default),
            passivator: settings.passivation.then(Passivator::default),
            activator: settings.activation.then(Activator::default),
        }
    }

    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    pub fn is_clustered(&self) -> bool {
        self.replication.is_some()
    }

    pub fn set_status(&self, status: ComponentStatus) {
        let mut current = self.status.write();
        trace!(cache = %self.key, from = %*current, to = %status, "Cache status change");
        *current = status;
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    fn stages_of<'a, T: 'a>(
        &'a self,
        pick: fn(&HostedStage) -> Option<&T>,
    ) -> impl Iterator<Item = &'a T> + 'a {
        self.hosted.iter().filter_map(move |stage| pick(stage))
    }

    /// Read an entry. Falls back to the cache loader for passivated keys
    /// when an activation stage is configured.
    pub fn get(&self, key: &str) -> Option<String> {
        let started = Instant::now();
        let mut value = self.entries.get(key).map(|v| v.value().clone());
        if value.is_none() && self.stages_of(HostedStage::as_activation).next().is_some() {
            value = self.activate(key);
        }
        let elapsed = started.elapsed();
        for m in self.stages_of(HostedStage::as_management) {
            m.record_read(value.is_some(), elapsed);
        }
        value
    }

    /// Store an entry, returning the previous value.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let started = Instant::now();
        let previous = {
            let _stripe = self.locks.acquire();
            self.entries.insert(key.into(), value.into())
        };
        let elapsed = started.elapsed();
        for m in self.stages_of(HostedStage::as_management) {
            m.record_write(elapsed);
        }
        for s in self.stages_of(HostedStage::as_store_writes) {
            s.record_store_write();
        }
        previous
    }

    /// Remove an entry, returning its value.
    pub fn remove(&self, key: &str) -> Option<String> {
        let started = Instant::now();
        let removed = {
            let _stripe = self.locks.acquire();
            self.entries.remove(key).map(|(_, v)| v)
        };
        let elapsed = started.elapsed();
        for m in self.stages_of(HostedStage::as_management) {
            m.record_remove(removed.is_some(), elapsed);
        }
        removed
    }

    /// Drop an entry without counting it as a remove.
    pub fn evict(&self, key: &str) -> bool {
        let evicted = self.entries.remove(key).is_some();
        if evicted {
            for m in self.stages_of(HostedStage::as_management) {
                m.record_eviction();
            }
        }
        evicted
    }

    /// Move an entry out to the store.
    pub fn passivate(&self, key: &str) -> bool {
        let Some((key, value)) = self.entries.remove(key) else {
            return false;
        };
        self.store.insert(key, value);
        if let Some(passivator) = &self.passivator {
            passivator.passivations.fetch_add(1, Ordering::Relaxed);
        }
        for s in self.stages_of(HostedStage::as_store_writes) {
            s.record_store_write();
        }
        true
    }

    /// Bring a passivated entry back into memory.
    pub fn activate(&self, key: &str) -> Option<String> {
        let loaded = self.store.remove(key);
        for a in self.stages_of(HostedStage::as_activation) {
            a.record_load(loaded.is_some());
        }
        let (key, value) = loaded?;
        if let Some(activator) = &self.activator {
            activator.activations.fetch_add(1, Ordering::Relaxed);
        }
        self.entries.insert(key, value.clone());
        Some(value)
    }

    /// Drop an entry on behalf of a remote writer.
    pub fn invalidate(&self, key: &str) -> bool {
        let invalidated = self.entries.remove(key).is_some();
        for i in self.stages_of(HostedStage::as_invalidation) {
            i.record_invalidation();
        }
        invalidated
    }

    /// Run `work` as one transaction: prepared up front, then committed on
    /// `Ok` or rolled back on `Err`. Entries written before an `Err` stay.
    pub fn transaction<T, E>(&self, work: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E> {
        for t in self.stages_of(HostedStage::as_transactions) {
            t.record_prepare();
        }
        let outcome = work(self);
        for t in self.stages_of(HostedStage::as_transactions) {
            if outcome.is_ok() {
                t.record_commit();
            } else {
                t.record_rollback();
            }
        }
        outcome
    }

    /// Record one replication round. Ignored on non-clustered caches.
    pub fn record_replication(&self, success: bool, elapsed: Duration) {
        if let Some(replication) = &self.replication {
            replication.record(success, elapsed);
        }
    }

    /// Zero every stage and replication counter.
    pub fn reset_statistics(&self) {
        for stage in &self.hosted {
            stage.reset();
        }
        if let Some(replication) = &self.replication {
            replication.reset();
        }
        debug!(cache = %self.key, "Statistics reset");
    }
}

impl CacheInstance for LocalCache {
    fn name(&self) -> &str {
        &self.key.instance
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn status(&self) -> ComponentStatus {
        *self.status.read()
    }

    fn stages(&self) -> &[Arc<dyn ProcessingStage>] {
        &self.chain
    }

    fn lock_state(&self) -> &dyn LockState {
        &self.locks
    }

    fn replication(&self) -> Option<&dyn ReplicationStats> {
        self.replication.as_ref().map(|r| r as &dyn ReplicationStats)
    }

    fn passivation_manager(&self) -> Option<&dyn PassivationManager> {
        self.passivator.as_ref().map(|p| p as &dyn PassivationManager)
    }

    fn activation_manager(&self) -> Option<&dyn ActivationManager> {
        self.activator.as_ref().map(|a| a as &dyn ActivationManager)
    }
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("key", &self.key)
            .field("status", &*self.status.read())
            .field("entries", &self.entries.len())
            .field("stages", &self.hosted.len())
            .field("clustered", &self.is_clustered())
            .finish()
    }
}
