//! Processing stages of a hosted cache.
//!
//! Each stage keeps its own counters on relaxed atomics; exact consistency
//! across counters is not required for statistics. A stage exposes its
//! counters through the matching view accessor of [`ProcessingStage`], so
//! the scanner finds it by capability alone.

use cachewatch_core::{
    ActivationStats, CacheManagementStats, InvalidationStats, ProcessingStage, StoreWriteStats,
    TransactionStats,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// Stage kinds that can appear in a configured chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    Management,
    Transactions,
    Invalidation,
    Activation,
    StoreWrites,
}

impl StageKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Management => "management",
            Self::Transactions => "transactions",
            Self::Invalidation => "invalidation",
            Self::Activation => "activation",
            Self::StoreWrites => "store-writes",
        }
    }
}

/// Increment a relaxed counter, returning the new value.
#[inline]
fn bump(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

#[inline]
fn load(counter: &AtomicI64) -> i64 {
    counter.load(Ordering::Relaxed)
}

#[inline]
fn nanos(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX)
}

/// Average of `total_nanos` over `count`, in milliseconds.
fn average_millis(total_nanos: i64, count: i64) -> i64 {
    if count == 0 {
        0
    } else {
        total_nanos / count / 1_000_000
    }
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ============================================================================
// Management
// ============================================================================

/// Read/write/remove statistics over the cache's entry table.
#[derive(Debug)]
pub struct ManagementStage {
    entries: Arc<DashMap<String, String>>,
    hits: AtomicI64,
    misses: AtomicI64,
    stores: AtomicI64,
    remove_hits: AtomicI64,
    remove_misses: AtomicI64,
    evictions: AtomicI64,
    read_nanos: AtomicI64,
    write_nanos: AtomicI64,
    remove_nanos: AtomicI64,
    started_at: Instant,
    reset_at: Mutex<Instant>,
}

impl ManagementStage {
    pub fn new(entries: Arc<DashMap<String, String>>) -> Self {
        let now = Instant::now();
        Self {
            entries,
            hits: AtomicI64::new(0),
            misses: AtomicI64::new(0),
            stores: AtomicI64::new(0),
            remove_hits: AtomicI64::new(0),
            remove_misses: AtomicI64::new(0),
            evictions: AtomicI64::new(0),
            read_nanos: AtomicI64::new(0),
            write_nanos: AtomicI64::new(0),
            remove_nanos: AtomicI64::new(0),
            started_at: now,
            reset_at: Mutex::new(now),
        }
    }

    pub fn record_read(&self, hit: bool, elapsed: Duration) {
        bump(if hit { &self.hits } else { &self.misses });
        self.read_nanos.fetch_add(nanos(elapsed), Ordering::Relaxed);
    }

    pub fn record_write(&self, elapsed: Duration) {
        bump(&self.stores);
        self.write_nanos.fetch_add(nanos(elapsed), Ordering::Relaxed);
    }

    pub fn record_remove(&self, hit: bool, elapsed: Duration) {
        bump(if hit { &self.remove_hits } else { &self.remove_misses });
        self.remove_nanos.fetch_add(nanos(elapsed), Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        bump(&self.evictions);
    }

    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.stores,
            &self.remove_hits,
            &self.remove_misses,
            &self.evictions,
            &self.read_nanos,
            &self.write_nanos,
            &self.remove_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        *self.reset_at.lock() = Instant::now();
    }

    fn reads(&self) -> i64 {
        load(&self.hits) + load(&self.misses)
    }
}

impl CacheManagementStats for ManagementStage {
    fn average_read_time(&self) -> i64 {
        average_millis(load(&self.read_nanos), self.reads())
    }

    fn average_write_time(&self) -> i64 {
        average_millis(load(&self.write_nanos), load(&self.stores))
    }

    fn average_remove_time(&self) -> i64 {
        let removes = load(&self.remove_hits) + load(&self.remove_misses);
        average_millis(load(&self.remove_nanos), removes)
    }

    fn elapsed_time(&self) -> i64 {
        self.started_at.elapsed().as_secs() as i64
    }

    fn evictions(&self) -> i64 {
        load(&self.evictions)
    }

    fn hit_ratio(&self) -> f64 {
        ratio(load(&self.hits), self.reads())
    }

    fn hits(&self) -> i64 {
        load(&self.hits)
    }

    fn misses(&self) -> i64 {
        load(&self.misses)
    }

    fn number_of_entries(&self) -> i64 {
        self.entries.len() as i64
    }

    fn read_write_ratio(&self) -> f64 {
        ratio(self.reads(), load(&self.stores))
    }

    fn remove_hits(&self) -> i64 {
        load(&self.remove_hits)
    }

    fn remove_misses(&self) -> i64 {
        load(&self.remove_misses)
    }

    fn stores(&self) -> i64 {
        load(&self.stores)
    }

    fn time_since_reset(&self) -> i64 {
        self.reset_at.lock().elapsed().as_secs() as i64
    }
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Default)]
pub struct TransactionStage {
    commits: AtomicI64,
    prepares: AtomicI64,
    rollbacks: AtomicI64,
}

impl TransactionStage {
    pub fn record_prepare(&self) {
        bump(&self.prepares);
    }

    pub fn record_commit(&self) {
        bump(&self.commits);
    }

    pub fn record_rollback(&self) {
        bump(&self.rollbacks);
    }

    pub fn reset(&self) {
        self.commits.store(0, Ordering::Relaxed);
        self.prepares.store(0, Ordering::Relaxed);
        self.rollbacks.store(0, Ordering::Relaxed);
    }
}

impl TransactionStats for TransactionStage {
    fn commits(&self) -> i64 {
        load(&self.commits)
    }

    fn prepares(&self) -> i64 {
        load(&self.prepares)
    }

    fn rollbacks(&self) -> i64 {
        load(&self.rollbacks)
    }
}

// ============================================================================
// Invalidation
// ============================================================================

#[derive(Debug, Default)]
pub struct InvalidationStage {
    invalidations: AtomicI64,
}

impl InvalidationStage {
    pub fn record_invalidation(&self) {
        bump(&self.invalidations);
    }

    pub fn reset(&self) {
        self.invalidations.store(0, Ordering::Relaxed);
    }
}

impl InvalidationStats for InvalidationStage {
    fn invalidations(&self) -> i64 {
        load(&self.invalidations)
    }
}

// ============================================================================
// Activation (cache loader)
// ============================================================================

#[derive(Debug, Default)]
pub struct ActivationStage {
    loads: AtomicI64,
    misses: AtomicI64,
}

impl ActivationStage {
    pub fn record_load(&self, found: bool) {
        bump(if found { &self.loads } else { &self.misses });
    }

    pub fn reset(&self) {
        self.loads.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl ActivationStats for ActivationStage {
    fn cache_loader_loads(&self) -> i64 {
        load(&self.loads)
    }

    fn cache_loader_misses(&self) -> i64 {
        load(&self.misses)
    }
}

// ============================================================================
// Store writes
// ============================================================================

#[derive(Debug, Default)]
pub struct StoreWriteStage {
    writes: AtomicI64,
}

impl StoreWriteStage {
    pub fn record_store_write(&self) {
        bump(&self.writes);
    }

    pub fn reset(&self) {
        self.writes.store(0, Ordering::Relaxed);
    }
}

impl StoreWriteStats for StoreWriteStage {
    fn writes_to_the_stores(&self) -> i64 {
        load(&self.writes)
    }
}

// ============================================================================
// Chain element
// ============================================================================

/// One element of a hosted cache's chain.
#[derive(Debug)]
pub enum HostedStage {
    Management(ManagementStage),
    Transactions(TransactionStage),
    Invalidation(InvalidationStage),
    Activation(ActivationStage),
    StoreWrites(StoreWriteStage),
}

impl HostedStage {
    /// Build a stage of `kind` over the cache's entry table.
    pub fn build(kind: StageKind, entries: &Arc<DashMap<String, String>>) -> Self {
        match kind {
            StageKind::Management => Self::Management(ManagementStage::new(Arc::clone(entries))),
            StageKind::Transactions => Self::Transactions(TransactionStage::default()),
            StageKind::Invalidation => Self::Invalidation(InvalidationStage::default()),
            StageKind::Activation => Self::Activation(ActivationStage::default()),
            StageKind::StoreWrites => Self::StoreWrites(StoreWriteStage::default()),
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Self::Management(_) => StageKind::Management,
            Self::Transactions(_) => StageKind::Transactions,
            Self::Invalidation(_) => StageKind::Invalidation,
            Self::Activation(_) => StageKind::Activation,
            Self::StoreWrites(_) => StageKind::StoreWrites,
        }
    }

    pub fn as_management(&self) -> Option<&ManagementStage> {
        match self {
            Self::Management(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_transactions(&self) -> Option<&TransactionStage> {
        match self {
            Self::Transactions(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_invalidation(&self) -> Option<&InvalidationStage> {
        match self {
            Self::Invalidation(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_activation(&self) -> Option<&ActivationStage> {
        match self {
            Self::Activation(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_store_writes(&self) -> Option<&StoreWriteStage> {
        match self {
            Self::StoreWrites(s) => Some(s),
            _ => None,
        }
    }

    pub fn reset(&self) {
        match self {
            Self::Management(s) => s.reset(),
            Self::Transactions(s) => s.reset(),
            Self::Invalidation(s) => s.reset(),
            Self::Activation(s) => s.reset(),
            Self::StoreWrites(s) => s.reset(),
        }
    }
}

impl ProcessingStage for HostedStage {
    fn name(&self) -> &str {
        self.kind().name()
    }

    fn cache_management(&self) -> Option<&dyn CacheManagementStats> {
        self.as_management().map(|s| s as &dyn CacheManagementStats)
    }

    fn transactions(&self) -> Option<&dyn TransactionStats> {
        self.as_transactions().map(|s| s as &dyn TransactionStats)
    }

    fn invalidation(&self) -> Option<&dyn InvalidationStats> {
        self.as_invalidation().map(|s| s as &dyn InvalidationStats)
    }

    fn activation(&self) -> Option<&dyn ActivationStats> {
        self.as_activation().map(|s| s as &dyn ActivationStats)
    }

    fn store_writes(&self) -> Option<&dyn StoreWriteStats> {
        self.as_store_writes().map(|s| s as &dyn StoreWriteStats)
    }
}
