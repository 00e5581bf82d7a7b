//! Processing stages and the capabilities they declare.
//!
//! A cache instance owns an ordered chain of optional stages (statistics,
//! transactions, invalidation, ...). Each stage declares an explicit,
//! finite [`CapabilitySet`] and exposes one typed counter view per
//! capability it implements. Nothing here inspects concrete types: the
//! scanner only asks a stage what it declares.

use std::fmt;

/// A unit of behavior a stage may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read/write/remove timing, hit and miss counters.
    CacheManagement,
    /// Commit, prepare and rollback counters.
    Transactions,
    /// Invalidation counter.
    Invalidation,
    /// Cache loader loads and misses.
    Activation,
    /// Writes propagated to the cache store.
    StoreWrites,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Capability; 5] = [
        Capability::CacheManagement,
        Capability::Transactions,
        Capability::Invalidation,
        Capability::Activation,
        Capability::StoreWrites,
    ];

    /// Stable name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Capability::CacheManagement => "cache-management",
            Capability::Transactions => "transactions",
            Capability::Invalidation => "invalidation",
            Capability::Activation => "activation",
            Capability::StoreWrites => "store-writes",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of capabilities a stage declares.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builder-style insert.
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Insert a capability.
    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    /// Whether the set contains `capability`.
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::empty();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// ============================================================================
// Counter views
// ============================================================================

/// Counters of a statistics-collecting stage.
///
/// Times are milliseconds, durations are seconds.
pub trait CacheManagementStats: Send + Sync {
    /// Average read latency.
    fn average_read_time(&self) -> i64;
    /// Average write latency.
    fn average_write_time(&self) -> i64;
    /// Average remove latency.
    fn average_remove_time(&self) -> i64;
    /// Seconds since the stage started collecting.
    fn elapsed_time(&self) -> i64;
    /// Evicted entries.
    fn evictions(&self) -> i64;
    /// Hits over total reads, `0.0` before the first read.
    fn hit_ratio(&self) -> f64;
    /// Reads that found an entry.
    fn hits(&self) -> i64;
    /// Reads that found nothing.
    fn misses(&self) -> i64;
    /// Entries currently stored.
    fn number_of_entries(&self) -> i64;
    /// Reads over writes, `0.0` before the first write.
    fn read_write_ratio(&self) -> f64;
    /// Removes that found an entry.
    fn remove_hits(&self) -> i64;
    /// Removes that found nothing.
    fn remove_misses(&self) -> i64;
    /// Writes.
    fn stores(&self) -> i64;
    /// Seconds since the last statistics reset.
    fn time_since_reset(&self) -> i64;
}

/// Transaction counters.
pub trait TransactionStats: Send + Sync {
    /// Committed transactions.
    fn commits(&self) -> i64;
    /// Prepared transactions.
    fn prepares(&self) -> i64;
    /// Rolled back transactions.
    fn rollbacks(&self) -> i64;
}

/// Invalidation counter.
pub trait InvalidationStats: Send + Sync {
    /// Invalidations issued.
    fn invalidations(&self) -> i64;
}

/// Cache loader counters of an activating stage.
pub trait ActivationStats: Send + Sync {
    /// Entries loaded from the loader.
    fn cache_loader_loads(&self) -> i64;
    /// Loader lookups that found nothing.
    fn cache_loader_misses(&self) -> i64;
}

/// Cache store write counter.
pub trait StoreWriteStats: Send + Sync {
    /// Writes propagated to the store.
    fn writes_to_the_stores(&self) -> i64;
}

// ============================================================================
// Stage trait
// ============================================================================

/// One element of an instance's processing chain.
///
/// Implementors override the view accessors for the capabilities they
/// implement. The declared [`capabilities`](ProcessingStage::capabilities)
/// are derived from those accessors unless overridden.
pub trait ProcessingStage: Send + Sync {
    /// Stage name, for logs.
    fn name(&self) -> &str;

    /// Statistics counters, if this stage collects them.
    fn cache_management(&self) -> Option<&dyn CacheManagementStats> {
        None
    }

    /// Transaction counters, if this stage tracks transactions.
    fn transactions(&self) -> Option<&dyn TransactionStats> {
        None
    }

    /// Invalidation counter, if this stage invalidates.
    fn invalidation(&self) -> Option<&dyn InvalidationStats> {
        None
    }

    /// Loader counters, if this stage activates entries.
    fn activation(&self) -> Option<&dyn ActivationStats> {
        None
    }

    /// Store write counter, if this stage writes through to a store.
    fn store_writes(&self) -> Option<&dyn StoreWriteStats> {
        None
    }

    /// Capabilities this stage declares.
    fn capabilities(&self) -> CapabilitySet {
        let mut set = CapabilitySet::empty();
        if self.cache_management().is_some() {
            set.insert(Capability::CacheManagement);
        }
        if self.transactions().is_some() {
            set.insert(Capability::Transactions);
        }
        if self.invalidation().is_some() {
            set.insert(Capability::Invalidation);
        }
        if self.activation().is_some() {
            set.insert(Capability::Activation);
        }
        if self.store_writes().is_some() {
            set.insert(Capability::StoreWrites);
        }
        set
    }
}
