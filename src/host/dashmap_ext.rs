use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Extension helpers for `DashMap` that hand out owned values.
///
/// `DashMap::get()` and `DashMap::iter()` return guards that hold a shard
/// lock. The registry is read from request handlers while caches start and
/// stop, so lookups clone the `Arc` and drop the guard immediately.
pub trait DashMapExt<K, V> {
    /// Clone the value for `key` (dropping the DashMap guard immediately).
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone;

    /// Collect all values by cloning them, ordered by key.
    fn values_sorted(&self) -> Vec<V>
    where
        K: Clone + Ord,
        V: Clone;
}

impl<K, V> DashMapExt<K, V> for DashMap<K, V>
where
    K: Eq + Hash,
{
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).map(|r| r.value().clone())
    }

    fn values_sorted(&self) -> Vec<V>
    where
        K: Clone + Ord,
        V: Clone,
    {
        let mut pairs: Vec<(K, V)> = self
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.into_iter().map(|(_, v)| v).collect()
    }
}
