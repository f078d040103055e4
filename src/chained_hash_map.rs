//! ChainedHashMap: the public, thread-safe map.
//!
//! A single `parking_lot::Mutex` serializes every operation over the
//! whole table. Values and keys are copied out; no reference into the
//! table ever escapes the lock. Anything removed from the table is
//! dropped only after the lock is released.

use crate::builder::MapBuilder;
use crate::error::{MapError, Result};
use crate::growth::GrowthPolicy;
use crate::reentrancy::ReentrancyGuard;
use crate::snapshot::Snapshot;
use crate::table::Table;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;
use std::collections::hash_map::RandomState;

pub struct ChainedHashMap<K, V, S = RandomState> {
    table: Mutex<Table<K, V, S>>,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// An empty map with 19 buckets and the default growth policy.
    pub fn new() -> Self {
        Self::from_table(Table::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Start configuring a map; see [`MapBuilder`].
    pub fn builder() -> MapBuilder<K, V> {
        MapBuilder::new()
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn from_table(table: Table<K, V, S>) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }

    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(crate::growth::DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::from_table(Table::with_config(
            capacity,
            GrowthPolicy::default(),
            hasher,
        ))
    }

    /// Run `f` with the table locked. Whatever `f` returns is handed back
    /// after the lock is released, so dropping it cannot block the map.
    #[inline]
    fn locked<R>(&self, f: impl FnOnce(&mut Table<K, V, S>) -> R) -> R {
        let _g = ReentrancyGuard::enter(&self.table);
        let mut table = self.table.lock();
        f(&mut table)
    }

    pub fn len(&self) -> usize {
        self.locked(|t| t.len())
    }
    pub fn is_empty(&self) -> bool {
        self.locked(|t| t.is_empty())
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.locked(|t| t.capacity())
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        self.locked(|t| t.growth_policy())
    }

    /// Insert `key` only if it is absent. Returns `false`, leaving the map
    /// untouched, when the key is already present.
    pub fn add(&self, key: K, value: V) -> bool {
        self.locked(|t| t.add(key, value)).is_ok()
    }

    /// Insert or overwrite. Always succeeds.
    pub fn set(&self, key: K, value: V) {
        let _replaced = self.locked(|t| t.set(key, value));
    }

    /// A copy of the value stored under `q`.
    pub fn get<Q>(&self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.locked(|t| t.get(q).cloned())
    }

    /// Indexed read: like [`get`](Self::get), but a missing key is an error
    /// the caller has to propagate.
    pub fn fetch<Q>(&self, q: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + fmt::Debug,
        V: Clone,
    {
        self.get(q).ok_or_else(|| MapError::KeyNotFound {
            key: format!("{q:?}"),
        })
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locked(|t| t.contains_key(q))
    }

    pub fn remove<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locked(|t| t.remove(q)).is_some()
    }

    /// Remove the first entry, in iteration order, whose value equals `value`.
    pub fn remove_first_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.locked(|t| t.remove_first_value(value)).is_some()
    }

    /// Remove every entry whose value equals `value`; returns how many.
    pub fn remove_all_value(&self, value: &V) -> usize
    where
        V: PartialEq,
    {
        // Owned out here so removed pairs drop after unlock, even on unwind.
        let mut removed = Vec::new();
        self.locked(|t| t.remove_all_value(value, &mut removed))
    }

    /// Reverse lookup. Scans every entry; there is no value index.
    pub fn get_key_by_value(&self, value: &V) -> Option<K>
    where
        K: Clone,
        V: PartialEq,
    {
        self.locked(|t| t.key_by_value(value).cloned())
    }

    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.locked(|t| t.iter().map(|(k, _)| k.clone()).collect())
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.locked(|t| t.iter().map(|(_, v)| v.clone()).collect())
    }

    /// Drop every entry. The bucket count is kept.
    pub fn clear(&self) {
        let chains = self.locked(|t| t.take_chains());
        log::trace!("cleared map, releasing {} buckets", chains.len());
        drop(chains);
    }

    /// Copy every pair out under one lock acquisition.
    pub fn snapshot(&self) -> Snapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.locked(|t| {
            let mut entries = Vec::with_capacity(t.len());
            entries.extend(t.iter().map(|(k, v)| (k.clone(), v.clone())));
            Snapshot::new(entries)
        })
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshot().into_iter()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Uses `set` semantics: later pairs overwrite earlier ones.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let table = self.table.get_mut();
        for (k, v) in iter {
            table.set(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.snapshot();
        f.debug_map()
            .entries(snap.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn two_entries_enumerate_as_a_map() {
        let m = ChainedHashMap::new();
        assert!(m.add("one".to_string(), 1));
        assert!(m.add("two".to_string(), 2));
        assert_eq!(m.len(), 2);
        let as_map: HashMap<String, i32> = m.snapshot().into_iter().collect();
        let expected: HashMap<String, i32> =
            [("one".to_string(), 1), ("two".to_string(), 2)].into_iter().collect();
        assert_eq!(as_map, expected);
    }

    #[test]
    fn fetch_reports_missing_key() {
        let m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        m.set("a".to_string(), 10);
        assert_eq!(m.fetch("a"), Ok(10));
        assert_eq!(
            m.fetch("b"),
            Err(MapError::KeyNotFound {
                key: "\"b\"".to_string()
            })
        );
        assert_eq!(m.fetch("b").unwrap_err().to_string(), "key \"b\" not found");
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let m: ChainedHashMap<u32, u32> = (0..10).map(|i| (i, i)).collect();
        let snap = m.snapshot();
        m.clear();
        m.add(100, 100);
        assert_eq!(snap.len(), 10);
        // Restartable: iterate twice.
        assert_eq!(snap.iter().count(), 10);
        assert_eq!(snap.iter().map(|(_, v)| v).sum::<u32>(), 45);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn iterating_a_borrowed_map_yields_owned_pairs() {
        let m: ChainedHashMap<u32, String> = ChainedHashMap::new();
        m.add(1, "a".into());
        m.add(2, "b".into());
        let mut pairs: Vec<(u32, String)> = (&m).into_iter().collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, "a".to_string()), (2, "b".to_string())]);
    }

    #[test]
    fn extend_overwrites_existing_keys() {
        let mut m: ChainedHashMap<&'static str, i32> = ChainedHashMap::new();
        m.extend([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("a"), Some(3));
    }

    #[test]
    fn debug_renders_entries() {
        let m: ChainedHashMap<u32, u32> = ChainedHashMap::new();
        m.add(7, 8);
        assert_eq!(format!("{m:?}"), "{7: 8}");
    }

    #[test]
    fn value_drop_may_reenter_map_after_unlock() {
        // A value whose Drop reads the map it was removed from.
        struct Probe(Arc<ChainedHashMap<u32, Probe>>);
        impl Drop for Probe {
            fn drop(&mut self) {
                let _ = self.0.len();
            }
        }

        let m: Arc<ChainedHashMap<u32, Probe>> = Arc::new(ChainedHashMap::new());
        m.add(1, Probe(Arc::clone(&m)));
        m.add(2, Probe(Arc::clone(&m)));
        m.add(3, Probe(Arc::clone(&m)));
        m.set(3, Probe(Arc::clone(&m)));
        assert!(m.remove(&1));
        assert!(!m.add(2, Probe(Arc::clone(&m))));
        m.clear();
        assert!(m.is_empty());
    }
}
