//! Table: the unsynchronized bucket store behind `ChainedHashMap`.
//!
//! Owns the bucket array, the live entry count and the growth policy.
//! Every method assumes exclusive access; the public map provides it by
//! wrapping the table in a single lock. Removal paths return the removed
//! keys and values so the caller decides where they are dropped.

use crate::chain::{Chain, ChainIter, Entry};
use crate::error::Result;
use crate::growth::{next_capacity, GrowthPolicy, DEFAULT_CAPACITY};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Route a hash to a bucket.
///
/// Hashes are treated as unsigned, so the value whose signed reading is
/// the most negative (`1 << 63`) is an ordinary input here: no absolute
/// value is taken and nothing can overflow. `capacity` must be non-zero.
#[inline]
pub fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (hash % capacity as u64) as usize
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Chain<K, V>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, Chain::new);
    buckets
}

pub struct Table<K, V, S = RandomState> {
    buckets: Vec<Chain<K, V>>,
    len: usize,
    growth: GrowthPolicy,
    hasher: S,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CAPACITY, GrowthPolicy::default(), RandomState::new())
    }
}

impl<K, V> Default for Table<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Validates `growth` first; a zero `capacity` is raised to one bucket.
    pub fn try_with_config(capacity: usize, growth: GrowthPolicy, hasher: S) -> Result<Self> {
        Ok(Self::with_config(capacity, growth.validate()?, hasher))
    }

    /// Unchecked: `growth` must already be valid.
    pub(crate) fn with_config(capacity: usize, growth: GrowthPolicy, hasher: S) -> Self {
        debug_assert!(growth.validate().is_ok());
        Self {
            buckets: empty_buckets(capacity.max(1)),
            len: 0,
            growth,
            hasher,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    fn find_entry<Q>(&self, q: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.buckets[bucket_index(hash, self.capacity())]
            .find(|e| e.hash == hash && e.key.borrow() == q)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_entry(q).map(|e| &e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_entry(q).is_some()
    }

    /// Insert only if `key` is absent. On duplicate, the table is untouched
    /// and the rejected pair is handed back.
    pub fn add(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        let hash = self.make_hash(&key);
        let idx = bucket_index(hash, self.capacity());
        if self.buckets[idx]
            .find(|e| e.hash == hash && e.key == key)
            .is_some()
        {
            return Err((key, value));
        }
        self.insert_new(idx, Entry::boxed(key, value, hash));
        Ok(())
    }

    /// Insert or overwrite. An existing entry keeps its key and chain
    /// position; the replaced value is returned.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        let idx = bucket_index(hash, self.capacity());
        if let Some(e) = self.buckets[idx].find_mut(|e| e.hash == hash && e.key == key) {
            return Some(core::mem::replace(&mut e.value, value));
        }
        self.insert_new(idx, Entry::boxed(key, value, hash));
        None
    }

    fn insert_new(&mut self, idx: usize, node: Box<Entry<K, V>>) {
        self.buckets[idx].push_front(node);
        self.len += 1;
        if self.growth.should_grow(self.len, self.capacity()) {
            self.rehash(next_capacity(self.capacity()));
        }
    }

    /// Move every entry into a fresh bucket store of `new_capacity`.
    /// Nodes are relinked, never reallocated.
    fn rehash(&mut self, new_capacity: usize) {
        let old_capacity = self.capacity();
        let old = core::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        for mut chain in old {
            while let Some(node) = chain.pop_front() {
                let idx = bucket_index(node.hash, new_capacity);
                self.buckets[idx].push_front(node);
            }
        }
        log::debug!(
            "rehashed {} entries: {} -> {} buckets",
            self.len,
            old_capacity,
            new_capacity
        );
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let idx = bucket_index(hash, self.capacity());
        let node = self.buckets[idx].unlink_first(|e| e.hash == hash && e.key.borrow() == q)?;
        self.len -= 1;
        Some(node.into_pair())
    }

    /// Unlink the first entry holding `value`, scanning buckets in order and
    /// each chain head to tail.
    pub fn remove_first_value(&mut self, value: &V) -> Option<(K, V)>
    where
        V: PartialEq,
    {
        for chain in self.buckets.iter_mut() {
            if let Some(node) = chain.unlink_first(|e| e.value == *value) {
                self.len -= 1;
                return Some(node.into_pair());
            }
        }
        None
    }

    /// Unlink every entry holding `value` in a single pass, appending the
    /// removed pairs to `out`. Returns how many were removed.
    pub fn remove_all_value(&mut self, value: &V, out: &mut Vec<(K, V)>) -> usize
    where
        V: PartialEq,
    {
        let before = out.len();
        for chain in self.buckets.iter_mut() {
            chain.unlink_all(|e| e.value == *value, out, &mut self.len);
        }
        let removed = out.len() - before;
        if removed > 0 {
            log::trace!("removed {} entries by value", removed);
        }
        removed
    }

    /// First key, in iteration order, whose value equals `value`.
    pub fn key_by_value(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.iter().find(|&(_, v)| v == value).map(|(k, _)| k)
    }

    /// Detach every chain, leaving empty buckets at the same capacity.
    pub(crate) fn take_chains(&mut self) -> Vec<Chain<K, V>> {
        let capacity = self.capacity();
        self.len = 0;
        core::mem::replace(&mut self.buckets, empty_buckets(capacity))
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub fn clear(&mut self) {
        drop(self.take_chains());
    }

    /// Entries in bucket order, then chain order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
        }
    }
}

/// Iterator over `(&K, &V)` in bucket order, then chain order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Chain<K, V>>,
    chain: Option<ChainIter<'a, K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.as_mut().and_then(Iterator::next) {
                return Some((&e.key, &e.value));
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }
}
