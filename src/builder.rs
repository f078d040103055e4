//! Construction-time configuration for `ChainedHashMap`.

use crate::chained_hash_map::ChainedHashMap;
use crate::error::Result;
use crate::growth::{GrowthPolicy, DEFAULT_CAPACITY};
use crate::table::Table;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;

/// Builder for [`ChainedHashMap`]. Defaults: 19 buckets, grow past a 0.82
/// fill ratio, `RandomState` hashing.
///
/// The key and value types are carried so that the binding the map ends up
/// in decides them:
///
/// ```
/// use chained_hashmap::{ChainedHashMap, GrowthPolicy};
///
/// let m: ChainedHashMap<u32, &str> = ChainedHashMap::builder()
///     .capacity(7)
///     .growth(GrowthPolicy::Truncated(0.82))
///     .build()?;
/// assert_eq!(m.capacity(), 7);
/// # Ok::<(), chained_hashmap::MapError>(())
/// ```
pub struct MapBuilder<K, V, S = RandomState> {
    capacity: usize,
    growth: GrowthPolicy,
    hasher: S,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> MapBuilder<K, V, RandomState> {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            growth: GrowthPolicy::default(),
            hasher: RandomState::new(),
            _types: PhantomData,
        }
    }
}

impl<K, V> Default for MapBuilder<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: Clone> Clone for MapBuilder<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            growth: self.growth,
            hasher: self.hasher.clone(),
            _types: PhantomData,
        }
    }
}

impl<K, V, S> fmt::Debug for MapBuilder<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapBuilder")
            .field("capacity", &self.capacity)
            .field("growth", &self.growth)
            .finish_non_exhaustive()
    }
}

impl<K, V, S> MapBuilder<K, V, S> {
    /// Initial bucket count. Zero is raised to one.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    pub fn hasher<T: BuildHasher>(self, hasher: T) -> MapBuilder<K, V, T> {
        MapBuilder {
            capacity: self.capacity,
            growth: self.growth,
            hasher,
            _types: PhantomData,
        }
    }

    /// Fails with [`MapError::InvalidThreshold`](crate::MapError::InvalidThreshold)
    /// if the growth threshold is not a finite positive number.
    pub fn build(self) -> Result<ChainedHashMap<K, V, S>>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        let table = Table::try_with_config(self.capacity, self.growth, self.hasher)?;
        Ok(ChainedHashMap::from_table(table))
    }
}
