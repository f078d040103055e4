//! chained-hashmap: a thread-safe, separate-chaining hash map guarded by
//! a single lock.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a map whose every operation is trivially linearizable, built
//!   from owned linked chains with explicit growth.
//! - Layers:
//!   - Chain<K, V>: a singly linked list of boxed entries. The bucket slot
//!     owns the head, each entry owns its successor. Insertion prepends.
//!   - Table<K, V, S>: the bucket array, entry count and growth policy.
//!     Unsynchronized; routes keys to buckets and rehashes.
//!   - ChainedHashMap<K, V, S>: public API. Wraps the table in one
//!     `parking_lot::Mutex` and copies keys/values out.
//!
//! Constraints
//! - Thread-safe: `Send + Sync` whenever `K`, `V` and `S` are `Send`.
//! - One coarse lock: lookups serialize against each other and against
//!   writers. No per-bucket locking.
//! - Unique keys. `add` on a present key returns `false`; `set` overwrites.
//! - No reference into the table escapes the lock. Reads clone, and
//!   enumeration returns a `Snapshot` copied under the lock.
//!
//! Bucket routing
//! - `index = hash % capacity` on the `u64` hash. The hash is never
//!   reinterpreted as signed, so there is no absolute-value step and no
//!   overflowing boundary value.
//! - Each entry stores its hash; rehash relinks nodes by stored hash and
//!   never calls `K: Hash` again.
//!
//! Growth
//! - After every insertion of a new key, `GrowthPolicy` compares the fill
//!   ratio against its threshold (0.82 by default) and, if exceeded, the
//!   table doubles and relinks every entry in one pass with the lock held.
//! - `GrowthPolicy::LoadFactor` uses the true fractional ratio.
//!   `GrowthPolicy::Truncated` uses integer division, which for thresholds
//!   below 1.0 only grows once the entry count reaches the bucket count.
//! - Removal and `clear` never shrink.
//!
//! Absence
//! - Every lookup and removal reports absence as `bool`/`Option`. The one
//!   exception is `fetch` (indexed read), which returns
//!   `Err(MapError::KeyNotFound)`.
//!
//! Drop ordering
//! - Removed keys and values are unlinked under the lock and dropped after
//!   it is released, so user `Drop` code may call back into the map.
//! - In debug builds, calling back into a map from user `Hash`/`Eq`/
//!   `Clone` code while that map is locked panics instead of deadlocking.

mod builder;
mod chain;
mod chained_hash_map;
mod error;
mod growth;
mod reentrancy;
mod snapshot;
#[cfg(feature = "bench_internal")]
pub mod table;
#[cfg(not(feature = "bench_internal"))]
mod table;
mod table_proptest;

// Public surface
pub use builder::MapBuilder;
pub use chained_hash_map::ChainedHashMap;
pub use error::{MapError, Result};
pub use growth::{GrowthPolicy, DEFAULT_CAPACITY, DEFAULT_THRESHOLD};
pub use snapshot::Snapshot;
