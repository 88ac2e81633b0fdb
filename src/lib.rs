//! chained-hashtable: a separate-chaining hashtable whose key semantics and
//! key/value disposal are supplied by the caller.
//!
//! Internal Design:
//!
//! Summary
//! - `HashTable<K, V, S>` keeps an array of bucket heads. Each bucket heads
//!   a doubly linked chain of entries whose cached hash reduces to that
//!   bucket's index.
//! - Entries live in a `SlotMap` arena; chain links and bucket heads are
//!   generational arena keys rather than pointers, so unlinking is O(1)
//!   and a removed entry's `EntryHandle` can never resolve again.
//! - `S: KeyStrategy<K>` supplies `hash` and `equal`. Ready-made strategies
//!   cover byte-string keys (`StrKeys`), thread identifiers
//!   (`ThreadIdKeys`), closure pairs (`FnKeys`) and std `Hash + Eq` keys
//!   (`StdKeys`).
//!
//! Ownership
//! - The table always owns its entry records.
//! - Keys and values follow an `Ownership` policy chosen at construction:
//!   `Owned(destructor)` runs the destructor on every key/value that leaves
//!   the table; `Borrowed` hands displaced items back to the caller in a
//!   `Displaced` record.
//!
//! Hashing and growth
//! - A key is hashed once, on insertion. Rehashing relinks entries by their
//!   cached hash and never calls back into the strategy.
//! - Before a fresh insert, if `len > capacity * 1.3` the bucket array
//!   doubles. Capacity never shrinks.
//! - Bucket arrays are allocated fallibly; a failed growth leaves the table
//!   exactly as it was and `put` reports `AllocationFailure`.
//!
//! Iteration
//! - `begin`/`next` walk buckets in index order and each chain newest
//!   first. `iter()` wraps the same walk as a Rust iterator.
//! - Mutating the table during a handle-based walk invalidates it.
//!
//! Notes and non-goals
//! - No internal locking. Mutation takes `&mut self`; shared `&self`
//!   lookups from several threads are fine when `K`, `V` and `S` are `Sync`.
//! - No ordered iteration, no in-place key mutation, no shrinking.

pub mod builder;
pub mod error;
pub mod hash_table;
mod hash_table_proptest;
pub mod ownership;
pub mod strategy;

// Public surface
pub use builder::Builder;
pub use error::{Result, TableError};
pub use hash_table::{EntryHandle, EntryRef, HashTable, Iter};
pub use ownership::{Destructor, Displaced, Ownership};
pub use strategy::{FnKeys, KeyStrategy, StdKeys, StrKeys, ThreadIdKeys};
