//! HashTable: separate-chaining table with entries held in a generational
//! arena and chains linked by arena key.

use crate::error::{Result, TableError};
use crate::ownership::{Displaced, Ownership};
use crate::strategy::KeyStrategy;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use log::{debug, error, trace, warn};
use slotmap::SlotMap;

pub const DEFAULT_CAPACITY: usize = 16;

// Rehash when count > capacity * 13 / 10.
pub const LOAD_FACTOR_NUM: usize = 13;
pub const LOAD_FACTOR_DEN: usize = 10;

slotmap::new_key_type! {
    struct EntryKey;
}

/// Stable reference to a live entry. Goes stale once the entry is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryHandle(EntryKey);

impl EntryHandle {
    pub fn key_ref<'a, K, V, S>(&self, table: &'a HashTable<K, V, S>) -> Option<&'a K> {
        table.entry(*self).map(|e| e.key())
    }

    pub fn value_ref<'a, K, V, S>(&self, table: &'a HashTable<K, V, S>) -> Option<&'a V> {
        table.entry(*self).map(|e| e.value())
    }
}

#[derive(Debug)]
struct Entry<K, V> {
    hash: u32,
    key: K,
    value: V,
    next: Option<EntryKey>,
    // None means this entry is its bucket's head.
    prev: Option<EntryKey>,
}

/// Borrowed view of one stored entry.
pub struct EntryRef<'a, K, V> {
    handle: EntryHandle,
    hash: u32,
    key: &'a K,
    value: &'a V,
}

impl<'a, K, V> EntryRef<'a, K, V> {
    pub fn handle(&self) -> EntryHandle {
        self.handle
    }

    /// Hash computed when the entry was inserted.
    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn key(&self) -> &'a K {
        self.key
    }

    pub fn value(&self) -> &'a V {
        self.value
    }
}

impl<K, V> Clone for EntryRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for EntryRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntryRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRef")
            .field("hash", &self.hash)
            .field("key", self.key)
            .field("value", self.value)
            .finish()
    }
}

/// Separate-chaining hashtable keyed through a [`KeyStrategy`].
///
/// No internal locking: mutation takes `&mut self`, so concurrent writers
/// must be serialized by the owner (e.g. behind a `Mutex`).
pub struct HashTable<K, V, S> {
    strategy: S,
    buckets: Vec<Option<EntryKey>>,
    entries: SlotMap<EntryKey, Entry<K, V>>,
    key_ownership: Ownership<K>,
    value_ownership: Ownership<V>,
}

fn alloc_buckets(n: usize) -> Result<Vec<Option<EntryKey>>> {
    let mut tab = Vec::new();
    if let Err(e) = tab.try_reserve_exact(n) {
        error!("bucket array allocation failed: buckets={} err={}", n, e);
        return Err(TableError::alloc(n));
    }
    tab.resize(n, None);
    Ok(tab)
}

impl<K, V, S> HashTable<K, V, S> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize % self.buckets.len()
    }

    fn view(&self, k: EntryKey) -> Option<EntryRef<'_, K, V>> {
        self.entries.get(k).map(|e| EntryRef {
            handle: EntryHandle(k),
            hash: e.hash,
            key: &e.key,
            value: &e.value,
        })
    }

    /// Resolve a handle; `None` once the entry has been removed.
    pub fn entry(&self, handle: EntryHandle) -> Option<EntryRef<'_, K, V>> {
        self.view(handle.0)
    }

    /// First entry in iteration order, or `None` for an empty table.
    pub fn begin(&self) -> Option<EntryHandle> {
        self.buckets.iter().find_map(|b| *b).map(EntryHandle)
    }

    /// Entry following `handle`: its chain successor, else the head of the
    /// next non-empty bucket.
    ///
    /// Any `put`, `remove` or `clean` between `begin` and the last `next`
    /// invalidates the traversal; the borrow checker rules this out for
    /// [`HashTable::iter`], handle-based walks must avoid it themselves.
    pub fn next(&self, handle: EntryHandle) -> Option<EntryHandle> {
        let e = self.entries.get(handle.0)?;
        if let Some(n) = e.next {
            return Some(EntryHandle(n));
        }
        let i = self.bucket_of(e.hash);
        self.buckets[i + 1..].iter().find_map(|b| *b).map(EntryHandle)
    }

    /// Entries in bucket order, newest first within a bucket.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            table: self,
            cur: self.begin(),
            remaining: self.len(),
        }
    }

    fn unlink(&mut self, k: EntryKey) {
        let (prev, next, hash) = {
            let e = &self.entries[k];
            (e.prev, e.next, e.hash)
        };
        if let Some(n) = next {
            self.entries[n].prev = prev;
        }
        match prev {
            Some(p) => self.entries[p].next = next,
            None => {
                let i = self.bucket_of(hash);
                self.buckets[i] = next;
            }
        }
    }

    fn take(&mut self, k: EntryKey) -> Option<Displaced<K, V>> {
        if !self.entries.contains_key(k) {
            return None;
        }
        // Unlink before running destructors so the chains are consistent
        // if a destructor panics.
        self.unlink(k);
        let e = self.entries.remove(k)?;
        Some(Displaced {
            key: self.key_ownership.release(e.key),
            value: self.value_ownership.release(e.value),
        })
    }

    /// Remove the entry behind `handle`. Stale handles return `None`.
    pub fn remove_handle(&mut self, handle: EntryHandle) -> Option<Displaced<K, V>> {
        self.take(handle.0)
    }

    /// Drop every entry, running destructors where configured. Capacity is
    /// kept and the table stays usable.
    pub fn clean(&mut self) {
        for i in 0..self.buckets.len() {
            while let Some(k) = self.buckets[i] {
                let Some(e) = self.entries.remove(k) else {
                    self.buckets[i] = None;
                    break;
                };
                self.buckets[i] = e.next;
                if let Some(n) = e.next {
                    self.entries[n].prev = None;
                }
                // Borrowed items come back and are dropped here.
                let _ = self.key_ownership.release(e.key);
                let _ = self.value_ownership.release(e.value);
            }
        }
        debug_assert!(self.entries.is_empty());
    }

    /// Tear the table down, running destructors on every stored key and
    /// value. Equivalent to dropping it.
    pub fn destroy(self) {
        drop(self)
    }

    fn over_loaded(&self) -> bool {
        self.len().saturating_mul(LOAD_FACTOR_DEN)
            > self.buckets.len().saturating_mul(LOAD_FACTOR_NUM)
    }

    // Double the bucket array and relink every entry by its cached hash.
    // Leaves the table untouched if the new array cannot be allocated.
    fn rehash(&mut self) -> Result<()> {
        let old = self.buckets.len();
        let Some(new) = old.checked_mul(2) else {
            error!("rehash failed: capacity {} cannot double", old);
            return Err(TableError::alloc(usize::MAX));
        };
        let mut tab = alloc_buckets(new)?;
        for i in 0..old {
            let mut cur = self.buckets[i];
            while let Some(k) = cur {
                let e = &mut self.entries[k];
                cur = e.next;
                let j = e.hash as usize % new;
                e.prev = None;
                e.next = tab[j];
                if let Some(h) = tab[j] {
                    self.entries[h].prev = Some(k);
                }
                tab[j] = Some(k);
            }
        }
        self.buckets = tab;
        debug!("rehashed: capacity {} -> {}, entries={}", old, new, self.len());
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut seen = 0usize;
        for (i, head) in self.buckets.iter().enumerate() {
            let mut prev = None;
            let mut cur = *head;
            while let Some(k) = cur {
                let e = self.entries.get(k).expect("chain points at a live entry");
                assert_eq!(e.hash as usize % self.buckets.len(), i, "entry in wrong bucket");
                assert_eq!(e.prev, prev, "prev link mismatch");
                seen += 1;
                prev = Some(k);
                cur = e.next;
            }
        }
        assert_eq!(seen, self.entries.len(), "count differs from reachable entries");
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    S: KeyStrategy<K>,
{
    /// Create an empty table with `capacity` buckets.
    ///
    /// Fails with `InvalidArgument` when `capacity` is zero and with
    /// `AllocationFailure` when the bucket array cannot be allocated.
    pub fn with_ownership(
        capacity: usize,
        strategy: S,
        key_ownership: Ownership<K>,
        value_ownership: Ownership<V>,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(TableError::invalid("initial capacity must be positive"));
        }
        let buckets = alloc_buckets(capacity)?;
        Ok(Self {
            strategy,
            buckets,
            entries: SlotMap::with_key(),
            key_ownership,
            value_ownership,
        })
    }

    /// Create an empty table that never disposes of keys or values itself.
    pub fn new(capacity: usize, strategy: S) -> Result<Self> {
        Self::with_ownership(capacity, strategy, Ownership::Borrowed, Ownership::Borrowed)
    }

    fn find_hashed(&self, hash: u32, key: &K) -> Option<EntryKey> {
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(k) = cur {
            let e = &self.entries[k];
            if self.strategy.equal(key, &e.key) {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    fn find(&self, key: &K) -> Option<EntryKey> {
        self.find_hashed(self.strategy.hash(key), key)
    }

    pub fn get_entry(&self, key: &K) -> Option<EntryRef<'_, K, V>> {
        self.find(key).and_then(|k| self.view(k))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|k| &self.entries[k].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let k = self.find(key)?;
        Some(&mut self.entries[k].value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Insert `key`/`value`, or overwrite the entry whose key is equal.
    ///
    /// On overwrite both the stored key and value are replaced, even though
    /// the keys compared equal; the old key goes through the key policy
    /// first, then the old value. Nothing is displaced on a fresh insert.
    ///
    /// A fresh insert may first grow the table. If that allocation fails the
    /// table is unchanged and `key`/`value` are dropped without running any
    /// destructor.
    pub fn put(&mut self, key: K, value: V) -> Result<Displaced<K, V>> {
        let hash = self.strategy.hash(&key);
        if let Some(k) = self.find_hashed(hash, &key) {
            let e = &mut self.entries[k];
            let old_key = mem::replace(&mut e.key, key);
            let old_value = mem::replace(&mut e.value, value);
            return Ok(Displaced {
                key: self.key_ownership.release(old_key),
                value: self.value_ownership.release(old_value),
            });
        }

        if self.over_loaded() {
            self.rehash()?;
        }

        let i = self.bucket_of(hash);
        let head = self.buckets[i];
        let k = self.entries.insert(Entry {
            hash,
            key,
            value,
            next: head,
            prev: None,
        });
        if let Some(h) = head {
            self.entries[h].prev = Some(k);
        }
        self.buckets[i] = Some(k);
        Ok(Displaced::none())
    }

    /// Remove the entry for `key`. A missing key is logged and leaves the
    /// table unchanged.
    pub fn remove(&mut self, key: &K) -> Option<Displaced<K, V>> {
        let Some(k) = self.find(key) else {
            warn!("remove: key not found (hash={})", self.strategy.hash(key));
            return None;
        };
        self.take(k)
    }
}

impl<K, V, S> Drop for HashTable<K, V, S> {
    fn drop(&mut self) {
        if self.key_ownership.is_owned() || self.value_ownership.is_owned() {
            trace!("dropping table: releasing {} owned entries", self.len());
            self.clean();
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|e| (e.key(), e.value())))
            .finish()
    }
}

pub struct Iter<'a, K, V, S> {
    table: &'a HashTable<K, V, S>,
    cur: Option<EntryHandle>,
    remaining: usize,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = EntryRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.cur?;
        let item = self.table.entry(h)?;
        self.cur = self.table.next(h);
        self.remaining = self.remaining.saturating_sub(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S> {}
impl<K, V, S> FusedIterator for Iter<'_, K, V, S> {}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type Item = EntryRef<'a, K, V>;
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
