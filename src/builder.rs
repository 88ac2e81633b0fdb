//! Construction-time configuration for [`HashTable`].

use crate::error::Result;
use crate::hash_table::{HashTable, DEFAULT_CAPACITY};
use crate::ownership::Ownership;
use crate::strategy::KeyStrategy;

/// Collects capacity and ownership policy, then builds a table for a
/// given key strategy.
///
/// ```
/// use chained_hashtable::{Builder, StrKeys};
///
/// let mut t = Builder::<String, u32>::new()
///     .capacity(4)
///     .value_destructor(|v| drop(v))
///     .build(StrKeys)
///     .unwrap();
/// let _ = t.put("a".to_string(), 1).unwrap();
/// assert_eq!(t.get(&"a".to_string()), Some(&1));
/// ```
#[derive(Debug)]
pub struct Builder<K, V> {
    capacity: usize,
    key_ownership: Ownership<K>,
    value_ownership: Ownership<V>,
}

impl<K, V> Builder<K, V> {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            key_ownership: Ownership::Borrowed,
            value_ownership: Ownership::Borrowed,
        }
    }

    /// Initial number of buckets. Zero is rejected by `build`.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn key_ownership(mut self, ownership: Ownership<K>) -> Self {
        self.key_ownership = ownership;
        self
    }

    pub fn value_ownership(mut self, ownership: Ownership<V>) -> Self {
        self.value_ownership = ownership;
        self
    }

    pub fn key_destructor<F>(self, f: F) -> Self
    where
        F: FnMut(K) + Send + Sync + 'static,
    {
        self.key_ownership(Ownership::owned(f))
    }

    pub fn value_destructor<F>(self, f: F) -> Self
    where
        F: FnMut(V) + Send + Sync + 'static,
    {
        self.value_ownership(Ownership::owned(f))
    }

    pub fn build<S>(self, strategy: S) -> Result<HashTable<K, V, S>>
    where
        S: KeyStrategy<K>,
    {
        HashTable::with_ownership(
            self.capacity,
            strategy,
            self.key_ownership,
            self.value_ownership,
        )
    }
}

impl<K, V> Default for Builder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::strategy::StrKeys;

    #[test]
    fn defaults_to_borrowed_with_default_capacity() {
        let t = Builder::<String, i32>::new().build(StrKeys).unwrap();
        assert_eq!(t.capacity(), DEFAULT_CAPACITY);
        assert!(t.is_empty());
    }

    #[test]
    fn zero_capacity_fails_to_build() {
        let r = Builder::<String, i32>::new().capacity(0).build(StrKeys);
        assert!(matches!(r, Err(TableError::InvalidArgument { .. })));
    }
}
