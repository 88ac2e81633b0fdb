//! Key strategies: the hash and equality functions a table is built with.
//!
//! A strategy is fixed for the lifetime of a table. The table calls `hash`
//! once per inserted key and caches the result; `equal` is called while
//! scanning a bucket chain.

use core::hash::{BuildHasher, Hash, Hasher};
use std::collections::hash_map::RandomState;
use std::thread::ThreadId;

pub trait KeyStrategy<K: ?Sized> {
    fn hash(&self, key: &K) -> u32;
    fn equal(&self, a: &K, b: &K) -> bool;
}

/// String keys compared by content.
///
/// Hash is the polynomial accumulator `h = h * 129 + byte` over the key's
/// bytes, wrapping at 32 bits.
#[derive(Copy, Clone, Debug, Default)]
pub struct StrKeys;

impl StrKeys {
    pub fn hash_bytes(bytes: &[u8]) -> u32 {
        bytes
            .iter()
            .fold(0u32, |h, &b| h.wrapping_mul(129).wrapping_add(b as u32))
    }
}

impl<K> KeyStrategy<K> for StrKeys
where
    K: ?Sized + AsRef<[u8]>,
{
    fn hash(&self, key: &K) -> u32 {
        Self::hash_bytes(key.as_ref())
    }

    fn equal(&self, a: &K, b: &K) -> bool {
        a.as_ref() == b.as_ref()
    }
}

/// Thread identifier keys.
///
/// Hash is the identifier's integer representation. Equality always goes
/// through `ThreadId`'s own comparison, never through the hash.
#[derive(Copy, Clone, Debug, Default)]
pub struct ThreadIdKeys;

// Captures the integer a `ThreadId` feeds to its hasher.
#[derive(Default)]
struct IdCapture(u64);

impl Hasher for IdCapture {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 << 8) | b as u64;
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

impl ThreadIdKeys {
    pub fn id_value(id: &ThreadId) -> u64 {
        let mut cap = IdCapture::default();
        id.hash(&mut cap);
        cap.finish()
    }
}

impl KeyStrategy<ThreadId> for ThreadIdKeys {
    fn hash(&self, key: &ThreadId) -> u32 {
        Self::id_value(key) as u32
    }

    fn equal(&self, a: &ThreadId, b: &ThreadId) -> bool {
        a == b
    }
}

/// Strategy assembled from a pair of caller-supplied functions.
#[derive(Copy, Clone)]
pub struct FnKeys<H, E> {
    hash: H,
    equal: E,
}

impl<H, E> FnKeys<H, E> {
    pub fn new(hash: H, equal: E) -> Self {
        FnKeys { hash, equal }
    }
}

impl<K, H, E> KeyStrategy<K> for FnKeys<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u32,
    E: Fn(&K, &K) -> bool,
{
    fn hash(&self, key: &K) -> u32 {
        (self.hash)(key)
    }

    fn equal(&self, a: &K, b: &K) -> bool {
        (self.equal)(a, b)
    }
}

/// Strategy for any `K: Hash + Eq`, backed by a std `BuildHasher` and
/// truncated to 32 bits.
#[derive(Clone, Debug, Default)]
pub struct StdKeys<S = RandomState> {
    hasher: S,
}

impl<S: BuildHasher> StdKeys<S> {
    pub fn with_hasher(hasher: S) -> Self {
        StdKeys { hasher }
    }
}

impl<K, S> KeyStrategy<K> for StdKeys<S>
where
    K: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    fn hash(&self, key: &K) -> u32 {
        let mut h = self.hasher.build_hasher();
        key.hash(&mut h);
        h.finish() as u32
    }

    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_hash_is_polynomial_129() {
        assert_eq!(StrKeys::hash_bytes(b""), 0);
        assert_eq!(StrKeys::hash_bytes(b"a"), 97);
        assert_eq!(StrKeys::hash_bytes(b"ab"), 97 * 129 + 98);
        assert_eq!(StrKeys::hash_bytes(b"abc"), (97 * 129 + 98) * 129 + 99);
    }

    #[test]
    fn str_hash_wraps() {
        let long = "z".repeat(64);
        // Must not panic on overflow in debug builds.
        let _ = <StrKeys as KeyStrategy<str>>::hash(&StrKeys, &long);
    }

    #[test]
    fn str_equality_is_by_content() {
        let a = String::from("key");
        let b = String::from("key");
        assert!(!core::ptr::eq(a.as_ptr(), b.as_ptr()));
        assert!(StrKeys.equal(&a, &b));
        assert!(!StrKeys.equal(&a, &String::from("kez")));
    }

    #[test]
    fn thread_id_hash_distinguishes_threads() {
        let here = std::thread::current().id();
        let there = std::thread::spawn(|| std::thread::current().id())
            .join()
            .unwrap();
        assert!(ThreadIdKeys.equal(&here, &here));
        assert!(!ThreadIdKeys.equal(&here, &there));
        assert_ne!(ThreadIdKeys::id_value(&here), ThreadIdKeys::id_value(&there));
        assert_eq!(ThreadIdKeys.hash(&here), ThreadIdKeys.hash(&here));
    }

    #[test]
    fn fn_keys_delegate() {
        let s = FnKeys::new(|k: &u32| *k, |a: &u32, b: &u32| a == b);
        assert_eq!(s.hash(&7u32), 7);
        assert!(s.equal(&3u32, &3u32));
        assert!(!s.equal(&3u32, &4u32));
    }

    #[test]
    fn std_keys_are_consistent_with_eq() {
        let s: StdKeys = StdKeys::default();
        assert_eq!(s.hash(&"x".to_string()), s.hash(&"x".to_string()));
        assert!(s.equal(&1u64, &1u64));
    }
}
