//! Ownership policy for keys and values stored in a table.
//!
//! The table always owns its entry records. Whether it also takes
//! responsibility for disposing of keys and values is chosen per slot at
//! construction:
//!
//! - `Owned(destructor)`: every key/value leaving the table (overwritten by
//!   `put`, unlinked by `remove`, torn down by `clean` or drop) is passed to
//!   the destructor exactly once.
//! - `Borrowed`: the table never disposes of anything itself. Items displaced
//!   by `put`/`remove` are handed back in a [`Displaced`] record; items still
//!   stored at `clean`/drop are released with an ordinary drop.

use core::fmt;

/// Callback that consumes a key or value leaving the table.
///
/// `Send + Sync` so a table can be moved across threads or shared for
/// read-only lookups; mutation still needs `&mut`.
pub type Destructor<T> = Box<dyn FnMut(T) + Send + Sync>;

pub enum Ownership<T> {
    Borrowed,
    Owned(Destructor<T>),
}

impl<T> Ownership<T> {
    pub fn owned<F>(f: F) -> Self
    where
        F: FnMut(T) + Send + Sync + 'static,
    {
        Ownership::Owned(Box::new(f))
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Ownership::Owned(_))
    }

    /// Dispose of `item` under this policy. Returns the item when the caller
    /// keeps ownership.
    pub(crate) fn release(&mut self, item: T) -> Option<T> {
        match self {
            Ownership::Borrowed => Some(item),
            Ownership::Owned(destroy) => {
                destroy(item);
                None
            }
        }
    }
}

impl<T> Default for Ownership<T> {
    fn default() -> Self {
        Ownership::Borrowed
    }
}

impl<T> fmt::Debug for Ownership<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::Borrowed => f.write_str("Borrowed"),
            Ownership::Owned(_) => f.write_str("Owned(..)"),
        }
    }
}

/// Keys and values pushed out of the table by `put` or `remove`.
///
/// A slot is `Some` only when that slot is `Borrowed`; owned items have
/// already gone to their destructor.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Displaced<K, V> {
    pub key: Option<K>,
    pub value: Option<V>,
}

impl<K, V> Displaced<K, V> {
    pub(crate) fn none() -> Self {
        Displaced { key: None, value: None }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }

    pub fn into_parts(self) -> (Option<K>, Option<V>) {
        (self.key, self.value)
    }
}
