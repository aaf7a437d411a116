//! The ordered key-value trait every backend implements.

use crate::StoreError;

/// Boxed lazy iterator over `(key, value)` pairs in ascending byte order.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreError>> + 'a>;

/// A byte-ordered key-value store with range iteration.
///
/// Keys and values are opaque byte strings. Iteration order is the
/// lexicographic order of keys, which callers exploit by building composite
/// keys whose byte order equals the intended logical order.
pub trait OrderedKv {
    /// Point lookup. `Ok(None)` if the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or overwrite.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Iterate entries with `lower <= key` and (when `upper` is given)
    /// `key < upper`, in ascending byte order.
    fn range(&self, lower: &[u8], upper: Option<&[u8]>) -> KvIter<'_>;
}

impl<T: OrderedKv + ?Sized> OrderedKv for &mut T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn range(&self, lower: &[u8], upper: Option<&[u8]>) -> KvIter<'_> {
        (**self).range(lower, upper)
    }
}

/// Compute the tightest upper bound for a prefix scan: the prefix with its
/// last non-0xFF byte incremented. Returns `None` when no finite upper
/// bound exists (all bytes 0xFF), in which case the scan is open-ended.
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return Some(upper);
        }
        upper.pop();
    }
    None
}
