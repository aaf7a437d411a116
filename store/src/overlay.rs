//! Layered write overlay.
//!
//! An [`Overlay`] buffers puts and deletes on top of any [`OrderedKv`]
//! without touching it. `commit` flushes the buffered writes into the base
//! in key order; `discard` drops them and hands the base back untouched.
//! Overlays nest, giving the block connect/disconnect logic its
//! speculative-apply-then-flush-or-rollback semantics.

use std::collections::{btree_map, BTreeMap};
use std::iter::Peekable;
use std::ops::Bound;

use crate::kv::{KvIter, OrderedKv};
use crate::StoreError;

/// Speculative writes layered over a base store. Deletes are kept as
/// tombstones so they shadow base entries until commit or discard.
#[derive(Debug)]
pub struct Overlay<S> {
    base: S,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<S: OrderedKv> Overlay<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Number of buffered writes (puts and tombstones).
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Flush all buffered writes into the base store and return it.
    pub fn commit(self) -> Result<S, StoreError> {
        let Overlay { mut base, writes } = self;
        for (key, value) in writes {
            match value {
                Some(value) => base.put(&key, &value)?,
                None => base.delete(&key)?,
            }
        }
        Ok(base)
    }

    /// Drop all buffered writes and return the base store untouched.
    pub fn discard(self) -> S {
        self.base
    }
}

impl<S: OrderedKv> OrderedKv for Overlay<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(Some(value)) => Ok(Some(value.clone())),
            Some(None) => Ok(None),
            None => self.base.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn range(&self, lower: &[u8], upper: Option<&[u8]>) -> KvIter<'_> {
        let upper_bound = match upper {
            Some(u) => Bound::Excluded(u),
            None => Bound::Unbounded,
        };
        let over = self
            .writes
            .range::<[u8], _>((Bound::Included(lower), upper_bound))
            .peekable();
        let base = self.base.range(lower, upper).peekable();
        Box::new(MergedRange { base, over })
    }
}

/// Two-cursor merge of the base range and the overlay's buffered writes.
/// Overlay entries win on equal keys; tombstones suppress base entries.
struct MergedRange<'a> {
    base: Peekable<KvIter<'a>>,
    over: Peekable<btree_map::Range<'a, Vec<u8>, Option<Vec<u8>>>>,
}

impl Iterator for MergedRange<'_> {
    type Item = Result<(Vec<u8>, Vec<u8>), StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        use std::cmp::Ordering;
        loop {
            let ord = match (self.base.peek(), self.over.peek()) {
                (None, None) => return None,
                // Backend errors surface immediately, in stream order.
                (Some(Err(_)), _) => Ordering::Less,
                (Some(Ok(_)), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(Ok((base_key, _))), Some((over_key, _))) => {
                    base_key.as_slice().cmp(over_key.as_slice())
                }
            };
            if ord == Ordering::Less {
                return self.base.next();
            }
            if ord == Ordering::Equal {
                // Base entry is shadowed by the overlay write.
                self.base.next();
            }
            if let Some((key, value)) = self.over.next() {
                match value {
                    Some(value) => return Some(Ok((key.clone(), value.clone()))),
                    None => continue,
                }
            }
        }
    }
}
