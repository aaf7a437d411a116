//! In-memory backend, used in tests and as the root layer under overlays.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::kv::{KvIter, OrderedKv};
use crate::StoreError;

/// BTreeMap-backed [`OrderedKv`].
#[derive(Clone, Debug, Default)]
pub struct MemoryKv {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OrderedKv for MemoryKv {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn range(&self, lower: &[u8], upper: Option<&[u8]>) -> KvIter<'_> {
        let upper_bound = match upper {
            Some(u) => Bound::Excluded(u),
            None => Bound::Unbounded,
        };
        let iter = self
            .entries
            .range::<[u8], _>((Bound::Included(lower), upper_bound))
            .map(|(k, v)| Ok((k.clone(), v.clone())));
        Box::new(iter)
    }
}
