//! LMDB implementation of [`OrderedKv`].
//!
//! A single `Database<Bytes, Bytes>` holds every logical table; callers
//! separate tables with key prefixes. LMDB already stores keys in byte
//! order, so range scans need no extra comparator.

use std::ops::Bound;
use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use tally_store::kv::{KvIter, OrderedKv};
use tally_store::StoreError;

use crate::LmdbError;

const KV_DB_NAME: &str = "kv";

pub struct LmdbKv {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl LmdbKv {
    /// Open or create the environment at `path` with the given map size.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        let env = unsafe { EnvOpenOptions::new().map_size(map_size).max_dbs(1).open(path)? };
        let mut wtxn = env.write_txn()?;
        let db = env.create_database(&mut wtxn, Some(KV_DB_NAME))?;
        wtxn.commit()?;
        tracing::debug!(path = %path.display(), "opened LMDB environment");
        Ok(Self { env, db })
    }

    /// Materialize a range under one read transaction. LMDB iterators
    /// borrow their transaction, so entries are collected before the
    /// transaction ends; ranges here are always prefix-bounded and small.
    fn collect_range(
        &self,
        lower: &[u8],
        upper: Option<&[u8]>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let upper_bound = match upper {
            Some(u) => Bound::Excluded(u),
            None => Bound::Unbounded,
        };
        let bounds = (Bound::Included(lower), upper_bound);
        let iter = self.db.range(&rtxn, &bounds).map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(LmdbError::from)?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }
}

impl OrderedKv for LmdbKv {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self.db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.put(&mut wtxn, key, value).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn range(&self, lower: &[u8], upper: Option<&[u8]>) -> KvIter<'_> {
        match self.collect_range(lower, upper) {
            Ok(entries) => Box::new(entries.into_iter().map(Ok)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}
