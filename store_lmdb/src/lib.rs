//! LMDB storage backend for the Tally protocol.
//!
//! Implements the `tally-store` [`OrderedKv`](tally_store::OrderedKv) trait
//! with the `heed` LMDB bindings: one byte-ordered database inside a single
//! environment, so composite-key range scans behave exactly as they do on
//! the in-memory backend.

pub mod error;
pub mod kv;

pub use error::LmdbError;
pub use kv::LmdbKv;
