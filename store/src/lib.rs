//! Ordered key-value storage abstraction for the Tally protocol.
//!
//! Every storage backend (LMDB, in-memory for testing) implements the
//! [`OrderedKv`] trait. The rest of the codebase depends only on the trait.
//!
//! [`Overlay`] layers speculative writes over any backend and either
//! flushes them with `commit` or throws them away with `discard`. Block
//! connect/disconnect uses this to keep chain reorganizations consistent.

pub mod error;
pub mod kv;
pub mod memory;
pub mod overlay;

pub use error::StoreError;
pub use kv::{KvIter, OrderedKv};
pub use memory::MemoryKv;
pub use overlay::Overlay;
