//! Payout destination script.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw output script designating the payout destination of a funded
/// proposal. Opaque to governance; interpreted by the transaction layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayoutScript(Vec<u8>);

impl PayoutScript {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for PayoutScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl From<Vec<u8>> for PayoutScript {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
