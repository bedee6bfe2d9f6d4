use serde::{Deserialize, Serialize};

/// A built and signed transaction, ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    /// Hex-encoded transaction hash, the key used to await inclusion.
    pub hash: String,
    pub bytes: Vec<u8>,
}

impl SignedTx {
    pub fn new(hash: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            hash: hash.into(),
            bytes,
        }
    }
}
