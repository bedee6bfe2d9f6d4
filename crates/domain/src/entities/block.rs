use serde::{Deserialize, Serialize};

/// One ledger block observed from a push source.
///
/// `Block::default()` is the zero-valued placeholder used to backfill gaps
/// in a block store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// Slot the block was minted in.
    pub slot_number: u64,
    /// Block header hash.
    pub hash: String,
    /// Height of the block, starting at 1.
    pub block_number: u64,
}

impl Block {
    /// Creates a block record.
    pub fn new(block_number: u64, slot_number: u64, hash: impl Into<String>) -> Self {
        Self {
            slot_number,
            hash: hash.into(),
            block_number,
        }
    }

    /// Whether this entry is a backfill placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.block_number == 0 && self.slot_number == 0 && self.hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_placeholder() {
        assert!(Block::default().is_placeholder());
        assert!(!Block::new(1, 10, "ab").is_placeholder());
    }
}
