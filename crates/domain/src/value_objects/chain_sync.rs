//! Values exchanged with a push-subscribing chain-sync client.

use crate::entities::Block;
use serde::{Deserialize, Serialize};

/// A position on the chain, identified by slot and block hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Slot of the block at this point.
    pub slot_number: u64,
    /// Hash of the block at this point. Empty for the origin.
    pub hash: String,
}

impl Point {
    /// Creates a point.
    pub fn new(slot_number: u64, hash: impl Into<String>) -> Self {
        Self {
            slot_number,
            hash: hash.into(),
        }
    }

    /// The chain origin, before any block.
    pub fn origin() -> Self {
        Self::default()
    }
}

/// The remote node's current chain tip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    /// Position of the tip block.
    pub point: Point,
    /// Height of the tip block.
    pub block_number: u64,
}

/// A full block delivered by a roll-forward event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredBlock {
    /// Height of the block, starting at 1.
    pub block_number: u64,
    /// Slot the block was minted in.
    pub slot_number: u64,
    /// Block header hash.
    pub hash: String,
    /// Hashes of every transaction in the block, in block order.
    pub tx_hashes: Vec<String>,
}

impl DeliveredBlock {
    /// The block record kept in a block store.
    pub fn to_block(&self) -> Block {
        Block::new(self.block_number, self.slot_number, self.hash.clone())
    }

    /// The chain point of this block.
    pub fn point(&self) -> Point {
        Point::new(self.slot_number, self.hash.clone())
    }
}

/// Where a transaction became visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInclusion {
    /// Hash of the included transaction.
    pub tx_hash: String,
    /// Height of the including block.
    pub block_number: u64,
    /// Slot of the including block.
    pub slot_number: u64,
    /// Hash of the including block.
    pub block_hash: String,
}
