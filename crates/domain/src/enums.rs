use crate::value_objects::{DeliveredBlock, Point};
use serde::{Deserialize, Serialize};

/// Payload of a roll-forward event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockData {
    /// A full block with its transactions.
    Block(DeliveredBlock),
    /// Header only, no transactions. Node-to-node sync delivers these.
    Header(Point),
}

/// What a block ingestor does with a roll-backward event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollbackPolicy {
    /// Accept the event and keep every stored block.
    Ignore,
    /// Drop stored blocks whose slot is after the rollback point.
    #[default]
    Truncate,
}
