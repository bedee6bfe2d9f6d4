//! Domain types shared by the interchain test harness.
//!
//! This crate holds the value types observed on chains under test (blocks,
//! IBC packets, wallet amounts, chain-sync points) together with the
//! collaborator traits that chain adapters implement for the execution engine.

pub mod entities;
pub mod enums;
pub mod error;
pub mod traits;
pub mod value_objects;

pub use entities::{Block, Packet, PacketAcknowledgement, PacketTimeout};
pub use enums::{BlockData, RollbackPolicy};
pub use error::{ChainError, ChainResult, IngestError, PacketError};
pub use traits::{
    BalanceSource, BlockMessages, Broadcaster, ChainAcker, ChainTimeouter, Heighter,
    ProposalSource, PushBlockHandler,
};
pub use value_objects::{
    DeliveredBlock, Point, Proposal, SignedTx, Tip, TxInclusion, WalletAmount,
};
