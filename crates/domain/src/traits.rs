//! Collaborator traits implemented by chain adapters.
//!
//! The execution engine only ever talks to chains through these seams, so a
//! chain adapter needs to implement just the capabilities a given wait or
//! poll requires.

use crate::enums::BlockData;
use crate::entities::{PacketAcknowledgement, PacketTimeout};
use crate::error::{ChainResult, IngestError};
use crate::value_objects::{Point, Proposal, SignedTx, Tip, WalletAmount};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Fetches the current chain block height.
#[async_trait]
pub trait Heighter: Send + Sync {
    async fn height(&self) -> ChainResult<u64>;
}

#[async_trait]
impl<T: Heighter + ?Sized> Heighter for Arc<T> {
    async fn height(&self) -> ChainResult<u64> {
        (**self).height().await
    }
}

#[async_trait]
impl<T: Heighter + ?Sized> Heighter for &T {
    async fn height(&self) -> ChainResult<u64> {
        (**self).height().await
    }
}

/// A chain that can list the acknowledgements written at a height.
#[async_trait]
pub trait ChainAcker: Heighter {
    async fn acknowledgements(&self, height: u64) -> ChainResult<Vec<PacketAcknowledgement>>;
}

/// A chain that can list the packet timeouts processed at a height.
#[async_trait]
pub trait ChainTimeouter: Heighter {
    async fn timeouts(&self, height: u64) -> ChainResult<Vec<PacketTimeout>>;
}

/// A chain that can decode the messages of every transaction in a block.
#[async_trait]
pub trait BlockMessages: Heighter {
    type Message: Send;

    async fn messages(&self, height: u64) -> ChainResult<Vec<Self::Message>>;
}

/// A chain that can report a wallet balance.
#[async_trait]
pub trait BalanceSource: Heighter {
    async fn balance(&self, address: &str, denom: &str) -> ChainResult<Decimal>;
}

/// A chain that can look up a governance proposal.
#[async_trait]
pub trait ProposalSource: Heighter {
    async fn proposal(&self, proposal_id: &str) -> ChainResult<Proposal>;
}

/// Builds and submits transfers on behalf of a named signer.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Reads signer state and builds a signed transfer.
    async fn build_transfer(
        &self,
        key_name: &str,
        amount: &WalletAmount,
        note: &str,
    ) -> ChainResult<SignedTx>;

    async fn broadcast(&self, tx: &SignedTx) -> ChainResult<()>;
}

/// Callback surface invoked by a push-subscribing chain-sync client.
///
/// Callbacks run on the client's own thread and must return promptly.
pub trait PushBlockHandler: Send + Sync {
    fn roll_forward(&self, block_type: u32, data: BlockData, tip: Tip) -> Result<(), IngestError>;

    fn roll_backward(&self, point: Point, tip: Tip) -> Result<(), IngestError>;
}
