use thiserror::Error;

pub type ChainResult<T> = Result<T, ChainError>;

/// Errors raised by chain adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The node could not be reached or rejected the request.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The queried item does not exist (yet).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other adapter failure.
    #[error("{0}")]
    Other(String),
}

impl ChainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Whether this is the ordinary "not there yet" outcome of a search.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Packet validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Every problem found, in field order.
    #[error("invalid packet: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Errors raised while ingesting pushed blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// Zero, or too large to index locally.
    #[error("invalid block number {0}, block numbers start at 1")]
    InvalidBlockNumber(u64),

    /// The block would leave more than `max` skipped numbers to backfill.
    #[error("block {block_number} skips {gap} blocks, more than the {max} allowed")]
    BackfillTooLarge { block_number: u64, gap: u64, max: u64 },

    /// Backfill storage for the block could not be allocated.
    #[error("out of memory backfilling up to block {0}")]
    OutOfMemory(u64),
}
