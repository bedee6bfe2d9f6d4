//! Error types for polling, waiting, and submission.

use ictest_domain::ChainError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a range poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The chain height could not be read. Not retried.
    #[error(transparent)]
    Height(ChainError),

    /// Every height in the window was checked without a match.
    #[error("not found in heights {start}..={max}: {last}")]
    NotFound {
        start: u64,
        max: u64,
        /// Check error at the last height of the window.
        last: ChainError,
    },
}

/// Failure of a height barrier or sync wait.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    /// A chain height read failed. Aborts the whole wait.
    #[error("failed to get height of {chain}: {source}")]
    Height {
        chain: String,
        #[source]
        source: ChainError,
    },

    /// A node is still behind its chain. Retried on the next sync round.
    #[error("node {node} is not yet in sync: {node_height} < {chain_height}")]
    NotInSync {
        node: usize,
        node_height: u64,
        chain_height: u64,
    },

    /// The caller's cancellation token fired.
    #[error("wait cancelled")]
    Cancelled,

    /// The condition never held within the timeout.
    #[error("failed waiting for condition after {:.3} seconds", .0.as_secs_f64())]
    ConditionTimeout(Duration),

    /// The condition itself failed.
    #[error("error occurred while waiting for condition: {0}")]
    Condition(String),
}

/// Failure waiting for a transaction to become visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxWaitError {
    /// No block carried the transaction before the deadline.
    #[error("timed out after {after:?} waiting for tx {hash} to be seen")]
    Timeout { hash: String, after: Duration },

    /// The hash was registered again, so this waiter will never be signalled.
    #[error("waiter for tx {hash} was superseded by a newer registration")]
    Superseded { hash: String },
}

/// Failure of a serialized transaction submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("failed to build tx: {0}")]
    Build(#[source] ChainError),

    #[error("failed to submit tx: {0}")]
    Broadcast(#[source] ChainError),

    #[error(transparent)]
    Inclusion(#[from] TxWaitError),
}
