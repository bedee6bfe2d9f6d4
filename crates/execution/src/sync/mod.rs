//! Push-based block ingestion.
//!
//! Turns roll-forward and roll-backward callbacks from a chain-sync client
//! into:
//! - A block store indexable by block number
//! - One-shot transaction visibility notifications

mod block_store;
mod ingestor;
mod tx_waiters;

pub use block_store::*;
pub use ingestor::*;
pub use tx_waiters::*;
