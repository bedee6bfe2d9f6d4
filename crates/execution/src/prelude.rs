//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use ictest_execution::prelude::*;
//! ```

// Config
pub use crate::config::{HarnessConfig, IngestConfig, PollConfig, SubmitConfig, WaitConfig};

// Errors
pub use crate::error::{PollError, SubmitError, TxWaitError, WaitError};

// Poll
pub use crate::poll::{
    BlockPoller, PacketPollError, poll_for_ack, poll_for_ack_with_config, poll_for_balance,
    poll_for_balance_change, poll_for_balance_change_with_config, poll_for_balance_with_config,
    poll_for_first_message, poll_for_message, poll_for_message_with_config,
    poll_for_proposal_status, poll_for_proposal_status_with_config, poll_for_timeout,
    poll_for_timeout_with_config,
};

// Simulated
pub use crate::simulated::{SimulatedChain, SimulatedPushChain};

// Submission
pub use crate::submission::{AddressLocks, TxSubmitter};

// Sync
pub use crate::sync::{BlockIngestor, BlockStore, ChainSyncEvent, TxWaiter, TxWaiters, event_channel};

// Wait
pub use crate::wait::{
    HeightTracker, nodes_in_sync, wait_for_blocks, wait_for_blocks_util,
    wait_for_blocks_with_config, wait_for_condition, wait_for_in_sync,
    wait_for_in_sync_with_config,
};
