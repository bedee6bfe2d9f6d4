//! In-process chains for smoke runs and end-to-end tests.
//!
//! - [`SimulatedChain`]: a height that ticks on a timer
//! - [`SimulatedPushChain`]: a block producer that pushes chain-sync events
//!   and accepts transfers

mod chain;
mod push_chain;

pub use chain::*;
pub use push_chain::*;
