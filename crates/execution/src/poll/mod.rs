//! Height-by-height polling of a chain.
//!
//! Provides:
//! - A generic range poller over a closed height window
//! - Packet acknowledgement and timeout searches
//! - Typed message searches over block transactions
//! - Balance checks
//! - Governance proposal status checks

mod balance;
mod block_poller;
mod message;
mod packet;
mod proposal;

pub use balance::*;
pub use block_poller::*;
pub use message::*;
pub use packet::*;
pub use proposal::*;
