//! Height barriers across one or more chains.
//!
//! Provides:
//! - Height delta tracking per chain
//! - A barrier that waits for every chain to advance by N blocks
//! - Node catch-up checks against a reference chain
//! - Generic retry and condition helpers

mod blocks;
mod condition;
mod height;
mod in_sync;

pub use blocks::*;
pub use condition::*;
pub use height::*;
pub use in_sync::*;
