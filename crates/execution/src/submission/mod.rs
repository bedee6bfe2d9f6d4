//! Serialized transaction submission.
//!
//! Transactions built from the same signer must not interleave, since each
//! one reads signer state (UTXOs, sequence) that the previous one consumes.

mod address_locks;
mod submitter;

pub use address_locks::*;
pub use submitter::*;
