//! Block-height sync and event-notification engine for interchain tests.
//!
//! This crate provides the waiting primitives a test harness needs while
//! chains under test produce blocks:
//! - Range polling of a height window for packets, messages and balances
//! - Block delta barriers across several chains
//! - Node catch-up checks
//! - Push block ingestion with one-shot transaction notifications
//! - Per-signer serialized transaction submission
//! - Simulated chains for smoke runs

/// Prelude module for convenient imports.
pub mod prelude;

/// Timing and policy configuration.
pub mod config;
/// Error types.
pub mod error;
/// Range polling.
pub mod poll;
/// Simulated chains.
pub mod simulated;
/// Serialized transaction submission.
pub mod submission;
/// Push block ingestion.
pub mod sync;
/// Height barriers.
pub mod wait;
