//! Timing and policy configuration for the engine.

use crate::sync::DEFAULT_MAX_BACKFILL;
use ictest_domain::RollbackPolicy;
use std::time::Duration;

/// Configuration for range polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before re-checking a height the chain has not produced yet, in milliseconds.
    /// Zero re-checks immediately.
    pub retry_interval_ms: u64,
}

impl PollConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: 25,
        }
    }
}

/// Configuration for height barriers.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Delay between height samples of one chain, in milliseconds.
    pub height_interval_ms: u64,
    /// Delay between sync rounds of a node set, in milliseconds.
    pub sync_round_interval_ms: u64,
}

impl WaitConfig {
    pub fn height_interval(&self) -> Duration {
        Duration::from_millis(self.height_interval_ms)
    }

    pub fn sync_round_interval(&self) -> Duration {
        Duration::from_millis(self.sync_round_interval_ms)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            height_interval_ms: 25,
            sync_round_interval_ms: 50,
        }
    }
}

/// Configuration for transaction submission.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// How long to wait for a broadcast transaction to appear in a block, in seconds.
    pub inclusion_timeout_secs: u64,
}

impl SubmitConfig {
    pub fn inclusion_timeout(&self) -> Duration {
        Duration::from_secs(self.inclusion_timeout_secs)
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            inclusion_timeout_secs: 30,
        }
    }
}

/// Configuration for push block ingestion.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Handling of roll-backward events.
    pub rollback_policy: RollbackPolicy,
    /// Capacity of the chain-sync event channel.
    pub channel_size: usize,
    /// Most block numbers a single pushed block may skip.
    pub max_backfill: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            rollback_policy: RollbackPolicy::default(),
            channel_size: 1000,
            max_backfill: DEFAULT_MAX_BACKFILL,
        }
    }
}

/// All engine settings in one place.
#[derive(Debug, Clone, Default)]
pub struct HarnessConfig {
    pub poll: PollConfig,
    pub wait: WaitConfig,
    pub submit: SubmitConfig,
    pub ingest: IngestConfig,
}
