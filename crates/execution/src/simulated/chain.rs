//! Timer-driven block height.

use async_trait::async_trait;
use ictest_domain::{ChainResult, Heighter};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// A chain whose height grows by one every `block_time`.
#[derive(Debug)]
pub struct SimulatedChain {
    name: String,
    height: AtomicU64,
    block_time: Duration,
}

impl SimulatedChain {
    pub fn new(name: impl Into<String>, start_height: u64, block_time: Duration) -> Self {
        Self {
            name: name.into(),
            height: AtomicU64::new(start_height),
            block_time,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    /// Produces one block and returns the new height.
    pub fn advance(&self) -> u64 {
        self.height.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Starts block production. The first block lands one `block_time` from now.
    ///
    /// # Panics
    /// Panics if `block_time` is zero.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let chain = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + chain.block_time, chain.block_time);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(chain = %chain.name, height = chain.current(), "Starting block production");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let height = chain.advance();
                        trace!(chain = %chain.name, height, "Produced block");
                    }
                }
            }
            debug!(chain = %chain.name, height = chain.current(), "Stopped block production");
        })
    }
}

#[async_trait]
impl Heighter for SimulatedChain {
    async fn height(&self) -> ChainResult<u64> {
        Ok(self.current())
    }
}
