//! Per-chain height delta tracking.

use ictest_domain::{ChainResult, Heighter};
use std::time::Duration;
use tracing::trace;

/// Tracks how far one chain has advanced since it was first observed.
///
/// Height 0 means the chain is not initialized yet and is never taken as the
/// starting height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeightTracker {
    starting: u64,
    current: u64,
}

impl HeightTracker {
    /// Creates a tracker that has not sampled any height yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// First non-zero height observed, or 0 if none yet.
    pub fn starting(&self) -> u64 {
        self.starting
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    /// Blocks produced since the starting height.
    pub fn delta(&self) -> u64 {
        if self.starting == 0 {
            return 0;
        }
        self.current.saturating_sub(self.starting)
    }

    /// Records an observed height. Zero heights are ignored.
    pub fn update(&mut self, height: u64) {
        if height == 0 {
            return;
        }
        if self.starting == 0 {
            self.starting = height;
        }
        self.current = height;
    }

    /// Samples `chain` until it has advanced by at least `delta` blocks.
    ///
    /// If the chain height never increases this never returns.
    ///
    /// # Errors
    /// Returns the first height error.
    pub async fn wait_for_delta<H>(
        &mut self,
        chain: &H,
        delta: u64,
        interval: Duration,
    ) -> ChainResult<()>
    where
        H: Heighter + ?Sized,
    {
        while self.delta() < delta {
            let height = chain.height().await?;
            self.update(height);
            trace!(
                height,
                starting = self.starting,
                delta = self.delta(),
                "Sampled height"
            );
            if self.delta() < delta && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(())
    }
}
