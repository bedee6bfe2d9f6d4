//! Generic range poller.

use crate::config::PollConfig;
use crate::error::PollError;
use ictest_domain::{ChainResult, Heighter};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, trace};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type HeightFn<'a> = Box<dyn Fn() -> BoxFuture<'a, ChainResult<u64>> + Send + Sync + 'a>;
type CheckFn<'a, T> = Box<dyn Fn(u64) -> BoxFuture<'a, ChainResult<T>> + Send + Sync + 'a>;

/// Scans a closed height window, one height at a time, until a check matches.
///
/// The check is only run against heights the chain has already produced. A
/// check error means "not found at this height" and scanning moves on; a
/// height error aborts the poll.
///
/// The poller has no deadline of its own. If the chain never reaches the
/// window, `do_poll` waits forever, so callers that need bounded wall-clock
/// time wrap it in [`tokio::time::timeout`].
pub struct BlockPoller<'a, T> {
    current_height: HeightFn<'a>,
    poll_fn: CheckFn<'a, T>,
    config: PollConfig,
}

impl<'a, T: 'a> BlockPoller<'a, T> {
    /// Creates a poller from a height accessor and a per-height check.
    pub fn new<H, HF, P, PF>(current_height: H, poll_fn: P) -> Self
    where
        H: Fn() -> HF + Send + Sync + 'a,
        HF: Future<Output = ChainResult<u64>> + Send + 'a,
        P: Fn(u64) -> PF + Send + Sync + 'a,
        PF: Future<Output = ChainResult<T>> + Send + 'a,
    {
        Self {
            current_height: Box::new(move || Box::pin(current_height())),
            poll_fn: Box::new(move |height| Box::pin(poll_fn(height))),
            config: PollConfig::default(),
        }
    }

    /// Creates a poller that reads the current height from `chain`.
    pub fn for_chain<C, P, PF>(chain: &'a C, poll_fn: P) -> Self
    where
        C: Heighter + ?Sized,
        P: Fn(u64) -> PF + Send + Sync + 'a,
        PF: Future<Output = ChainResult<T>> + Send + 'a,
    {
        Self {
            current_height: Box::new(move || chain.height()),
            poll_fn: Box::new(move |height| Box::pin(poll_fn(height))),
            config: PollConfig::default(),
        }
    }

    /// Sets the poll configuration.
    #[must_use]
    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    /// Polls heights `start_height..=max_height` in increasing order and
    /// returns the first match.
    ///
    /// # Panics
    /// Panics if `max_height < start_height`.
    ///
    /// # Errors
    /// Returns [`PollError::Height`] as soon as the height accessor fails, or
    /// [`PollError::NotFound`] carrying the last check error once the window
    /// is exhausted.
    pub async fn do_poll(&self, start_height: u64, max_height: u64) -> Result<T, PollError> {
        assert!(
            max_height >= start_height,
            "max_height must be greater than or equal to start_height"
        );

        let retry_interval = self.config.retry_interval();
        let mut cursor = start_height;

        loop {
            let current = (self.current_height)().await.map_err(PollError::Height)?;

            if cursor > current {
                trace!(cursor, current, "Height not produced yet");
                if retry_interval.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(retry_interval).await;
                }
                continue;
            }

            match (self.poll_fn)(cursor).await {
                Ok(found) => {
                    debug!(height = cursor, "Poll matched");
                    return Ok(found);
                }
                Err(e) if cursor == max_height => {
                    debug!(
                        start = start_height,
                        max = max_height,
                        error = %e,
                        "Poll window exhausted"
                    );
                    return Err(PollError::NotFound {
                        start: start_height,
                        max: max_height,
                        last: e,
                    });
                }
                Err(e) => {
                    if e.is_not_found() {
                        trace!(height = cursor, error = %e, "Not found at height");
                    } else {
                        debug!(height = cursor, error = %e, "Check failed at height, moving on");
                    }
                    cursor += 1;
                }
            }
        }
    }
}
