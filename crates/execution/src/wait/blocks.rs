//! Block delta barrier across chains.

use super::HeightTracker;
use crate::config::WaitConfig;
use crate::error::WaitError;
use ictest_domain::Heighter;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Blocks until every chain has advanced at least `delta` blocks from the
/// first non-zero height observed for it after this call began.
///
/// Uses [`WaitConfig::default`] timing. See [`wait_for_blocks_with_config`].
///
/// # Panics
/// Panics if `chains` is empty.
///
/// # Errors
/// See [`wait_for_blocks_with_config`].
pub async fn wait_for_blocks<H>(
    cancel: &CancellationToken,
    delta: u64,
    chains: &[Arc<H>],
) -> Result<Vec<HeightTracker>, WaitError>
where
    H: Heighter + ?Sized + 'static,
{
    wait_for_blocks_with_config(cancel, delta, chains, &WaitConfig::default()).await
}

/// Blocks until every chain has advanced at least `delta` blocks.
///
/// Each chain is sampled by its own task. The first task to fail cancels the
/// others and its error is returned. On success the final tracker of every
/// chain is returned in input order.
///
/// If a chain height never increases, this blocks until `cancel` fires.
///
/// # Panics
/// Panics if `chains` is empty.
///
/// # Errors
/// Returns [`WaitError::Height`] for the first chain whose height cannot be
/// read, or [`WaitError::Cancelled`] if `cancel` fires first.
pub async fn wait_for_blocks_with_config<H>(
    cancel: &CancellationToken,
    delta: u64,
    chains: &[Arc<H>],
    config: &WaitConfig,
) -> Result<Vec<HeightTracker>, WaitError>
where
    H: Heighter + ?Sized + 'static,
{
    assert!(!chains.is_empty(), "missing chains");

    let group = cancel.child_token();
    let interval = config.height_interval();
    let mut tasks = JoinSet::new();

    for (index, chain) in chains.iter().enumerate() {
        let chain = Arc::clone(chain);
        let group = group.clone();
        tasks.spawn(async move {
            let mut tracker = HeightTracker::new();
            let outcome = tokio::select! {
                _ = group.cancelled() => Err(WaitError::Cancelled),
                res = tracker.wait_for_delta(chain.as_ref(), delta, interval) => {
                    res.map_err(|source| WaitError::Height {
                        chain: format!("chain {index}"),
                        source,
                    })
                }
            };
            outcome.map(|()| (index, tracker))
        });
    }

    let mut trackers = vec![HeightTracker::new(); chains.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(join_failure).and_then(|outcome| outcome) {
            Ok((index, tracker)) => {
                debug!(
                    chain = index,
                    starting = tracker.starting(),
                    current = tracker.current(),
                    "Chain reached height delta"
                );
                trackers[index] = tracker;
            }
            Err(e) => {
                warn!(error = %e, "Waiting for blocks failed");
                group.cancel();
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    info!(chains = chains.len(), delta, "All chains reached height delta");
    Ok(trackers)
}

/// Maps a failed join to a wait error, re-raising task panics.
pub(crate) fn join_failure(e: JoinError) -> WaitError {
    if e.is_panic() {
        std::panic::resume_unwind(e.into_panic());
    }
    WaitError::Cancelled
}

/// Calls `f` with `0..max_blocks` until it succeeds.
///
/// Returns `Ok` on the first success, or the error from the last attempt once
/// every attempt has failed. `f` usually waits for a block before checking.
///
/// # Errors
/// Returns the last error from `f` when no attempt succeeds.
pub async fn wait_for_blocks_util<F, Fut, E>(max_blocks: usize, mut f: F) -> Result<(), E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    for attempt in 0..max_blocks {
        match f(attempt).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt + 1 == max_blocks => return Err(e),
            Err(_) => continue,
        }
    }
    Ok(())
}
