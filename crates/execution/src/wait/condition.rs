//! Periodic condition checks with a deadline.

use crate::error::WaitError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// Evaluates `f` every `polling_interval` until it returns `true`.
///
/// The first evaluation happens after one interval.
///
/// # Errors
/// Returns [`WaitError::ConditionTimeout`] if the condition is not met within
/// `timeout_after`, or [`WaitError::Condition`] as soon as `f` fails.
pub async fn wait_for_condition<F, Fut, E>(
    timeout_after: Duration,
    polling_interval: Duration,
    mut f: F,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    let check = async {
        let mut checks: u64 = 0;
        loop {
            tokio::time::sleep(polling_interval).await;
            checks += 1;
            match f().await {
                Ok(true) => return Ok(()),
                Ok(false) => trace!(checks, "Condition not met yet"),
                Err(e) => return Err(WaitError::Condition(e.to_string())),
            }
        }
    };

    tokio::time::timeout(timeout_after, check)
        .await
        .map_err(|_| WaitError::ConditionTimeout(timeout_after))?
}
