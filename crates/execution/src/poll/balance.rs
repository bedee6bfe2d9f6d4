//! Balance checks over a block window.

use super::BlockPoller;
use crate::config::PollConfig;
use crate::error::PollError;
use ictest_domain::{BalanceSource, ChainError, WalletAmount};

/// Waits up to `delta_blocks` blocks for the wallet balance to equal `expected.amount`.
///
/// # Errors
/// Returns an error if the balance never matches within the window or the
/// chain height cannot be read.
pub async fn poll_for_balance<C>(
    chain: &C,
    delta_blocks: u64,
    expected: &WalletAmount,
) -> Result<(), PollError>
where
    C: BalanceSource + ?Sized,
{
    poll_for_balance_with_config(chain, delta_blocks, expected, &PollConfig::default()).await
}

/// [`poll_for_balance`] with an explicit [`PollConfig`].
///
/// # Errors
/// See [`poll_for_balance`].
pub async fn poll_for_balance_with_config<C>(
    chain: &C,
    delta_blocks: u64,
    expected: &WalletAmount,
    config: &PollConfig,
) -> Result<(), PollError>
where
    C: BalanceSource + ?Sized,
{
    let start = chain.height().await.map_err(PollError::Height)?;
    let poller = BlockPoller::for_chain(chain, move |_| async move {
        let balance = chain.balance(&expected.address, &expected.denom).await?;
        if balance != expected.amount {
            return Err(ChainError::not_found(format!(
                "balance ({balance}) does not match expected: ({})",
                expected.amount
            )));
        }
        Ok(())
    })
    .with_config(config.clone());
    poller.do_poll(start, start.saturating_add(delta_blocks)).await
}

/// Waits up to `delta_blocks` blocks for the wallet balance to move away from `previous.amount`.
///
/// # Errors
/// Returns an error if the balance stays unchanged over the window or the
/// chain height cannot be read.
pub async fn poll_for_balance_change<C>(
    chain: &C,
    delta_blocks: u64,
    previous: &WalletAmount,
) -> Result<(), PollError>
where
    C: BalanceSource + ?Sized,
{
    poll_for_balance_change_with_config(chain, delta_blocks, previous, &PollConfig::default())
        .await
}

/// [`poll_for_balance_change`] with an explicit [`PollConfig`].
///
/// # Errors
/// See [`poll_for_balance_change`].
pub async fn poll_for_balance_change_with_config<C>(
    chain: &C,
    delta_blocks: u64,
    previous: &WalletAmount,
    config: &PollConfig,
) -> Result<(), PollError>
where
    C: BalanceSource + ?Sized,
{
    let start = chain.height().await.map_err(PollError::Height)?;
    let poller = BlockPoller::for_chain(chain, move |_| async move {
        let balance = chain.balance(&previous.address, &previous.denom).await?;
        if balance == previous.amount {
            return Err(ChainError::not_found(format!(
                "{} balance ({balance}) hasn't changed: ({}) in {delta_blocks} blocks",
                previous.address, previous.amount
            )));
        }
        Ok(())
    })
    .with_config(config.clone());
    poller.do_poll(start, start.saturating_add(delta_blocks)).await
}
