//! Governance proposal status checks.

use super::BlockPoller;
use crate::config::PollConfig;
use crate::error::PollError;
use ictest_domain::{ChainError, Proposal, ProposalSource};

/// Waits within `start_height..=max_height` for proposal `proposal_id` to
/// reach `status`, re-querying the proposal once per block.
///
/// # Errors
/// Returns an error if the proposal never reaches `status` within the window
/// or the chain height cannot be read.
pub async fn poll_for_proposal_status<C>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    proposal_id: &str,
    status: &str,
) -> Result<Proposal, PollError>
where
    C: ProposalSource + ?Sized,
{
    poll_for_proposal_status_with_config(
        chain,
        start_height,
        max_height,
        proposal_id,
        status,
        &PollConfig::default(),
    )
    .await
}

/// [`poll_for_proposal_status`] with an explicit [`PollConfig`].
///
/// # Errors
/// See [`poll_for_proposal_status`].
pub async fn poll_for_proposal_status_with_config<C>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    proposal_id: &str,
    status: &str,
    config: &PollConfig,
) -> Result<Proposal, PollError>
where
    C: ProposalSource + ?Sized,
{
    let poller = BlockPoller::for_chain(chain, move |_| async move {
        let proposal = chain.proposal(proposal_id).await?;
        if !proposal.has_status(status) {
            return Err(ChainError::not_found(format!(
                "proposal status ({}) does not match expected: ({status})",
                proposal.status
            )));
        }
        Ok(proposal)
    })
    .with_config(config.clone());
    poller.do_poll(start_height, max_height).await
}
