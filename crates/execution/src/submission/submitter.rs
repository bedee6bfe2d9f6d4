//! Funds transfers serialized per signer.

use super::AddressLocks;
use crate::config::SubmitConfig;
use crate::error::SubmitError;
use crate::sync::TxWaiters;
use ictest_domain::{Broadcaster, TxInclusion, WalletAmount};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sends transfers and waits until each one is seen in a block.
///
/// Submissions for the same key name are serialized from build through
/// inclusion, so the next build observes the state left by the previous
/// transfer. Inclusion is detected through the shared [`TxWaiters`], which a
/// [`crate::sync::BlockIngestor`] feeds.
pub struct TxSubmitter<B> {
    broadcaster: Arc<B>,
    waiters: Arc<TxWaiters>,
    locks: Arc<AddressLocks>,
    config: SubmitConfig,
}

impl<B: Broadcaster> TxSubmitter<B> {
    pub fn new(broadcaster: Arc<B>, waiters: Arc<TxWaiters>) -> Self {
        Self::with_config(broadcaster, waiters, SubmitConfig::default())
    }

    pub fn with_config(broadcaster: Arc<B>, waiters: Arc<TxWaiters>, config: SubmitConfig) -> Self {
        Self {
            broadcaster,
            waiters,
            locks: Arc::new(AddressLocks::new()),
            config,
        }
    }

    /// Shares a lock registry with other submitters of the same chain.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<AddressLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn locks(&self) -> &Arc<AddressLocks> {
        &self.locks
    }

    /// Sends `amount` from the signer `key_name`.
    ///
    /// # Errors
    /// See [`TxSubmitter::send_funds_with_note`].
    pub async fn send_funds(
        &self,
        key_name: &str,
        amount: &WalletAmount,
    ) -> Result<TxInclusion, SubmitError> {
        self.send_funds_with_note(key_name, amount, "").await
    }

    /// Sends `amount` from the signer `key_name` with a memo, and returns
    /// where the transaction landed.
    ///
    /// # Errors
    /// Returns [`SubmitError::Build`] or [`SubmitError::Broadcast`] when the
    /// chain rejects the transfer, or [`SubmitError::Inclusion`] when it is
    /// not seen within the inclusion timeout.
    pub async fn send_funds_with_note(
        &self,
        key_name: &str,
        amount: &WalletAmount,
        note: &str,
    ) -> Result<TxInclusion, SubmitError> {
        let _guard = self.locks.acquire(key_name).await;

        let tx = self
            .broadcaster
            .build_transfer(key_name, amount, note)
            .await
            .map_err(SubmitError::Build)?;

        // Registered before broadcast so a fast block cannot be missed.
        let waiter = self.waiters.register(tx.hash.clone());

        if let Err(e) = self.broadcaster.broadcast(&tx).await {
            warn!(key_name, tx_hash = %tx.hash, error = %e, "Broadcast failed");
            return Err(SubmitError::Broadcast(e));
        }
        debug!(key_name, tx_hash = %tx.hash, "Broadcast tx, waiting for inclusion");

        let inclusion = waiter.wait(self.config.inclusion_timeout()).await?;

        info!(
            key_name,
            to = %amount.address,
            amount = %amount.amount,
            denom = %amount.denom,
            tx_hash = %inclusion.tx_hash,
            block_number = inclusion.block_number,
            "Funds sent"
        );
        Ok(inclusion)
    }
}
