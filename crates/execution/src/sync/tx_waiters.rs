//! One-shot transaction visibility notifications.

use crate::error::TxWaitError;
use ictest_domain::TxInclusion;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

#[derive(Debug)]
struct Pending {
    id: u64,
    sender: oneshot::Sender<TxInclusion>,
}

/// Registry of transactions awaiting inclusion, keyed by tx hash.
///
/// Each entry is consumed exactly once: either by [`TxWaiters::notify`] when
/// a block containing the hash arrives, or by its [`TxWaiter`] giving up.
/// Signalling happens under the registry lock, so a waiter that finds its
/// entry gone is guaranteed the signal is already in its channel.
#[derive(Debug, Default)]
pub struct TxWaiters {
    pending: Mutex<HashMap<String, Pending>>,
    next_id: AtomicU64,
}

impl TxWaiters {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `tx_hash`. Call before broadcasting.
    ///
    /// Registering a hash that is already awaited supersedes the older waiter.
    pub fn register(self: &Arc<Self>, tx_hash: impl Into<String>) -> TxWaiter {
        let tx_hash = tx_hash.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();

        let replaced = self
            .pending
            .lock()
            .insert(tx_hash.clone(), Pending { id, sender });
        if replaced.is_some() {
            warn!(tx_hash = %tx_hash, "Superseded existing tx waiter");
        }

        TxWaiter {
            tx_hash,
            id,
            receiver,
            registry: Arc::clone(self),
        }
    }

    /// Signals the waiter for `inclusion.tx_hash` and removes it.
    ///
    /// Returns `false` when nobody is waiting for the hash.
    pub fn notify(&self, inclusion: TxInclusion) -> bool {
        let mut pending = self.pending.lock();
        match pending.remove(&inclusion.tx_hash) {
            Some(entry) => {
                debug!(
                    tx_hash = %inclusion.tx_hash,
                    block_number = inclusion.block_number,
                    "Tx seen"
                );
                // The receiver may already be gone; the entry is consumed either way.
                let _ = entry.sender.send(inclusion);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, tx_hash: &str) -> bool {
        self.pending.lock().contains_key(tx_hash)
    }

    /// Number of transactions still awaited.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Removes the entry for `tx_hash` if it still belongs to waiter `id`.
    fn withdraw(&self, tx_hash: &str, id: u64) -> bool {
        let mut pending = self.pending.lock();
        if pending.get(tx_hash).is_some_and(|entry| entry.id == id) {
            pending.remove(tx_hash);
            true
        } else {
            false
        }
    }
}

/// Handle for one registered transaction.
///
/// Dropping the handle withdraws its registry entry.
#[derive(Debug)]
pub struct TxWaiter {
    tx_hash: String,
    id: u64,
    receiver: oneshot::Receiver<TxInclusion>,
    registry: Arc<TxWaiters>,
}

impl TxWaiter {
    /// Hash this waiter is registered for.
    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    /// Waits up to `timeout` for the transaction to be seen in a block.
    ///
    /// # Errors
    /// Returns [`TxWaitError::Timeout`] when the deadline passes first, or
    /// [`TxWaitError::Superseded`] when the hash was registered again.
    pub async fn wait(mut self, timeout: Duration) -> Result<TxInclusion, TxWaitError> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(inclusion)) => Ok(inclusion),
            Ok(Err(_)) => Err(TxWaitError::Superseded {
                hash: self.tx_hash.clone(),
            }),
            Err(_) => self.after_deadline(timeout),
        }
    }

    /// Settles a waiter whose deadline has passed. A delivery that landed
    /// between the deadline and the withdrawal still counts.
    fn after_deadline(&mut self, timeout: Duration) -> Result<TxInclusion, TxWaitError> {
        if self.registry.withdraw(&self.tx_hash, self.id) {
            return Err(TxWaitError::Timeout {
                hash: self.tx_hash.clone(),
                after: timeout,
            });
        }
        self.receiver
            .try_recv()
            .map_err(|_| TxWaitError::Superseded {
                hash: self.tx_hash.clone(),
            })
    }
}

impl Drop for TxWaiter {
    fn drop(&mut self) {
        self.registry.withdraw(&self.tx_hash, self.id);
    }
}
