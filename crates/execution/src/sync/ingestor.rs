//! Push block ingestion from a chain-sync client.

use super::{BlockStore, TxWaiters};
use crate::config::IngestConfig;
use async_trait::async_trait;
use ictest_domain::{
    BlockData, ChainResult, Heighter, IngestError, Point, PushBlockHandler, RollbackPolicy, Tip,
    TxInclusion,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Event delivered by a chain-sync client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainSyncEvent {
    /// A new block, or header, extends the chain.
    RollForward {
        /// Era or encoding tag assigned by the client.
        block_type: u32,
        /// Block body, or header only.
        data: BlockData,
        /// Remote tip at delivery.
        tip: Tip,
    },
    /// The chain switched forks back to `point`.
    RollBackward {
        /// Last point kept on the new fork.
        point: Point,
        /// Remote tip at delivery.
        tip: Tip,
    },
}

/// Creates the event channel a chain-sync client feeds into [`BlockIngestor::run`].
pub fn event_channel(
    config: &IngestConfig,
) -> (mpsc::Sender<ChainSyncEvent>, mpsc::Receiver<ChainSyncEvent>) {
    mpsc::channel(config.channel_size.max(1))
}

/// Maintains a local block store from pushed blocks and wakes transaction
/// waiters as their hashes appear.
#[derive(Debug)]
pub struct BlockIngestor {
    store: Arc<BlockStore>,
    waiters: Arc<TxWaiters>,
    policy: RollbackPolicy,
    tip: Mutex<Tip>,
}

impl BlockIngestor {
    /// Creates an ingestor with an empty store and the default backfill cap.
    pub fn new(policy: RollbackPolicy) -> Self {
        Self::with_store(policy, BlockStore::new())
    }

    /// Creates an ingestor from [`IngestConfig`].
    pub fn with_config(config: &IngestConfig) -> Self {
        Self::with_store(
            config.rollback_policy,
            BlockStore::with_max_backfill(config.max_backfill),
        )
    }

    fn with_store(policy: RollbackPolicy, store: BlockStore) -> Self {
        Self {
            store: Arc::new(store),
            waiters: Arc::new(TxWaiters::new()),
            policy,
            tip: Mutex::new(Tip::default()),
        }
    }

    /// Blocks ingested so far.
    pub fn store(&self) -> &Arc<BlockStore> {
        &self.store
    }

    /// Transactions awaiting inclusion. Share with a submitter.
    pub fn waiters(&self) -> &Arc<TxWaiters> {
        &self.waiters
    }

    /// Roll-backward handling in effect.
    pub fn policy(&self) -> RollbackPolicy {
        self.policy
    }

    /// Remote tip reported by the most recent event.
    pub fn tip(&self) -> Tip {
        self.tip.lock().clone()
    }

    /// Applies one chain-sync event.
    ///
    /// # Errors
    /// Propagates the handler error for the event.
    pub fn apply(&self, event: ChainSyncEvent) -> Result<(), IngestError> {
        match event {
            ChainSyncEvent::RollForward {
                block_type,
                data,
                tip,
            } => self.roll_forward(block_type, data, tip),
            ChainSyncEvent::RollBackward { point, tip } => self.roll_backward(point, tip),
        }
    }

    /// Consumes events until the channel closes or `cancel` fires.
    ///
    /// A failed event is logged and skipped.
    pub async fn run(&self, mut events: mpsc::Receiver<ChainSyncEvent>, cancel: CancellationToken) {
        info!(policy = ?self.policy, "Starting block ingestor");

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Block ingestor cancelled");
                    break;
                }
                event = events.recv() => event,
            };

            match event {
                Some(event) => {
                    if let Err(e) = self.apply(event) {
                        error!(error = %e, "Failed to apply chain-sync event");
                    }
                }
                None => {
                    info!("Chain-sync event channel closed");
                    break;
                }
            }
        }
    }
}

impl Default for BlockIngestor {
    fn default() -> Self {
        Self::new(RollbackPolicy::default())
    }
}

impl PushBlockHandler for BlockIngestor {
    fn roll_forward(&self, block_type: u32, data: BlockData, tip: Tip) -> Result<(), IngestError> {
        *self.tip.lock() = tip;

        let block = match data {
            BlockData::Block(block) => block,
            BlockData::Header(point) => {
                warn!(
                    block_type,
                    slot_number = point.slot_number,
                    "Roll forward without block body, ignoring"
                );
                return Ok(());
            }
        };

        self.store.insert(block.to_block())?;
        debug!(
            block_number = block.block_number,
            slot_number = block.slot_number,
            txs = block.tx_hashes.len(),
            "Stored block"
        );

        for tx_hash in block.tx_hashes {
            self.waiters.notify(TxInclusion {
                tx_hash,
                block_number: block.block_number,
                slot_number: block.slot_number,
                block_hash: block.hash.clone(),
            });
        }
        Ok(())
    }

    fn roll_backward(&self, point: Point, tip: Tip) -> Result<(), IngestError> {
        *self.tip.lock() = tip;

        match self.policy {
            RollbackPolicy::Ignore => {
                debug!(slot_number = point.slot_number, "Ignoring roll backward");
            }
            RollbackPolicy::Truncate => {
                let removed = self.store.truncate_after_slot(point.slot_number);
                if removed > 0 {
                    warn!(
                        slot_number = point.slot_number,
                        hash = %point.hash,
                        removed,
                        "Rolled back stored blocks"
                    );
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Heighter for BlockIngestor {
    /// Highest block number stored locally, or 0 before the first block.
    async fn height(&self) -> ChainResult<u64> {
        Ok(self.store.last().map_or(0, |b| b.block_number))
    }
}
