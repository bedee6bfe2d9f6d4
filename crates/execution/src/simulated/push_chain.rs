//! Block producer that pushes chain-sync events.

use crate::sync::ChainSyncEvent;
use async_trait::async_trait;
use ictest_domain::{
    BalanceSource, BlockData, Broadcaster, ChainError, ChainResult, DeliveredBlock, Heighter,
    SignedTx, Tip, WalletAmount,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Slots elapsed per produced block.
pub const SLOTS_PER_BLOCK: u64 = 20;

/// Era tag attached to every roll-forward event.
pub const BLOCK_TYPE: u32 = 6;

/// A chain that seals broadcast transfers into blocks and pushes each block
/// to a chain-sync subscriber.
///
/// Every broadcast transaction lands in the next produced block, where its
/// amount is credited to the recipient.
#[derive(Debug)]
pub struct SimulatedPushChain {
    height: AtomicU64,
    block_time: Duration,
    built: Mutex<HashMap<String, WalletAmount>>,
    mempool: Mutex<Vec<(String, WalletAmount)>>,
    balances: Mutex<HashMap<(String, String), Decimal>>,
    events: mpsc::Sender<ChainSyncEvent>,
}

impl SimulatedPushChain {
    pub fn new(block_time: Duration, events: mpsc::Sender<ChainSyncEvent>) -> Self {
        Self {
            height: AtomicU64::new(0),
            block_time,
            built: Mutex::new(HashMap::new()),
            mempool: Mutex::new(Vec::new()),
            balances: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn current(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    /// Transactions waiting for the next block.
    pub fn mempool_len(&self) -> usize {
        self.mempool.lock().len()
    }

    /// Seals the mempool into a new block and pushes it to the subscriber.
    ///
    /// # Errors
    /// Returns an error if the subscriber has gone away.
    pub async fn produce_block(&self) -> ChainResult<DeliveredBlock> {
        let txs: Vec<(String, WalletAmount)> = std::mem::take(&mut *self.mempool.lock());
        let block_number = self.height.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut balances = self.balances.lock();
            for (_, amount) in &txs {
                *balances
                    .entry((amount.address.clone(), amount.denom.clone()))
                    .or_default() += amount.amount;
            }
        }

        let block = DeliveredBlock {
            block_number,
            slot_number: block_number * SLOTS_PER_BLOCK,
            hash: Uuid::new_v4().simple().to_string(),
            tx_hashes: txs.into_iter().map(|(hash, _)| hash).collect(),
        };
        let tip = Tip {
            point: block.point(),
            block_number,
        };
        debug!(block_number, txs = block.tx_hashes.len(), "Produced block");

        self.events
            .send(ChainSyncEvent::RollForward {
                block_type: BLOCK_TYPE,
                data: BlockData::Block(block.clone()),
                tip,
            })
            .await
            .map_err(|_| ChainError::Other("chain-sync subscriber closed".to_string()))?;
        Ok(block)
    }

    /// Starts block production. The first block lands one `block_time` from now.
    ///
    /// Stops when `cancel` fires or the subscriber goes away.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let chain = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + chain.block_time, chain.block_time);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(block_time = ?chain.block_time, "Starting push chain");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = chain.produce_block().await {
                            warn!(error = %e, "Stopping push chain");
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl Heighter for SimulatedPushChain {
    async fn height(&self) -> ChainResult<u64> {
        Ok(self.current())
    }
}

#[async_trait]
impl BalanceSource for SimulatedPushChain {
    async fn balance(&self, address: &str, denom: &str) -> ChainResult<Decimal> {
        Ok(self
            .balances
            .lock()
            .get(&(address.to_string(), denom.to_string()))
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Broadcaster for SimulatedPushChain {
    async fn build_transfer(
        &self,
        key_name: &str,
        amount: &WalletAmount,
        note: &str,
    ) -> ChainResult<SignedTx> {
        if amount.amount <= Decimal::ZERO {
            return Err(ChainError::Other(format!(
                "transfer amount must be positive, got {}",
                amount.amount
            )));
        }
        let hash = Uuid::new_v4().simple().to_string();
        self.built.lock().insert(hash.clone(), amount.clone());
        Ok(SignedTx::new(hash, format!("{key_name}:{note}").into_bytes()))
    }

    async fn broadcast(&self, tx: &SignedTx) -> ChainResult<()> {
        let amount = self
            .built
            .lock()
            .remove(&tx.hash)
            .ok_or_else(|| ChainError::Rpc(format!("unknown or duplicate tx {}", tx.hash)))?;
        self.mempool.lock().push((tx.hash.clone(), amount));
        Ok(())
    }
}
