//! Node catch-up checks against a reference chain.

use super::blocks::join_failure;
use crate::config::WaitConfig;
use crate::error::WaitError;
use ictest_domain::Heighter;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Samples the chain and every node once, concurrently, and checks that no
/// node is behind the chain.
///
/// # Errors
/// Returns the first height error, or [`WaitError::NotInSync`] naming the
/// first node found behind.
pub async fn nodes_in_sync<C, N>(chain: &Arc<C>, nodes: &[Arc<N>]) -> Result<(), WaitError>
where
    C: Heighter + ?Sized + 'static,
    N: Heighter + ?Sized + 'static,
{
    let mut tasks = JoinSet::new();
    {
        let chain = Arc::clone(chain);
        tasks.spawn(async move {
            chain.height().await.map(|h| (None, h)).map_err(|source| WaitError::Height {
                chain: "chain".to_string(),
                source,
            })
        });
    }
    for (index, node) in nodes.iter().enumerate() {
        let node = Arc::clone(node);
        tasks.spawn(async move {
            node.height()
                .await
                .map(|h| (Some(index), h))
                .map_err(|source| WaitError::Height {
                    chain: format!("node {index}"),
                    source,
                })
        });
    }

    let mut chain_height = 0;
    let mut node_heights = vec![0; nodes.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(join_failure).and_then(|sample| sample)? {
            (None, height) => chain_height = height,
            (Some(index), height) => node_heights[index] = height,
        }
    }

    match node_heights
        .iter()
        .enumerate()
        .find(|(_, height)| **height < chain_height)
    {
        Some((node, &node_height)) => Err(WaitError::NotInSync {
            node,
            node_height,
            chain_height,
        }),
        None => Ok(()),
    }
}

/// Blocks until every node height is at least the chain height.
///
/// Uses [`WaitConfig::default`] timing. See [`wait_for_in_sync_with_config`].
///
/// # Panics
/// Panics if `nodes` is empty.
///
/// # Errors
/// Returns [`WaitError::Cancelled`] once `cancel` fires.
pub async fn wait_for_in_sync<C, N>(
    cancel: &CancellationToken,
    chain: &Arc<C>,
    nodes: &[Arc<N>],
) -> Result<(), WaitError>
where
    C: Heighter + ?Sized + 'static,
    N: Heighter + ?Sized + 'static,
{
    wait_for_in_sync_with_config(cancel, chain, nodes, &WaitConfig::default()).await
}

/// Blocks until every node height is at least the chain height.
///
/// A round that fails, including one where a height cannot be read, counts as
/// "not yet in sync" and is retried after
/// [`WaitConfig::sync_round_interval`]. Nodes are expected to drop in and out
/// while catching up.
///
/// # Panics
/// Panics if `nodes` is empty.
///
/// # Errors
/// Returns [`WaitError::Cancelled`] once `cancel` fires.
pub async fn wait_for_in_sync_with_config<C, N>(
    cancel: &CancellationToken,
    chain: &Arc<C>,
    nodes: &[Arc<N>],
    config: &WaitConfig,
) -> Result<(), WaitError>
where
    C: Heighter + ?Sized + 'static,
    N: Heighter + ?Sized + 'static,
{
    assert!(!nodes.is_empty(), "missing nodes");

    let round_interval = config.sync_round_interval();
    let mut rounds: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        rounds += 1;

        let round = tokio::select! {
            _ = cancel.cancelled() => return Err(WaitError::Cancelled),
            res = nodes_in_sync(chain, nodes) => res,
        };

        match round {
            Ok(()) => {
                info!(nodes = nodes.len(), rounds, "Nodes in sync");
                return Ok(());
            }
            Err(e) => debug!(round = rounds, error = %e, "Nodes not yet in sync"),
        }

        if !round_interval.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(WaitError::Cancelled),
                _ = tokio::time::sleep(round_interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ictest_domain::{ChainError, ChainResult};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    struct Fixed(u64);

    #[async_trait]
    impl Heighter for Fixed {
        async fn height(&self) -> ChainResult<u64> {
            Ok(self.0)
        }
    }

    /// Replays a script of results, repeating the last one.
    struct Scripted {
        script: Mutex<Vec<ChainResult<u64>>>,
    }

    impl Scripted {
        fn new(script: Vec<ChainResult<u64>>) -> Self {
            Self {
                script: Mutex::new(script),
            }
        }
    }

    #[async_trait]
    impl Heighter for Scripted {
        async fn height(&self) -> ChainResult<u64> {
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            }
        }
    }

    /// Catches up by one block per call.
    struct CatchingUp {
        height: AtomicU64,
    }

    #[async_trait]
    impl Heighter for CatchingUp {
        async fn height(&self) -> ChainResult<u64> {
            Ok(self.height.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn fast() -> WaitConfig {
        WaitConfig {
            sync_round_interval_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_nodes_in_sync() {
        let chain = Arc::new(Fixed(10));
        let nodes = vec![Arc::new(Fixed(10)), Arc::new(Fixed(12))];

        nodes_in_sync(&chain, &nodes).await.unwrap();
    }

    #[tokio::test]
    async fn test_node_behind() {
        let chain = Arc::new(Fixed(10));
        let nodes = vec![Arc::new(Fixed(11)), Arc::new(Fixed(9))];

        let err = nodes_in_sync(&chain, &nodes).await.unwrap_err();

        assert_eq!(
            err,
            WaitError::NotInSync {
                node: 1,
                node_height: 9,
                chain_height: 10,
            }
        );
        assert_eq!(err.to_string(), "node 1 is not yet in sync: 9 < 10");
    }

    #[tokio::test]
    async fn test_nodes_in_sync_height_error() {
        let chain = Arc::new(Scripted::new(vec![Err(ChainError::Rpc("down".to_string()))]));
        let nodes = vec![Arc::new(Fixed(1))];

        let err = nodes_in_sync(&chain, &nodes).await.unwrap_err();

        assert!(matches!(err, WaitError::Height { ref chain, .. } if chain == "chain"));
    }

    #[tokio::test]
    async fn test_wait_for_in_sync_tolerates_errors() {
        let chain = Arc::new(Fixed(5));
        let nodes: Vec<Arc<dyn Heighter>> = vec![
            Arc::new(Scripted::new(vec![
                Err(ChainError::Rpc("starting".to_string())),
                Ok(2),
                Err(ChainError::Rpc("restarting".to_string())),
                Ok(5),
            ])),
            Arc::new(CatchingUp {
                height: AtomicU64::new(1),
            }),
        ];

        wait_for_in_sync_with_config(&CancellationToken::new(), &chain, &nodes, &fast())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_in_sync_cancelled() {
        let chain = Arc::new(Fixed(100));
        let nodes = vec![Arc::new(Fixed(1))];
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = wait_for_in_sync(&cancel, &chain, &nodes).await.unwrap_err();

        assert_eq!(err, WaitError::Cancelled);
    }

    #[tokio::test]
    #[should_panic(expected = "missing nodes")]
    async fn test_wait_for_in_sync_requires_nodes() {
        let nodes: Vec<Arc<Fixed>> = Vec::new();
        let _ = wait_for_in_sync(&CancellationToken::new(), &Arc::new(Fixed(1)), &nodes).await;
    }
}
