//! Typed message searches over block transactions.

use super::BlockPoller;
use crate::config::PollConfig;
use crate::error::PollError;
use ictest_domain::{BlockMessages, ChainError};

/// Searches every transaction message in `start_height..=max_height`.
///
/// `extract` selects messages of the wanted kind; `predicate` decides whether
/// a selected message is the one being waited for. The first accepted message
/// at the lowest height is returned.
///
/// # Errors
/// Returns an error if no message is accepted within the window or the chain
/// height cannot be read.
pub async fn poll_for_message<C, T, E, P>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    extract: E,
    predicate: P,
) -> Result<T, PollError>
where
    C: BlockMessages + ?Sized,
    T: Send,
    E: Fn(C::Message) -> Option<T> + Send + Sync,
    P: Fn(&T) -> bool + Send + Sync,
{
    poll_for_message_with_config(
        chain,
        start_height,
        max_height,
        extract,
        predicate,
        &PollConfig::default(),
    )
    .await
}

/// [`poll_for_message`] with an explicit [`PollConfig`].
///
/// # Errors
/// See [`poll_for_message`].
pub async fn poll_for_message_with_config<C, T, E, P>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    extract: E,
    predicate: P,
    config: &PollConfig,
) -> Result<T, PollError>
where
    C: BlockMessages + ?Sized,
    T: Send,
    E: Fn(C::Message) -> Option<T> + Send + Sync,
    P: Fn(&T) -> bool + Send + Sync,
{
    let extract = &extract;
    let predicate = &predicate;
    let poller = BlockPoller::for_chain(chain, move |height| async move {
        let messages = chain.messages(height).await?;
        messages
            .into_iter()
            .filter_map(extract)
            .find(|found| predicate(found))
            .ok_or_else(|| ChainError::not_found(format!("message at height {height}")))
    })
    .with_config(config.clone());
    poller.do_poll(start_height, max_height).await
}

/// Returns the first message of the kind selected by `extract`.
///
/// # Errors
/// See [`poll_for_message`].
pub async fn poll_for_first_message<C, T, E>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    extract: E,
) -> Result<T, PollError>
where
    C: BlockMessages + ?Sized,
    T: Send,
    E: Fn(C::Message) -> Option<T> + Send + Sync,
{
    poll_for_message(chain, start_height, max_height, extract, |_: &T| true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ictest_domain::{ChainResult, Heighter};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Send { to: String, amount: u64 },
        Vote { proposal: u64 },
    }

    struct MockChain {
        height: u64,
        blocks: HashMap<u64, Vec<Msg>>,
    }

    #[async_trait]
    impl Heighter for MockChain {
        async fn height(&self) -> ChainResult<u64> {
            Ok(self.height)
        }
    }

    #[async_trait]
    impl BlockMessages for MockChain {
        type Message = Msg;

        async fn messages(&self, height: u64) -> ChainResult<Vec<Msg>> {
            Ok(self.blocks.get(&height).cloned().unwrap_or_default())
        }
    }

    fn chain() -> MockChain {
        let mut blocks = HashMap::new();
        blocks.insert(
            2,
            vec![Msg::Send {
                to: "alice".to_string(),
                amount: 5,
            }],
        );
        blocks.insert(3, vec![Msg::Vote { proposal: 1 }]);
        blocks.insert(
            4,
            vec![
                Msg::Vote { proposal: 2 },
                Msg::Send {
                    to: "bob".to_string(),
                    amount: 9,
                },
            ],
        );
        MockChain { height: 10, blocks }
    }

    fn as_vote(msg: Msg) -> Option<u64> {
        match msg {
            Msg::Vote { proposal } => Some(proposal),
            _ => None,
        }
    }

    fn as_send(msg: Msg) -> Option<(String, u64)> {
        match msg {
            Msg::Send { to, amount } => Some((to, amount)),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_first_message_of_kind() {
        let chain = chain();

        let proposal = poll_for_first_message(&chain, 1, 10, as_vote).await.unwrap();

        assert_eq!(proposal, 1);
    }

    #[tokio::test]
    async fn test_predicate_skips_non_matching() {
        let chain = chain();

        let (to, amount) = poll_for_message(&chain, 1, 10, as_send, |(to, _)| to == "bob")
            .await
            .unwrap();

        assert_eq!(to, "bob");
        assert_eq!(amount, 9);
    }

    /// Produces one empty block per height read, starting from nothing.
    struct GrowingChain {
        height: AtomicU64,
    }

    #[async_trait]
    impl Heighter for GrowingChain {
        async fn height(&self) -> ChainResult<u64> {
            Ok(self.height.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl BlockMessages for GrowingChain {
        type Message = Msg;

        async fn messages(&self, height: u64) -> ChainResult<Vec<Msg>> {
            Ok(vec![Msg::Vote { proposal: height }])
        }
    }

    #[tokio::test]
    async fn test_message_search_uses_configured_retry_interval() {
        let chain = GrowingChain {
            height: AtomicU64::new(0),
        };
        let config = PollConfig {
            retry_interval_ms: 0,
        };

        let proposal = tokio::time::timeout(
            Duration::from_secs(5),
            poll_for_message_with_config(&chain, 4_000, 4_000, as_vote, |_| true, &config),
        )
        .await
        .expect("configured retry interval not applied")
        .unwrap();

        assert_eq!(proposal, 4_000);
    }

    #[tokio::test]
    async fn test_message_not_found() {
        let chain = chain();

        let err = poll_for_message(&chain, 5, 7, as_vote, |_| true)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::NotFound { start: 5, max: 7, .. }));
    }
}
