//! Acknowledgement and timeout searches for IBC packets.

use super::BlockPoller;
use crate::config::PollConfig;
use crate::error::PollError;
use ictest_domain::{
    ChainAcker, ChainError, ChainTimeouter, Packet, PacketAcknowledgement, PacketTimeout,
};
use parking_lot::Mutex;
use std::fmt;

/// A failed packet search.
///
/// `Display` prints the underlying poll error. The alternate form (`{:#}`)
/// also prints the target packet and every entry searched, which is what a
/// failing test wants in its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketPollError {
    source: PollError,
    target: Packet,
    searched: Vec<String>,
}

impl PacketPollError {
    /// The underlying poll failure.
    pub fn poll_error(&self) -> &PollError {
        &self.source
    }

    pub fn target(&self) -> &Packet {
        &self.target
    }

    /// Debug renderings of every acknowledgement or timeout inspected.
    pub fn searched(&self) -> &[String] {
        &self.searched
    }
}

impl fmt::Display for PacketPollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(f, "{}", self.source);
        }

        let searched = if self.searched.is_empty() {
            "(none)".to_string()
        } else {
            self.searched.join("\n")
        };
        write!(
            f,
            "{}\n- target packet:\n{:#?}\n- searched:\n{}",
            self.source, self.target, searched
        )
    }
}

impl std::error::Error for PacketPollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Finds the acknowledgement of `packet` within `start_height..=max_height`.
///
/// Safe to call before the chain has produced the window: polling waits for
/// the heights to exist.
///
/// # Errors
/// Returns an error if no matching acknowledgement is found or the chain
/// height cannot be read.
pub async fn poll_for_ack<C>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    packet: &Packet,
) -> Result<PacketAcknowledgement, PacketPollError>
where
    C: ChainAcker + ?Sized,
{
    poll_for_ack_with_config(chain, start_height, max_height, packet, &PollConfig::default()).await
}

/// [`poll_for_ack`] with an explicit [`PollConfig`].
///
/// # Errors
/// See [`poll_for_ack`].
pub async fn poll_for_ack_with_config<C>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    packet: &Packet,
    config: &PollConfig,
) -> Result<PacketAcknowledgement, PacketPollError>
where
    C: ChainAcker + ?Sized,
{
    let searched = Mutex::new(Vec::new());
    let result = {
        let searched = &searched;
        let poller = BlockPoller::for_chain(chain, move |height| async move {
            let acks = chain.acknowledgements(height).await?;
            let mut log = Vec::with_capacity(acks.len());
            let mut found = None;
            for ack in acks {
                log.push(format!("{ack:#?}"));
                if ack.packet == *packet {
                    found = Some(ack);
                    break;
                }
            }
            searched.lock().append(&mut log);
            found.ok_or_else(|| ChainError::not_found(format!("ack at height {height}")))
        })
        .with_config(config.clone());
        poller.do_poll(start_height, max_height).await
    };

    result.map_err(|source| PacketPollError {
        source,
        target: packet.clone(),
        searched: searched.into_inner(),
    })
}

/// Finds the timeout of `packet` within `start_height..=max_height`.
///
/// Otherwise works like [`poll_for_ack`].
///
/// # Errors
/// Returns an error if no matching timeout is found or the chain height
/// cannot be read.
pub async fn poll_for_timeout<C>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    packet: &Packet,
) -> Result<PacketTimeout, PacketPollError>
where
    C: ChainTimeouter + ?Sized,
{
    poll_for_timeout_with_config(chain, start_height, max_height, packet, &PollConfig::default())
        .await
}

/// [`poll_for_timeout`] with an explicit [`PollConfig`].
///
/// # Errors
/// See [`poll_for_timeout`].
pub async fn poll_for_timeout_with_config<C>(
    chain: &C,
    start_height: u64,
    max_height: u64,
    packet: &Packet,
    config: &PollConfig,
) -> Result<PacketTimeout, PacketPollError>
where
    C: ChainTimeouter + ?Sized,
{
    let searched = Mutex::new(Vec::new());
    let result = {
        let searched = &searched;
        let poller = BlockPoller::for_chain(chain, move |height| async move {
            let timeouts = chain.timeouts(height).await?;
            let mut log = Vec::with_capacity(timeouts.len());
            let mut found = None;
            for timeout in timeouts {
                log.push(format!("{timeout:#?}"));
                if timeout.packet == *packet {
                    found = Some(timeout);
                    break;
                }
            }
            searched.lock().append(&mut log);
            found.ok_or_else(|| ChainError::not_found(format!("timeout at height {height}")))
        })
        .with_config(config.clone());
        poller.do_poll(start_height, max_height).await
    };

    result.map_err(|source| PacketPollError {
        source,
        target: packet.clone(),
        searched: searched.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ictest_domain::{ChainResult, Heighter};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct MockChain {
        height_err: Option<ChainError>,
        height_call_count: AtomicU64,
        current_height: AtomicU64,

        got_heights: Mutex<Vec<u64>>,

        found_acks: Vec<PacketAcknowledgement>,
        ack_err: Option<ChainError>,

        found_timeouts: Vec<PacketTimeout>,
        timeout_err: Option<ChainError>,
    }

    impl MockChain {
        fn at_height(height: u64) -> Self {
            Self {
                current_height: AtomicU64::new(height),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl Heighter for MockChain {
        async fn height(&self) -> ChainResult<u64> {
            self.height_call_count.fetch_add(1, Ordering::SeqCst);
            let height = self.current_height.fetch_add(1, Ordering::SeqCst);
            match &self.height_err {
                Some(e) => Err(e.clone()),
                None => Ok(height),
            }
        }
    }

    #[async_trait]
    impl ChainAcker for MockChain {
        async fn acknowledgements(&self, height: u64) -> ChainResult<Vec<PacketAcknowledgement>> {
            self.got_heights.lock().push(height);
            match &self.ack_err {
                Some(e) => Err(e.clone()),
                None => Ok(self.found_acks.clone()),
            }
        }
    }

    #[async_trait]
    impl ChainTimeouter for MockChain {
        async fn timeouts(&self, height: u64) -> ChainResult<Vec<PacketTimeout>> {
            self.got_heights.lock().push(height);
            match &self.timeout_err {
                Some(e) => Err(e.clone()),
                None => Ok(self.found_timeouts.clone()),
            }
        }
    }

    fn packet(sequence: u64, channel: &str) -> Packet {
        Packet {
            sequence,
            source_channel: channel.to_string(),
            ..Default::default()
        }
    }

    fn ack(sequence: u64, channel: &str) -> PacketAcknowledgement {
        PacketAcknowledgement {
            packet: packet(sequence, channel),
            acknowledgement: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_poll_for_ack_happy_path() {
        let chain = MockChain {
            found_acks: vec![ack(44, "other"), ack(33, "found"), ack(33, "ignore")],
            ..MockChain::at_height(1)
        };

        let got = poll_for_ack(&chain, 3, 5, &packet(33, "found")).await.unwrap();

        assert_eq!(got.packet.source_channel, "found");
        assert_eq!(got.packet.sequence, 33);
        assert_eq!(*chain.got_heights.lock(), vec![3]);
        assert_eq!(chain.height_call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_for_ack_height_error() {
        let chain = MockChain {
            height_err: Some(ChainError::Rpc("height go boom".to_string())),
            ..Default::default()
        };

        let err = poll_for_ack(&chain, 3, 5, &packet(1, "any")).await.unwrap_err();

        assert_eq!(err.to_string(), "RPC error: height go boom");
        assert!(matches!(err.poll_error(), PollError::Height(_)));
        assert!(chain.got_heights.lock().is_empty());
    }

    #[tokio::test]
    async fn test_poll_for_ack_find_error() {
        let chain = MockChain {
            ack_err: Some(ChainError::Rpc("ack go boom".to_string())),
            ..MockChain::at_height(1)
        };

        let err = poll_for_ack(&chain, 3, 5, &packet(1, "any")).await.unwrap_err();

        assert_eq!(
            err.poll_error(),
            &PollError::NotFound {
                start: 3,
                max: 5,
                last: ChainError::Rpc("ack go boom".to_string()),
            }
        );
        assert_eq!(*chain.got_heights.lock(), vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn test_poll_for_ack_not_found_reports_search() {
        let chain = MockChain {
            found_acks: vec![ack(1, "channel-1"), ack(2, "channel-2")],
            ..MockChain::at_height(10)
        };

        let err = poll_for_ack(&chain, 1, 3, &packet(3, "channel-3"))
            .await
            .unwrap_err();

        assert!(matches!(err.poll_error(), PollError::NotFound { .. }));
        // Two acks searched at each of three heights.
        assert_eq!(err.searched().len(), 6);
        assert_eq!(err.target(), &packet(3, "channel-3"));

        let detailed = format!("{err:#}");
        assert!(detailed.contains("- target packet:"));
        assert!(detailed.contains("channel-3"));
        assert!(detailed.contains("channel-2"));
        assert!(!format!("{err}").contains("- searched:"));
    }

    #[tokio::test]
    async fn test_poll_for_ack_empty_search_prints_none() {
        let chain = MockChain::at_height(10);

        let err = poll_for_ack(&chain, 4, 4, &packet(3, "channel-3"))
            .await
            .unwrap_err();

        assert!(format!("{err:#}").ends_with("- searched:\n(none)"));
    }

    #[tokio::test]
    async fn test_poll_for_ack_uses_configured_retry_interval() {
        // Height grows by one per read, so reaching the window takes
        // thousands of retries: instant with no delay, minutes with the default.
        let chain = MockChain {
            found_acks: vec![ack(7, "found")],
            ..MockChain::at_height(1)
        };
        let config = PollConfig {
            retry_interval_ms: 0,
        };

        let got = tokio::time::timeout(
            Duration::from_secs(5),
            poll_for_ack_with_config(&chain, 5_000, 5_000, &packet(7, "found"), &config),
        )
        .await
        .expect("configured retry interval not applied")
        .unwrap();

        assert_eq!(got.packet.sequence, 7);
        assert_eq!(*chain.got_heights.lock(), vec![5_000]);
        assert!(chain.height_call_count.load(Ordering::SeqCst) >= 5_000);
    }

    #[tokio::test]
    async fn test_poll_for_timeout_with_config_finds_timeout() {
        let chain = MockChain {
            found_timeouts: vec![PacketTimeout {
                packet: packet(3, "found"),
            }],
            ..MockChain::at_height(1)
        };
        let config = PollConfig {
            retry_interval_ms: 0,
        };

        let got = tokio::time::timeout(
            Duration::from_secs(5),
            poll_for_timeout_with_config(&chain, 3_000, 3_001, &packet(3, "found"), &config),
        )
        .await
        .expect("configured retry interval not applied")
        .unwrap();

        assert_eq!(got.packet.sequence, 3);
    }

    #[tokio::test]
    async fn test_poll_for_timeout_happy_path() {
        let chain = MockChain {
            found_timeouts: vec![
                PacketTimeout {
                    packet: packet(1, "other"),
                },
                PacketTimeout {
                    packet: packet(2, "found"),
                },
            ],
            ..MockChain::at_height(1)
        };

        let got = poll_for_timeout(&chain, 3, 5, &packet(2, "found"))
            .await
            .unwrap();

        assert_eq!(got.packet.sequence, 2);
        assert_eq!(*chain.got_heights.lock(), vec![3]);
    }

    #[tokio::test]
    async fn test_poll_for_timeout_find_error() {
        let chain = MockChain {
            timeout_err: Some(ChainError::Rpc("timeout go boom".to_string())),
            ..MockChain::at_height(1)
        };

        let err = poll_for_timeout(&chain, 3, 5, &packet(1, "any"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timeout go boom"));
        assert_eq!(*chain.got_heights.lock(), vec![3, 4, 5]);
    }
}
