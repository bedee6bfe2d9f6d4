//! Command Line Interface for the interchain test sync engine.
mod config;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::harness_config_from_env;
use dotenv::dotenv;
use ictest_domain::WalletAmount;
use ictest_execution::config::HarnessConfig;
use ictest_execution::error::WaitError;
use ictest_execution::poll::poll_for_balance_with_config;
use ictest_execution::simulated::{SimulatedChain, SimulatedPushChain};
use ictest_execution::submission::TxSubmitter;
use ictest_execution::sync::{BlockIngestor, event_channel};
use ictest_execution::wait::{wait_for_blocks_with_config, wait_for_in_sync_with_config};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "ictest")]
#[command(about = "Block height sync and tx notification smoke runs on simulated chains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for several chains to each advance by a block delta
    WaitBlocks {
        /// Starting height of every chain
        #[arg(short, long, default_value_t = 10)]
        start: u64,

        /// Blocks each chain must produce
        #[arg(short, long, default_value_t = 3)]
        delta: u64,

        /// Number of chains
        #[arg(short, long, default_value_t = 2)]
        chains: usize,

        /// Block time of the first chain, later chains are progressively slower
        #[arg(long, default_value_t = 200)]
        block_time_ms: u64,
    },
    /// Wait for lagging nodes to catch up with a chain
    InSync {
        /// Number of nodes
        #[arg(short, long, default_value_t = 3)]
        nodes: usize,

        /// Blocks each node starts behind the chain
        #[arg(short, long, default_value_t = 5)]
        lag: u64,

        /// Chain block time
        #[arg(long, default_value_t = 200)]
        block_time_ms: u64,

        /// Give up after this many seconds
        #[arg(short, long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Send serialized transfers from one key and wait for each to land
    Send {
        /// Signer key name
        #[arg(short, long, default_value = "faucet")]
        key: String,

        /// Recipient address
        #[arg(long, default_value = "addr_test1")]
        to: String,

        /// Denomination
        #[arg(long, default_value = "lovelace")]
        denom: String,

        /// Amount per transfer
        #[arg(short, long, default_value = "1000000")]
        amount: Decimal,

        /// Number of transfers
        #[arg(short, long, default_value_t = 3)]
        count: u32,

        /// Chain block time
        #[arg(long, default_value_t = 100)]
        block_time_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = harness_config_from_env()?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling");
                cancel.cancel();
            }
        });
    }

    let outcome = match cli.command {
        Commands::WaitBlocks {
            start,
            delta,
            chains,
            block_time_ms,
        } => wait_blocks(&cancel, &config, start, delta, chains, block_time_ms).await,
        Commands::InSync {
            nodes,
            lag,
            block_time_ms,
            timeout_secs,
        } => in_sync(&cancel, &config, nodes, lag, block_time_ms, timeout_secs).await,
        Commands::Send {
            key,
            to,
            denom,
            amount,
            count,
            block_time_ms,
        } => {
            let amount = WalletAmount::new(to, denom, amount);
            send(&cancel, &config, &key, &amount, count, block_time_ms).await
        }
    };

    cancel.cancel();
    outcome
}

async fn wait_blocks(
    cancel: &CancellationToken,
    config: &HarnessConfig,
    start: u64,
    delta: u64,
    chains: usize,
    block_time_ms: u64,
) -> Result<()> {
    if chains == 0 {
        bail!("at least one chain is required");
    }
    if block_time_ms == 0 {
        bail!("block time must be positive");
    }

    let chains: Vec<Arc<SimulatedChain>> = (0..chains)
        .map(|i| {
            let block_time = Duration::from_millis(block_time_ms * (i as u64 + 1));
            Arc::new(SimulatedChain::new(format!("chain-{i}"), start, block_time))
        })
        .collect();
    for chain in &chains {
        chain.spawn(cancel.child_token());
    }

    println!(
        "⏳ Waiting for {} chains to advance {} blocks...",
        chains.len(),
        delta
    );
    let started = Instant::now();
    let trackers = wait_for_blocks_with_config(cancel, delta, &chains, &config.wait).await?;

    println!("✅ Done in {:.2?}", started.elapsed());
    println!("{:<10} | {:<10} | {:<10}", "Chain", "Start", "Current");
    println!("{}", "-".repeat(36));
    for (chain, tracker) in chains.iter().zip(&trackers) {
        println!(
            "{:<10} | {:<10} | {:<10}",
            chain.name(),
            tracker.starting(),
            tracker.current()
        );
    }
    Ok(())
}

async fn in_sync(
    cancel: &CancellationToken,
    config: &HarnessConfig,
    nodes: usize,
    lag: u64,
    block_time_ms: u64,
    timeout_secs: u64,
) -> Result<()> {
    if nodes == 0 {
        bail!("at least one node is required");
    }
    if block_time_ms < 2 {
        bail!("block time must be at least 2ms");
    }

    let block_time = Duration::from_millis(block_time_ms);
    let start = lag + 1;
    let chain = Arc::new(SimulatedChain::new("chain", start, block_time));
    chain.spawn(cancel.child_token());

    // Nodes produce twice as fast as the chain until they catch up.
    let nodes: Vec<Arc<SimulatedChain>> = (0..nodes)
        .map(|i| {
            Arc::new(SimulatedChain::new(
                format!("node-{i}"),
                start.saturating_sub(lag),
                block_time / 2,
            ))
        })
        .collect();
    for node in &nodes {
        node.spawn(cancel.child_token());
    }

    let deadline = cancel.child_token();
    {
        let deadline = deadline.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
            deadline.cancel();
        });
    }

    println!("⏳ Waiting for {} nodes to catch up...", nodes.len());
    let started = Instant::now();
    match wait_for_in_sync_with_config(&deadline, &chain, &nodes, &config.wait).await {
        Ok(()) => {}
        Err(WaitError::Cancelled) if !cancel.is_cancelled() => {
            bail!("nodes not in sync after {timeout_secs}s")
        }
        Err(e) => return Err(e.into()),
    }

    println!(
        "✅ Nodes in sync at chain height {} after {:.2?}",
        chain.current(),
        started.elapsed()
    );
    Ok(())
}

async fn send(
    cancel: &CancellationToken,
    config: &HarnessConfig,
    key: &str,
    amount: &WalletAmount,
    count: u32,
    block_time_ms: u64,
) -> Result<()> {
    if block_time_ms == 0 {
        bail!("block time must be positive");
    }

    let (events_tx, events_rx) = event_channel(&config.ingest);
    let chain = Arc::new(SimulatedPushChain::new(
        Duration::from_millis(block_time_ms),
        events_tx,
    ));
    let ingestor = Arc::new(BlockIngestor::with_config(&config.ingest));

    let ingest = {
        let ingestor = Arc::clone(&ingestor);
        let cancel = cancel.child_token();
        tokio::spawn(async move { ingestor.run(events_rx, cancel).await })
    };
    chain.spawn(cancel.child_token());

    let submitter = TxSubmitter::with_config(
        Arc::clone(&chain),
        Arc::clone(ingestor.waiters()),
        config.submit.clone(),
    );

    println!("📤 Sending {count} transfers from {key}...");
    for i in 0..count {
        let inclusion = submitter
            .send_funds_with_note(key, amount, &format!("ictest transfer {i}"))
            .await
            .with_context(|| format!("transfer {i} failed"))?;
        println!(
            "  {} landed in block {} (slot {})",
            inclusion.tx_hash, inclusion.block_number, inclusion.slot_number
        );
    }

    let expected = amount.with_amount(amount.amount * Decimal::from(count));
    poll_for_balance_with_config(chain.as_ref(), 2, &expected, &config.poll)
        .await
        .context("recipient balance mismatch")?;

    println!(
        "✅ {} now holds {} {} at height {}",
        expected.address,
        expected.amount,
        expected.denom,
        chain.current()
    );

    cancel.cancel();
    ingest.await?;
    Ok(())
}
