//! Environment-driven engine configuration.

use anyhow::{Context, Result, bail};
use ictest_domain::RollbackPolicy;
use ictest_execution::config::HarnessConfig;
use std::env;
use std::str::FromStr;

/// Builds the engine configuration from `ICTEST_*` variables, falling back to
/// defaults for anything unset.
pub fn harness_config_from_env() -> Result<HarnessConfig> {
    let mut config = HarnessConfig::default();

    if let Some(ms) = var::<u64>("ICTEST_POLL_RETRY_MS")? {
        config.poll.retry_interval_ms = ms;
    }
    if let Some(ms) = var::<u64>("ICTEST_HEIGHT_INTERVAL_MS")? {
        config.wait.height_interval_ms = ms;
    }
    if let Some(ms) = var::<u64>("ICTEST_SYNC_ROUND_MS")? {
        config.wait.sync_round_interval_ms = ms;
    }
    if let Some(secs) = var::<u64>("ICTEST_INCLUSION_TIMEOUT_SECS")? {
        config.submit.inclusion_timeout_secs = secs;
    }
    if let Some(size) = var::<usize>("ICTEST_EVENT_CHANNEL_SIZE")? {
        config.ingest.channel_size = size;
    }
    if let Some(max) = var::<u64>("ICTEST_MAX_BACKFILL")? {
        config.ingest.max_backfill = max;
    }
    if let Ok(policy) = env::var("ICTEST_ROLLBACK_POLICY") {
        config.ingest.rollback_policy = parse_rollback_policy(&policy)?;
    }

    Ok(config)
}

fn var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(None),
    }
}

fn parse_rollback_policy(raw: &str) -> Result<RollbackPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ignore" => Ok(RollbackPolicy::Ignore),
        "truncate" => Ok(RollbackPolicy::Truncate),
        other => bail!("invalid ICTEST_ROLLBACK_POLICY {other:?}, expected ignore or truncate"),
    }
}
