use chrono::{DateTime, Local};
use sqlx::SqlitePool;
use tokio::time::{sleep as async_sleep, timeout, Duration};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::db;
use crate::errors::AppError;
use crate::external::price_provider::{Interval, Lookback, PriceProvider, PriceProviderError, RawBar};
use crate::services::normalizer;

#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub ticker: String,
    pub rows_written: usize,
    pub completed_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay,
            attempt_timeout: config.fetch_timeout,
        }
    }

    /// Delay before retry number `attempt` (1-based): base, 2x base, 4x base...
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Fetch with a per-attempt timeout, retrying transient faults with exponential backoff.
///
/// `NoData` comes back as an empty series so the empty-result policy lives in
/// `run_ingestion` alone.
pub async fn fetch_with_retry(
    provider: &dyn PriceProvider,
    ticker: &str,
    lookback: &Lookback,
    interval: &Interval,
    policy: RetryPolicy,
) -> Result<Vec<RawBar>, AppError> {
    let mut retry_count = 0;

    loop {
        let attempt = timeout(policy.attempt_timeout, provider.fetch_history(ticker, lookback, interval))
            .await
            .unwrap_or(Err(PriceProviderError::Timeout));

        match attempt {
            Ok(bars) => return Ok(bars),
            // An empty window is a result, not a fault; the caller decides what to do with it
            Err(PriceProviderError::NoData(_)) => {
                warn!("Upstream returned no rows for {}", ticker);
                return Ok(Vec::new());
            }
            Err(e) if e.is_transient() && retry_count < policy.max_retries => {
                retry_count += 1;
                let delay = policy.delay_for(retry_count);
                warn!("Fetch for {} failed ({}), retrying in {}ms (attempt {}/{})",
                      ticker, e, delay.as_millis(), retry_count, policy.max_retries);
                async_sleep(delay).await;
            }
            Err(e) => {
                error!("✗ Failed to fetch price data for {}: {}", ticker, e);
                return Err(AppError::DataUnavailable(format!("{}: {}", ticker, e)));
            }
        }
    }
}

/// Fetch, normalize and store the configured instrument's series.
///
/// An empty result never overwrites stored data unless
/// `allow_empty_overwrite` is set.
pub async fn run_ingestion(
    pool: &SqlitePool,
    provider: &dyn PriceProvider,
    config: &AppConfig,
) -> Result<IngestionReport, AppError> {
    let ticker = config.ticker.as_str();
    info!("Starting ingestion for {} (range {}, interval {})", ticker, config.lookback, config.interval);

    let bars = fetch_with_retry(
        provider,
        ticker,
        &config.lookback,
        &config.interval,
        RetryPolicy::from_config(config),
    ).await?;

    let points = normalizer::normalize(&bars);

    if points.is_empty() && !config.allow_empty_overwrite {
        warn!("Fetch for {} returned no rows, keeping stored prices", ticker);
        return Err(AppError::DataUnavailable(format!("{}: upstream returned no rows", ticker)));
    }

    db::price_queries::ensure_schema(pool).await?;
    db::price_queries::replace_all(pool, &points).await
        .map_err(|e| {
            error!("Failed to store prices for {}: {}", ticker, e);
            AppError::StorageUnavailable(e)
        })?;

    info!("✓ Stored {} prices for {}", points.len(), ticker);

    Ok(IngestionReport {
        ticker: ticker.to_string(),
        rows_written: points.len(),
        completed_at: Local::now(),
    })
}
