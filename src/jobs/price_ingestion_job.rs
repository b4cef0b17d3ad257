//! Price Ingestion Background Job
//!
//! Runs on the cron expression in `INGESTION_SCHEDULE` (for example
//! `0 0 22 * * 1-5` for weekday evenings after the close).
//!
//! # Error Handling
//!
//! - Transient fetch faults are retried with backoff inside the service
//! - An empty fetch fails the run and leaves the stored series untouched
//! - Failures are logged by the scheduler and never stop later runs

use std::process::ExitCode;

use crate::config::AppConfig;
use crate::db;
use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::services::ingestion_service::{self, IngestionReport};
use crate::services::job_scheduler_service::{JobContext, JobResult};
use tracing::{error, info};

pub async fn run(ctx: JobContext) -> Result<JobResult, AppError> {
    let report = ingestion_service::run_ingestion(
        &ctx.pool,
        ctx.price_provider.as_ref(),
        &ctx.config,
    ).await?;

    info!("Scheduled ingestion of {} completed at {}", report.ticker, report.completed_at);

    Ok(JobResult {
        items_processed: report.rows_written,
    })
}

/// One-shot run for the `ingest` binary: opens its own pool and closes it
/// before returning.
pub async fn run_standalone(
    config: &AppConfig,
    provider: &dyn PriceProvider,
) -> Result<IngestionReport, AppError> {
    let pool = db::connect(&config.database_path).await.map_err(|e| {
        error!("Failed to open {}: {}", config.database_path.display(), e);
        AppError::StorageUnavailable(e)
    })?;

    let outcome = ingestion_service::run_ingestion(&pool, provider, config).await;
    pool.close().await;
    outcome
}

pub fn completion_message(report: &IngestionReport) -> String {
    format!(
        "Data ingestion completed at {}",
        report.completed_at.format("%Y-%m-%d %H:%M:%S%.6f")
    )
}

/// Report the outcome and turn it into the process exit status.
pub fn exit_code(outcome: &Result<IngestionReport, AppError>) -> ExitCode {
    match outcome {
        Ok(report) => {
            println!("{}", completion_message(report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ Data ingestion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
