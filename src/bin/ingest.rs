//! Standalone ingestion job: fetch the configured instrument, normalize it and
//! replace the stored series. Exits non-zero on any failure.

use std::process::ExitCode;

use quantportfolio_backend::config::AppConfig;
use quantportfolio_backend::errors::AppError;
use quantportfolio_backend::external;
use quantportfolio_backend::jobs::price_ingestion_job;
use quantportfolio_backend::logging::{self, LoggingConfig};
use quantportfolio_backend::services::ingestion_service::IngestionReport;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    if let Err(e) = logging::init_logging(LoggingConfig::for_service("quantportfolio-ingest")) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    price_ingestion_job::exit_code(&run().await)
}

async fn run() -> Result<IngestionReport, AppError> {
    let config = AppConfig::from_env()?;
    let provider = external::build_provider(&config)?;
    price_ingestion_job::run_standalone(&config, provider.as_ref()).await
}
