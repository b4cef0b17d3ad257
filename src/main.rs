use std::sync::Arc;

use anyhow::Context;
use quantportfolio_backend::config::AppConfig;
use quantportfolio_backend::logging::{self, LoggingConfig};
use quantportfolio_backend::services::job_scheduler_service::JobSchedulerService;
use quantportfolio_backend::state::AppState;
use quantportfolio_backend::{app, db, external};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = Arc::new(AppConfig::from_env()?);

    let pool = db::connect(&config.database_path)
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    db::price_queries::ensure_schema(&pool).await?;

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = match &config.ingestion_schedule {
        Some(schedule) => {
            let provider = external::build_provider(&config)?;
            let mut scheduler = JobSchedulerService::new(pool.clone(), provider, config.clone()).await?;
            scheduler.start(schedule).await?;
            Some(scheduler)
        }
        None => {
            info!("INGESTION_SCHEDULE not set, run the ingest binary to refresh prices");
            None
        }
    };

    let app = app::create_app(AppState { pool });

    warn!("CORS allows any origin, method and header");

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("🚀 QuantPortfolio API running at http://{}/", config.bind_addr);
    axum::serve(listener, app)
        .await?;

    Ok(())
}
