use crate::config::AppConfig;
use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::jobs::price_ingestion_job;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

// Context passed to job functions
#[derive(Clone)]
pub struct JobContext {
    pub pool: SqlitePool,
    pub price_provider: Arc<dyn PriceProvider>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug)]
pub struct JobResult {
    pub items_processed: usize,
}

pub struct JobSchedulerService {
    scheduler: JobScheduler,
    context: JobContext,
}

impl JobSchedulerService {
    pub async fn new(
        pool: SqlitePool,
        price_provider: Arc<dyn PriceProvider>,
        config: Arc<AppConfig>,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            context: JobContext { pool, price_provider, config },
        })
    }

    /// Register the ingestion job on `schedule` (sec min hour day month weekday) and start ticking.
    pub async fn start(&mut self, schedule: &str) -> Result<(), AppError> {
        info!("🚀 Starting job scheduler...");

        self.schedule_job(
            schedule,
            "price_ingestion",
            price_ingestion_job::run,
        ).await?;

        self.scheduler.start()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start scheduler: {}", e)))?;

        Ok(())
    }

    async fn schedule_job<F, Fut>(
        &mut self,
        schedule: &str,
        job_name: &'static str,
        job_fn: F,
    ) -> Result<(), AppError>
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<JobResult, AppError>> + Send + 'static,
    {
        let context = self.context.clone();
        let job_fn = Arc::new(job_fn);
        // One run at a time; a tick that lands on a running job is skipped
        let running = Arc::new(Mutex::new(()));

        let job = Job::new_async(schedule, move |_uuid, _l| {
            let context = context.clone();
            let job_fn = job_fn.clone();
            let running = running.clone();
            Box::pin(async move {
                let Ok(_guard) = running.try_lock() else {
                    warn!("⏭️ Skipping {}: previous run still in progress", job_name);
                    return;
                };
                execute_job_with_tracking(job_name, context, job_fn).await;
            })
        })
        .map_err(|e| AppError::Config(format!("Invalid schedule for {} ({}): {}", job_name, schedule, e)))?;

        self.scheduler.add(job)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to add job {}: {}", job_name, e)))?;

        info!("📅 Scheduled: {} [cron: {}]", job_name, schedule);
        Ok(())
    }
}

async fn execute_job_with_tracking<F, Fut>(
    job_name: &str,
    context: JobContext,
    job_fn: Arc<F>,
) where
    F: Fn(JobContext) -> Fut,
    Fut: std::future::Future<Output = Result<JobResult, AppError>>,
{
    info!("🏃 Starting job: {}", job_name);
    let started_at = Utc::now();

    let result = job_fn(context).await;

    let duration_ms = (Utc::now() - started_at).num_milliseconds();

    match result {
        Ok(job_result) => {
            info!(
                "✅ Job completed: {} (processed: {}, duration: {}ms)",
                job_name, job_result.items_processed, duration_ms
            );
        }
        Err(e) => {
            error!("❌ Job failed: {} - {} (duration: {}ms)", job_name, e, duration_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mock::MockProvider;

    async fn service() -> (tempfile::TempDir, JobSchedulerService) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::for_database(dir.path().join("jobs.db"));
        let pool = crate::db::connect(&config.database_path).await.unwrap();
        let service = JobSchedulerService::new(pool, Arc::new(MockProvider::default()), Arc::new(config))
            .await
            .unwrap();
        (dir, service)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejects_invalid_cron_expression() {
        let (_dir, mut service) = service().await;

        let err = service.start("every night").await.unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
    }
}
