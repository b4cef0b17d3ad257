pub mod ingestion_service;
pub mod job_scheduler_service;
pub mod normalizer;
pub mod portfolio_service;
pub mod price_service;
