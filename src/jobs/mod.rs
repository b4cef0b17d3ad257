//! Background Jobs Module
//!
//! Jobs run by the job scheduler service inside the API process. The
//! standalone `ingest` binary calls the same services directly.
//!
//! # Available Jobs
//!
//! - `price_ingestion_job` - Fetches the configured instrument and replaces the stored series

pub mod price_ingestion_job;
