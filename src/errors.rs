use axum::response::{IntoResponse, Json};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(sqlx::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::DataUnavailable(_) => "data_unavailable",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::Config(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DataUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // sqlx details stay in the logs
        let message = match &self {
            AppError::StorageUnavailable(_) => "The price store is currently unavailable".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let body = ErrorBody { error: self.kind(), message };
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::StorageUnavailable(value)
    }
}

impl From<PriceProviderError> for AppError {
    fn from(value: PriceProviderError) -> Self {
        AppError::DataUnavailable(value.to_string())
    }
}
