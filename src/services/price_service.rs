use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::AppError;
use crate::models::PricePoint;

pub async fn get_prices(pool: &SqlitePool) -> Result<Vec<PricePoint>, AppError> {
    db::price_queries::read_all_ordered(pool).await
        .map_err(|e| {
            error!("Failed to read stored prices: {}", e);
            AppError::StorageUnavailable(e)
        })
}

pub async fn stored_count(pool: &SqlitePool) -> Result<i64, AppError> {
    db::price_queries::count(pool).await
        .map_err(|e| {
            error!("Failed to count stored prices: {}", e);
            AppError::StorageUnavailable(e)
        })
}
