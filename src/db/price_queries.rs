use sqlx::SqlitePool;
use tracing::{error, info};

use crate::models::PricePoint;

/// Create the `prices` table if it does not exist yet. Safe to call repeatedly.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prices (
            date VARCHAR,
            price DOUBLE
        )
        "#,
    )
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace the whole table with `points`.
///
/// Delete and inserts share one transaction: readers see either the old or the
/// new series, and a failure part-way leaves the old series in place.
pub async fn replace_all(
    pool: &SqlitePool,
    points: &[PricePoint],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await.map_err(|e| {
        error!("Failed to begin price replace transaction: {}", e);
        e
    })?;

    let removed = sqlx::query("DELETE FROM prices")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for (i, p) in points.iter().enumerate() {
        if let Err(e) = sqlx::query("INSERT INTO prices (date, price) VALUES (?, ?)")
            .bind(p.date.as_str())
            .bind(p.price)
            .execute(&mut *tx)
            .await {
            error!("Failed to insert price point {} (date: {}, price: {}): {}", i, p.date, p.price, e);
            return Err(e);
        }
    }

    tx.commit().await.map_err(|e| {
        error!("Failed to commit price replace transaction: {}", e);
        e
    })?;

    info!("Replaced {} stored prices with {}", removed, points.len());
    Ok(())
}

/// All stored prices, oldest first.
pub async fn read_all_ordered(pool: &SqlitePool) -> Result<Vec<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        "SELECT date, price
         FROM prices
         ORDER BY date ASC",
    )
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM prices")
        .fetch_one(pool)
        .await
}
