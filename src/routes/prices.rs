use axum::extract::State;
use axum::{Json, Router};
use axum::routing::get;
use tracing::{info, error};

use crate::errors::AppError;
use crate::models::PricePoint;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_prices))
}

pub async fn get_prices(
    State(state): State<AppState>
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!("GET /prices - Getting stored price series");
    let prices = services::price_service::get_prices(&state.pool).await
        .map_err(|e| {
            error!("Failed to get stored prices: {}", e);
            e
        })?;
    Ok(Json(prices))
}
