use axum::extract::State;
use axum::{
    Json, Router,
    routing::get,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::errors::AppError;
use crate::services;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub stored_prices: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

pub async fn root() -> Json<Value> {
    info!("GET / - Root");
    Json(json!({ "message": "QuantPortfolio API is running" }))
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthReport>, AppError> {
    info!("GET /health - Health check");
    let stored_prices = services::price_service::stored_count(&state.pool).await
        .map_err(|e| {
            error!("Health check failed: {}", e);
            e
        })?;
    Ok(Json(HealthReport {
        status: "ok",
        database: "ok",
        stored_prices,
    }))
}
