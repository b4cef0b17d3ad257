use axum::{Json, Router};
use axum::routing::get;
use tracing::info;

use crate::models::PortfolioResponse;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_portfolio))
}

pub async fn get_portfolio() -> Json<PortfolioResponse> {
    info!("GET /portfolio - Placeholder portfolio");
    Json(services::portfolio_service::get_portfolio())
}
