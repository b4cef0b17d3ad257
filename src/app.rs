use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{health, portfolio, prices};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // FIXME: wide-open CORS for the local frontend; restrict origins before deploying
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .route("/", get(health::root))
        .nest("/health", health::router())
        .nest("/prices", prices::router())
        .nest("/portfolio", portfolio::router())
        .layer(cors)
        .with_state(state)
}
