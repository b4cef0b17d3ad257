//! Yahoo provider driven against a local stand-in for the chart endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use quantportfolio_backend::config::AppConfig;
use quantportfolio_backend::db::{self, price_queries};
use quantportfolio_backend::errors::AppError;
use quantportfolio_backend::external::yahoo::YahooProvider;
use quantportfolio_backend::models::PricePoint;
use quantportfolio_backend::services::ingestion_service;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// A window with no trading days: Yahoo leaves out `timestamp` entirely.
const EMPTY_CHART: &str = r#"{"chart":{"result":[{
    "meta":{"gmtoffset":-18000},
    "indicators":{"quote":[{}]}
}],"error":null}}"#;

const TWO_DAY_CHART: &str = r#"{"chart":{"result":[{
    "meta":{"gmtoffset":-18000},
    "timestamp":[1704205800,1704292200],
    "indicators":{"quote":[{"close":[130.9,131.4]}]}
}],"error":null}}"#;

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: &'static str,
    hits: Arc<AtomicUsize>,
}

async fn chart(State(upstream): State<Upstream>) -> (StatusCode, &'static str) {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    (upstream.status, upstream.body)
}

/// Serve a fixed chart response on an ephemeral port; returns the base URL and hit counter.
async fn spawn_upstream(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v8/finance/chart/:ticker", get(chart))
        .with_state(Upstream { status, body, hits: hits.clone() });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

async fn setup() -> (TempDir, SqlitePool, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::for_database(dir.path().join("portfolio.db"));
    config.retry_base_delay = Duration::from_millis(1);
    config.fetch_timeout = Duration::from_secs(5);
    let pool = db::connect(&config.database_path).await.unwrap();
    (dir, pool, config)
}

async fn seed(pool: &SqlitePool) {
    price_queries::ensure_schema(pool).await.unwrap();
    price_queries::replace_all(
        pool,
        &[PricePoint::new("2024-01-01", 100.0), PricePoint::new("2024-01-02", 101.0)],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn server_errors_are_retried_up_to_the_limit() {
    let (_dir, pool, mut config) = setup().await;
    config.max_retries = 3;
    seed(&pool).await;
    let (base_url, hits) = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, "").await;
    let provider = YahooProvider::with_base_url(&base_url, config.fetch_timeout).unwrap();

    let err = ingestion_service::run_ingestion(&pool, &provider, &config).await.unwrap_err();

    assert!(matches!(err, AppError::DataUnavailable(msg) if msg.contains("503")));
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_eq!(price_queries::count(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn successful_chart_is_stored_by_trading_day() {
    let (_dir, pool, config) = setup().await;
    let (base_url, hits) = spawn_upstream(StatusCode::OK, TWO_DAY_CHART).await;
    let provider = YahooProvider::with_base_url(&base_url, config.fetch_timeout).unwrap();

    let report = ingestion_service::run_ingestion(&pool, &provider, &config).await.unwrap();

    assert_eq!(report.rows_written, 2);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        price_queries::read_all_ordered(&pool).await.unwrap(),
        vec![PricePoint::new("2024-01-02", 130.9), PricePoint::new("2024-01-03", 131.4)]
    );
}

#[tokio::test]
async fn empty_chart_keeps_stored_rows_by_default() {
    let (_dir, pool, config) = setup().await;
    seed(&pool).await;
    let (base_url, hits) = spawn_upstream(StatusCode::OK, EMPTY_CHART).await;
    let provider = YahooProvider::with_base_url(&base_url, config.fetch_timeout).unwrap();

    let err = ingestion_service::run_ingestion(&pool, &provider, &config).await.unwrap_err();

    assert!(matches!(err, AppError::DataUnavailable(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(price_queries::count(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn empty_chart_clears_table_when_overwrite_is_allowed() {
    let (_dir, pool, mut config) = setup().await;
    config.allow_empty_overwrite = true;
    seed(&pool).await;
    let (base_url, _hits) = spawn_upstream(StatusCode::OK, EMPTY_CHART).await;
    let provider = YahooProvider::with_base_url(&base_url, config.fetch_timeout).unwrap();

    let report = ingestion_service::run_ingestion(&pool, &provider, &config).await.unwrap();

    assert_eq!(report.rows_written, 0);
    assert_eq!(price_queries::count(&pool).await.unwrap(), 0);
}
