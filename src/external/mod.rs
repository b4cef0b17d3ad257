pub mod mock;
pub mod price_provider;
pub mod yahoo;

use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, ProviderKind};
use crate::errors::AppError;
use crate::external::mock::MockProvider;
use crate::external::price_provider::PriceProvider;
use crate::external::yahoo::YahooProvider;

/// Build the provider selected by `PRICE_PROVIDER`.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn PriceProvider>, AppError> {
    let provider: Arc<dyn PriceProvider> = match config.provider {
        ProviderKind::Yahoo => {
            info!("📊 Using price provider: Yahoo Finance");
            Arc::new(YahooProvider::new(config.fetch_timeout)
                .map_err(|e| AppError::Config(format!("Failed to create YahooProvider: {}", e)))?)
        }
        ProviderKind::Mock => {
            info!("📊 Using price provider: mock random walk (offline)");
            Arc::new(MockProvider::default())
        }
    };
    Ok(provider)
}
