use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;
use crate::external::price_provider::{Interval, Lookback};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(format!("Invalid PRICE_PROVIDER: {}. Must be 'yahoo' or 'mock'", other)),
        }
    }
}

/// Runtime settings shared by the API server and the ingestion job.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub ticker: String,
    pub lookback: Lookback,
    pub interval: Interval,
    pub provider: ProviderKind,
    pub fetch_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    /// Let an empty fetch wipe the stored series instead of failing.
    pub allow_empty_overwrite: bool,
    /// Six-field cron expression; when set the API server runs ingestion itself.
    pub ingestion_schedule: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_path: PathBuf::from(get("DATABASE_PATH", "data/db/portfolio.db")),
            bind_addr: parse("BIND_ADDR", &get("BIND_ADDR", "0.0.0.0:8000"))?,
            ticker: get("INGEST_TICKER", "URTH"),
            lookback: parse("INGEST_LOOKBACK", &get("INGEST_LOOKBACK", "1mo"))?,
            interval: parse("INGEST_INTERVAL", &get("INGEST_INTERVAL", "1d"))?,
            provider: parse("PRICE_PROVIDER", &get("PRICE_PROVIDER", "yahoo"))?,
            fetch_timeout: Duration::from_secs(parse("FETCH_TIMEOUT_SECS", &get("FETCH_TIMEOUT_SECS", "30"))?),
            max_retries: parse("FETCH_MAX_RETRIES", &get("FETCH_MAX_RETRIES", "3"))?,
            retry_base_delay: Duration::from_millis(parse("FETCH_RETRY_BASE_MS", &get("FETCH_RETRY_BASE_MS", "500"))?),
            allow_empty_overwrite: parse("ALLOW_EMPTY_OVERWRITE", &get("ALLOW_EMPTY_OVERWRITE", "false"))?,
            ingestion_schedule: lookup("INGESTION_SCHEDULE").filter(|s| !s.trim().is_empty()),
        })
    }

    /// Defaults pointed at `path`, used by tests and tools.
    pub fn for_database(path: impl AsRef<Path>) -> Self {
        Self {
            database_path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/db/portfolio.db"),
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8000)),
            ticker: "URTH".to_string(),
            lookback: Lookback::ONE_MONTH,
            interval: Interval::DAILY,
            provider: ProviderKind::Yahoo,
            fetch_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            allow_empty_overwrite: false,
            ingestion_schedule: None,
        }
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{}={}: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_demo_setup() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_path, PathBuf::from("data/db/portfolio.db"));
        assert_eq!(config.ticker, "URTH");
        assert_eq!(config.lookback.as_str(), "1mo");
        assert_eq!(config.interval.as_str(), "1d");
        assert_eq!(config.provider, ProviderKind::Yahoo);
        assert_eq!(config.max_retries, 3);
        assert!(!config.allow_empty_overwrite);
        assert!(config.ingestion_schedule.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("DATABASE_PATH", "/tmp/prices.db"),
            ("INGEST_TICKER", "SPY"),
            ("INGEST_LOOKBACK", "6mo"),
            ("PRICE_PROVIDER", "Mock"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("ALLOW_EMPTY_OVERWRITE", "true"),
            ("INGESTION_SCHEDULE", "0 0 2 * * *"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/prices.db"));
        assert_eq!(config.ticker, "SPY");
        assert_eq!(config.lookback.as_str(), "6mo");
        assert_eq!(config.provider, ProviderKind::Mock);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert!(config.allow_empty_overwrite);
        assert_eq!(config.ingestion_schedule.as_deref(), Some("0 0 2 * * *"));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = config_from(&[("INGEST_INTERVAL", "1 day")]).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("INGEST_INTERVAL")));

        assert!(config_from(&[("FETCH_MAX_RETRIES", "-1")]).is_err());
        assert!(config_from(&[("PRICE_PROVIDER", "bloomberg")]).is_err());
    }

    #[test]
    fn empty_environment_yields_the_default_config() {
        assert_eq!(config_from(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn for_database_only_changes_the_path() {
        let config = AppConfig::for_database("/tmp/x.db");
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.ticker, "URTH");
    }
}
