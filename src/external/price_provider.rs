use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

/// One row of an upstream price series.
///
/// `timestamp` is in the exchange's local time. Only `close` is required
/// downstream; the other columns are carried as the upstream reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub timestamp: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl RawBar {
    pub fn close_only(timestamp: NaiveDateTime, close: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

const LOOKBACKS: &[&str] = &["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"];
const INTERVALS: &[&str] = &["1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo"];
const DAILY_OR_COARSER: &[&str] = &["1d", "5d", "1wk", "1mo", "3mo"];

/// How far back a fetch reaches, e.g. `1mo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookback(&'static str);

impl Lookback {
    pub const ONE_MONTH: Lookback = Lookback("1mo");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Rough calendar-day span, used where a provider has no native notion of ranges.
    pub fn approx_days(&self, today: chrono::NaiveDate) -> i64 {
        use chrono::Datelike;
        match self.0 {
            "1d" => 1,
            "5d" => 5,
            "1mo" => 30,
            "3mo" => 91,
            "6mo" => 182,
            "1y" => 365,
            "2y" => 730,
            "5y" => 1826,
            "ytd" => i64::from(today.ordinal()),
            _ => 3652,
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LOOKBACKS
            .iter()
            .copied()
            .find(|v| *v == s)
            .map(Lookback)
            .ok_or_else(|| format!("unsupported lookback '{}', expected one of {}", s, LOOKBACKS.join(", ")))
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Sampling interval of a series, e.g. `1d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval(&'static str);

impl Interval {
    pub const DAILY: Interval = Interval("1d");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_daily_or_coarser(&self) -> bool {
        DAILY_OR_COARSER.contains(&self.0)
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        INTERVALS
            .iter()
            .copied()
            .find(|v| *v == s)
            .map(Interval)
            .ok_or_else(|| format!("unsupported interval '{}', expected one of {}", s, INTERVALS.join(", ")))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited")]
    RateLimited,

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("no price data returned for {0}")]
    NoData(String),
}

impl PriceProviderError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PriceProviderError::Network(_) | PriceProviderError::Timeout | PriceProviderError::RateLimited
        )
    }
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch the series for `ticker`, ascending by timestamp.
    async fn fetch_history(
        &self,
        ticker: &str,
        lookback: &Lookback,
        interval: &Interval,
    ) -> Result<Vec<RawBar>, PriceProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_known_ranges_and_intervals() {
        assert_eq!("1mo".parse::<Lookback>().unwrap().as_str(), "1mo");
        assert_eq!("1d".parse::<Interval>().unwrap().as_str(), "1d");
        assert!("1 month".parse::<Lookback>().is_err());
        assert!("7d".parse::<Interval>().is_err());
    }

    #[test]
    fn daily_or_coarser_intervals() {
        assert!("1d".parse::<Interval>().unwrap().is_daily_or_coarser());
        assert!("1wk".parse::<Interval>().unwrap().is_daily_or_coarser());
        assert!(!"1h".parse::<Interval>().unwrap().is_daily_or_coarser());
        assert!(!"15m".parse::<Interval>().unwrap().is_daily_or_coarser());
    }

    #[test]
    fn ytd_span_follows_the_calendar() {
        let lookback: Lookback = "ytd".parse().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(lookback.approx_days(today), 41);
    }

    #[test]
    fn only_network_faults_are_transient() {
        assert!(PriceProviderError::Timeout.is_transient());
        assert!(PriceProviderError::RateLimited.is_transient());
        assert!(PriceProviderError::Network("reset".into()).is_transient());
        assert!(!PriceProviderError::NotFound("XYZ".into()).is_transient());
        assert!(!PriceProviderError::NoData("XYZ".into()).is_transient());
    }
}
