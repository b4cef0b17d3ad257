use std::time::Duration;

use crate::external::price_provider::{Interval, Lookback, PriceProvider, PriceProviderError, RawBar};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(timeout: Duration) -> Result<Self, PriceProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, PriceProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Turn a chart response into bars in exchange-local time.
fn parse_chart(
    ticker: &str,
    interval: &Interval,
    body: YahooChartResponse,
) -> Result<Vec<RawBar>, PriceProviderError> {
    if let Some(err) = body.chart.error {
        return Err(if err.code == "Not Found" {
            PriceProviderError::NotFound(ticker.to_string())
        } else {
            PriceProviderError::BadResponse(format!("{}: {}", err.code, err.description))
        });
    }

    let result = body.chart.result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| PriceProviderError::BadResponse("missing result".into()))?;

    // Yahoo omits timestamps entirely when the window has no trading days
    let Some(timestamps) = result.timestamp else {
        return Err(PriceProviderError::NoData(ticker.to_string()));
    };

    let quote = result.indicators.quote
        .into_iter()
        .next()
        .ok_or_else(|| PriceProviderError::BadResponse("missing quote".into()))?;

    let mut out = Vec::with_capacity(timestamps.len());

    for (i, ts) in timestamps.iter().enumerate() {
        // skip missing closes
        let Some(close) = quote.close.get(i).copied().flatten() else { continue };

        let local = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .ok_or_else(|| PriceProviderError::Parse(format!("bad timestamp: {}", ts)))?
            .naive_utc();

        let timestamp: NaiveDateTime = if interval.is_daily_or_coarser() {
            local.date().and_time(NaiveTime::default())
        } else {
            local
        };

        out.push(RawBar {
            timestamp,
            open: quote.open.get(i).copied().flatten(),
            high: quote.high.get(i).copied().flatten(),
            low: quote.low.get(i).copied().flatten(),
            close,
            volume: quote.volume.get(i).copied().flatten(),
        });
    }

    if out.is_empty() {
        return Err(PriceProviderError::NoData(ticker.to_string()));
    }

    // Ensure ascending by timestamp
    out.sort_by_key(|b| b.timestamp);

    Ok(out)
}

#[async_trait]
impl PriceProvider for YahooProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        lookback: &Lookback,
        interval: &Interval,
    ) -> Result<Vec<RawBar>, PriceProviderError> {
        let resp = self.client
            .get(self.chart_url(ticker))
            .query(&[("range", lookback.as_str()), ("interval", interval.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PriceProviderError::Timeout
                } else {
                    PriceProviderError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        // Gateway and overload errors clear up on their own
        if status.is_server_error() {
            return Err(PriceProviderError::Network(format!("HTTP {}", status)));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        // Unknown symbols come back as 404 with a chart error body
        let body: YahooChartResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                PriceProviderError::Parse(e.to_string())
            } else {
                PriceProviderError::BadResponse(format!("HTTP {}", status))
            }
        })?;

        parse_chart(ticker, interval, body)
    }
}
