use async_trait::async_trait;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::external::price_provider::{Interval, Lookback, PriceProvider, PriceProviderError, RawBar};

/// Offline provider producing a random walk of daily closes ending today.
///
/// Weekends are skipped and every bar is stamped at midnight regardless of the
/// requested interval.
pub struct MockProvider {
    start_price: f64,
}

impl MockProvider {
    pub fn new(start_price: f64) -> Self {
        Self { start_price }
    }

    fn generate(&self, today: NaiveDate, days: i64) -> Vec<RawBar> {
        let mut current = self.start_price;
        let mut out = Vec::new();

        for offset in (0..days).rev() {
            let date = today - ChronoDuration::days(offset);
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            current *= 1.0 + (rand::random::<f64>() - 0.5) * 0.02;
            out.push(RawBar::close_only(date.and_time(NaiveTime::default()), current));
        }

        out
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        lookback: &Lookback,
        _interval: &Interval,
    ) -> Result<Vec<RawBar>, PriceProviderError> {
        let today = Utc::now().date_naive();
        let bars = self.generate(today, lookback.approx_days(today));
        if bars.is_empty() {
            return Err(PriceProviderError::NoData(ticker.to_string()));
        }
        Ok(bars)
    }
}
