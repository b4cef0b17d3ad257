use chrono::{NaiveDateTime, NaiveTime};

use crate::external::price_provider::RawBar;
use crate::models::PricePoint;

/// Reshape a raw series into (date, price) rows.
///
/// One output row per input row, same order. Nothing is filtered, deduplicated
/// or gap-filled: duplicate timestamps stay duplicate rows.
pub fn normalize(bars: &[RawBar]) -> Vec<PricePoint> {
    bars.iter()
        .map(|bar| PricePoint::new(render_timestamp(&bar.timestamp), bar.close))
        .collect()
}

/// `YYYY-MM-DD` for midnight timestamps, `YYYY-MM-DD HH:MM:SS` otherwise.
pub fn render_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == NaiveTime::default() {
        ts.date().format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
