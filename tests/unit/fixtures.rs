//! Shared price series for unit tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use quotrix::models::market::PriceBar;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Five-minute bars with every price field at the given close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| PriceBar::flat(*close, base_time() + Duration::minutes(5 * i as i64)))
        .collect()
}

/// 205 flat bars at 100, a 25-bar climb of +1 per bar, then a decline of
/// `fall` per bar up to 260 bars.
pub fn rise_then_fall(fall: f64) -> Vec<f64> {
    let mut closes = vec![100.0; 205];
    closes.extend((1..=25).map(|i| 100.0 + i as f64));
    let mut last = 125.0;
    while closes.len() < 260 {
        last -= fall;
        closes.push(last);
    }
    closes
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
