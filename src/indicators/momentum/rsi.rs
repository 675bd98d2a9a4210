//! RSI (Relative Strength Index) with Wilder smoothing
//!
//! RSI = 100 - (100 / (1 + RS)), RS = average gain / average loss.
//! The first averages are simple means over `period` changes; after that
//! `avg = (avg * (period - 1) + change) / period`.

use crate::models::indicators::RsiValue;

#[derive(Debug, Clone)]
pub struct WilderRsi {
    period: usize,
    prev_close: Option<f64>,
    changes: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl WilderRsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            changes: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<RsiValue> {
        let prev = match self.prev_close.replace(close) {
            Some(prev) => prev,
            None => return None,
        };
        let change = close - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        self.changes += 1;

        let p = self.period as f64;
        if self.changes <= self.period {
            // Seed phase: accumulate, then divide once the window is full.
            self.avg_gain += gain;
            self.avg_loss += loss;
            if self.changes < self.period {
                return None;
            }
            self.avg_gain /= p;
            self.avg_loss /= p;
        } else {
            self.avg_gain = (self.avg_gain * (p - 1.0) + gain) / p;
            self.avg_loss = (self.avg_loss * (p - 1.0) + loss) / p;
        }

        Some(RsiValue {
            value: rsi_from_averages(self.avg_gain, self.avg_loss),
            avg_gain: self.avg_gain,
            avg_loss: self.avg_loss,
            period: self.period as u32,
        })
    }
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Every RSI value over `closes`; the first corresponds to `closes[period]`.
pub fn rsi_series(closes: &[f64], period: u32) -> Vec<RsiValue> {
    if period == 0 {
        return Vec::new();
    }
    let mut rsi = WilderRsi::new(period as usize);
    closes.iter().filter_map(|c| rsi.update(*c)).collect()
}

/// Latest RSI over `closes`, if `closes` holds at least `period + 1` values.
pub fn calculate_rsi(closes: &[f64], period: u32) -> Option<RsiValue> {
    rsi_series(closes, period).last().copied()
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> Option<RsiValue> {
    calculate_rsi(closes, 14)
}
