//! Stochastic RSI
//!
//! stoch = 100 * (RSI - min(RSI, n)) / (max(RSI, n) - min(RSI, n)),
//! K = SMA(stoch, k), D = SMA(K, d). A flat RSI window reads 50.

use crate::common::math;
use crate::indicators::momentum::rsi::rsi_series;
use crate::models::indicators::StochRsiValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StochRsiParams {
    pub rsi_length: u32,
    pub stoch_length: u32,
    pub k: u32,
    pub d: u32,
}

impl StochRsiParams {
    /// Bars needed for two consecutive K/D readings.
    pub fn required_bars(&self) -> usize {
        (self.rsi_length + self.stoch_length + self.k + self.d) as usize - 1
    }
}

pub fn stochastic_series(rsi_values: &[f64], stoch_length: usize) -> Vec<f64> {
    if stoch_length == 0 || rsi_values.len() < stoch_length {
        return Vec::new();
    }
    rsi_values
        .windows(stoch_length)
        .map(|window| {
            let highest = window.iter().cloned().fold(f64::MIN, f64::max);
            let lowest = window.iter().cloned().fold(f64::MAX, f64::min);
            let last = window[window.len() - 1];
            if highest == lowest {
                50.0
            } else {
                100.0 * (last - lowest) / (highest - lowest)
            }
        })
        .collect()
}

pub fn calculate_stoch_rsi(closes: &[f64], params: &StochRsiParams) -> Option<StochRsiValue> {
    if closes.len() < params.required_bars() {
        return None;
    }
    let rsi: Vec<f64> = rsi_series(closes, params.rsi_length)
        .into_iter()
        .map(|r| r.value)
        .collect();
    let stoch = stochastic_series(&rsi, params.stoch_length as usize);
    let k_line = math::sma_series(&stoch, params.k as usize);
    let d_line = math::sma_series(&k_line, params.d as usize);
    if d_line.len() < 2 {
        return None;
    }
    Some(StochRsiValue {
        k: k_line[k_line.len() - 1],
        d: d_line[d_line.len() - 1],
        prev_k: k_line[k_line.len() - 2],
        prev_d: d_line[d_line.len() - 2],
    })
}
