//! SMA / WMA and the configurable trend-filter average

use crate::common::math;
use crate::models::strategy::MaFilterType;

pub fn calculate_sma(closes: &[f64], period: u32) -> Option<f64> {
    math::sma(closes, period as usize)
}

pub fn calculate_wma(closes: &[f64], period: u32) -> Option<f64> {
    math::wma(closes, period as usize)
}

/// Trend-filter value for `kind`; `None` when disabled or short of data.
pub fn calculate_ma(closes: &[f64], kind: MaFilterType, period: u32) -> Option<f64> {
    match kind {
        MaFilterType::Ema => math::ema(closes, period as usize),
        MaFilterType::Sma => calculate_sma(closes, period),
        MaFilterType::Wma => calculate_wma(closes, period),
        MaFilterType::None => None,
    }
}
