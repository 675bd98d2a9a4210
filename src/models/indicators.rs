use crate::models::strategy::MaFilterType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current and previous-bar value of a line, enough to detect a crossover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub current: f64,
    pub previous: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaFilterValue {
    pub value: f64,
    pub kind: MaFilterType,
    pub period: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsiValue {
    pub k: f64,
    pub d: f64,
    pub prev_k: f64,
    pub prev_d: f64,
}

impl StochRsiValue {
    pub fn crossed_above(&self) -> bool {
        self.prev_k <= self.prev_d && self.k > self.d
    }

    pub fn crossed_below(&self) -> bool {
        self.prev_k >= self.prev_d && self.k < self.d
    }
}

/// Wilder RSI with the smoothed averages needed to continue the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiValue {
    pub value: f64,
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub period: u32,
}

/// Per-asset indicator snapshot produced once per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorState {
    pub asset: String,
    pub close: f64,
    pub timestamp: DateTime<Utc>,
    pub fast_ema: LinePoint,
    pub slow_ema: LinePoint,
    pub fast_period: u32,
    pub slow_period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_filter: Option<MaFilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoch_rsi: Option<StochRsiValue>,
    pub bars_used: usize,
}

impl IndicatorState {
    pub fn new(
        asset: String,
        close: f64,
        timestamp: DateTime<Utc>,
        fast_ema: LinePoint,
        slow_ema: LinePoint,
    ) -> Self {
        Self {
            asset,
            close,
            timestamp,
            fast_ema,
            slow_ema,
            fast_period: 0,
            slow_period: 0,
            ma_filter: None,
            rsi: None,
            stoch_rsi: None,
            bars_used: 0,
        }
    }

    pub fn with_periods(mut self, fast: u32, slow: u32) -> Self {
        self.fast_period = fast;
        self.slow_period = slow;
        self
    }

    pub fn with_ma_filter(mut self, ma_filter: MaFilterValue) -> Self {
        self.ma_filter = Some(ma_filter);
        self
    }

    pub fn with_rsi(mut self, rsi: RsiValue) -> Self {
        self.rsi = Some(rsi);
        self
    }

    pub fn with_stoch_rsi(mut self, stoch_rsi: StochRsiValue) -> Self {
        self.stoch_rsi = Some(stoch_rsi);
        self
    }

    pub fn with_bars_used(mut self, bars_used: usize) -> Self {
        self.bars_used = bars_used;
        self
    }
}
