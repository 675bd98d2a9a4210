use crate::indicators::IndicatorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar as produced by the data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar with every price field set to `close`.
    pub fn flat(close: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(close, close, close, close, 0.0, timestamp)
    }
}

/// Ascending run of bars for a single asset, owned by the tick that fetched it.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    bars: Vec<PriceBar>,
}

impl PriceWindow {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, IndicatorError> {
        if let Some(index) = bars
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(IndicatorError::OutOfOrder(index + 1));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}
