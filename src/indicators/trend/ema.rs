//! EMA (Exponential Moving Average) indicator and crossover detection

use crate::common::math;
use crate::models::indicators::LinePoint;
use crate::models::market::PriceBar;
use crate::models::signal::CrossoverType;

/// Streaming EMA: accumulates an SMA seed over the first `period` prices,
/// then applies the recurrence once per price.
#[derive(Debug, Clone)]
pub struct ExponentialAverage {
    period: usize,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
    previous: Option<f64>,
}

impl ExponentialAverage {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            seed_sum: 0.0,
            seen: 0,
            value: None,
            previous: None,
        }
    }

    pub fn update(&mut self, price: f64) -> Option<f64> {
        self.seen += 1;
        match self.value {
            Some(current) => {
                self.previous = Some(current);
                self.value = Some(math::ema_from_previous(price, current, self.period));
            }
            None => {
                self.seed_sum += price;
                if self.seen == self.period {
                    self.value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Current and previous values once at least two EMA points exist.
    pub fn line(&self) -> Option<LinePoint> {
        Some(LinePoint {
            current: self.value?,
            previous: self.previous?,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Calculate the EMA of bar closes for a specific period
pub fn calculate_ema(bars: &[PriceBar], period: u32) -> Option<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    math::ema(&closes, period as usize)
}

/// Stream `closes` through an EMA and return its last two values.
pub fn ema_line(closes: &[f64], period: usize) -> Option<LinePoint> {
    let mut ema = ExponentialAverage::new(period);
    for close in closes {
        ema.update(*close);
    }
    ema.line()
}

/// Bullish when fast moves from at-or-below slow to above it; bearish mirrored.
pub fn detect_crossover(fast: &LinePoint, slow: &LinePoint) -> CrossoverType {
    if fast.previous <= slow.previous && fast.current > slow.current {
        CrossoverType::Bullish
    } else if fast.previous >= slow.previous && fast.current < slow.current {
        CrossoverType::Bearish
    } else {
        CrossoverType::None
    }
}
