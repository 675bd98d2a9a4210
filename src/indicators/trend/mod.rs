//! Trend indicators: EMA, SMA, WMA

pub mod ema;
pub mod moving_average;

pub use ema::*;
pub use moving_average::*;
