//! Momentum indicators: RSI, Stochastic RSI

pub mod rsi;
pub mod stoch_rsi;

pub use rsi::*;
pub use stoch_rsi::*;
