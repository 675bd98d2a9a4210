//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod market;
pub mod quote;
pub mod risk;
pub mod signal;
pub mod strategy;

pub use indicators::{IndicatorState, LinePoint, MaFilterValue, RsiValue, StochRsiValue};
pub use market::{PriceBar, PriceWindow};
pub use quote::{QuoteLevel, QuoteSet, QuoteSide};
pub use risk::{ExitReason, ExitRequest, PositionSide, RiskLevels};
pub use signal::{CrossoverType, Signal, SignalAction, SignalState};
pub use strategy::{MaFilterType, MarketMakingConfig, StrategyConfig, StrategyMode};
