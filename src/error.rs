//! Error taxonomy for the decision core.
//!
//! Only configuration faults are fatal. Every data or timing fault degrades to
//! "skip this tick, keep prior safe state".

use crate::indicators::IndicatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Carries `IndicatorError::InsufficientHistory` among others.
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error("invalid risk parameter: stop loss percent {0} must be in (0, 100)")]
    InvalidRiskParameter(f64),

    #[error("price data unavailable for {asset}: {reason}")]
    DataUnavailable { asset: String, reason: String },

    #[error("quote replacement for {asset} partially failed: {reason}")]
    StaleQuoteRaceCondition { asset: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("execution gateway error: {0}")]
    Gateway(String),
}

impl EngineError {
    pub fn data_unavailable(asset: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            asset: asset.to_string(),
            reason: reason.into(),
        }
    }

    pub fn stale_quotes(asset: &str, reason: impl Into<String>) -> Self {
        Self::StaleQuoteRaceCondition {
            asset: asset.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_insufficient_history(&self) -> bool {
        matches!(
            self,
            Self::Indicator(IndicatorError::InsufficientHistory { .. })
        )
    }

    /// Whether the tick loop may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidRiskParameter(_) | Self::InvalidConfig(_)
        )
    }
}
