//! Strategy and market-making parameter objects.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trend filter moving-average flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaFilterType {
    #[serde(rename = "EMA")]
    Ema,
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "WMA")]
    Wma,
    None,
}

impl MaFilterType {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for MaFilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ema => "EMA",
            Self::Sma => "SMA",
            Self::Wma => "WMA",
            Self::None => "None",
        };
        f.write_str(name)
    }
}

impl FromStr for MaFilterType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EMA" => Ok(Self::Ema),
            "SMA" => Ok(Self::Sma),
            "WMA" => Ok(Self::Wma),
            "NONE" | "" => Ok(Self::None),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown MA filter type '{}'",
                other
            ))),
        }
    }
}

/// Whether the directional signal drives execution alone or is handed to an
/// advisory collaborator together with a context summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyMode {
    Standalone,
    Hybrid,
}

impl FromStr for StrategyMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standalone" => Ok(Self::Standalone),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown strategy mode '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub fast_period: u32,
    pub slow_period: u32,
    pub ma_filter_period: u32,
    pub ma_filter_type: MaFilterType,
    pub stop_loss_percent: f64,
    pub use_stop_loss: bool,
    pub use_stoch_confirmation: bool,
    pub stoch_k: u32,
    pub stoch_d: u32,
    pub rsi_length: u32,
    pub stoch_length: u32,
    pub stoch_upper_band: f64,
    pub stoch_middle_band: f64,
    pub stoch_lower_band: f64,
    pub mode: StrategyMode,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 25,
            ma_filter_period: 200,
            ma_filter_type: MaFilterType::Ema,
            stop_loss_percent: 7.0,
            use_stop_loss: true,
            use_stoch_confirmation: false,
            stoch_k: 3,
            stoch_d: 3,
            rsi_length: 14,
            stoch_length: 14,
            stoch_upper_band: 80.0,
            stoch_middle_band: 50.0,
            stoch_lower_band: 20.0,
            mode: StrategyMode::Standalone,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let periods = [
            ("fast_period", self.fast_period),
            ("slow_period", self.slow_period),
            ("stoch_k", self.stoch_k),
            ("stoch_d", self.stoch_d),
            ("rsi_length", self.rsi_length),
            ("stoch_length", self.stoch_length),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        if self.ma_filter_type.is_enabled() && self.ma_filter_period == 0 {
            return Err(EngineError::InvalidConfig(
                "ma_filter_period must be greater than zero".to_string(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(EngineError::InvalidConfig(format!(
                "fast_period ({}) must be shorter than slow_period ({})",
                self.fast_period, self.slow_period
            )));
        }
        if !(self.stop_loss_percent > 0.0 && self.stop_loss_percent < 100.0) {
            return Err(EngineError::InvalidRiskParameter(self.stop_loss_percent));
        }
        if !(self.stoch_lower_band < self.stoch_middle_band
            && self.stoch_middle_band < self.stoch_upper_band)
        {
            return Err(EngineError::InvalidConfig(
                "stochastic bands must satisfy lower < middle < upper".to_string(),
            ));
        }
        Ok(())
    }
}

/// Largest skew factor that keeps the shrunk side at or above the minimum clip.
pub const MAX_SKEW_FACTOR: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMakingConfig {
    pub enabled: bool,
    /// Half-spread from mid to the first level.
    pub spread_bps: f64,
    pub order_size_usd: f64,
    pub num_levels: u32,
    pub level_spacing_bps: f64,
    pub refresh_interval_sec: u64,
    pub skew_enabled: bool,
    pub skew_factor: f64,
    /// Zero disables inventory-aware sizing.
    pub max_position_usd: f64,
}

impl Default for MarketMakingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spread_bps: 10.0,
            order_size_usd: 100.0,
            num_levels: 3,
            level_spacing_bps: 5.0,
            refresh_interval_sec: 30,
            skew_enabled: true,
            skew_factor: 0.30,
            max_position_usd: 0.0,
        }
    }
}

impl MarketMakingConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.spread_bps >= 0.0) || !(self.level_spacing_bps >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "spread_bps and level_spacing_bps must be non-negative".to_string(),
            ));
        }
        if self.num_levels == 0 {
            return Err(EngineError::InvalidConfig(
                "num_levels must be at least 1".to_string(),
            ));
        }
        if !(self.order_size_usd > 0.0) {
            return Err(EngineError::InvalidConfig(
                "order_size_usd must be positive".to_string(),
            ));
        }
        if self.refresh_interval_sec == 0 {
            return Err(EngineError::InvalidConfig(
                "refresh_interval_sec must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=MAX_SKEW_FACTOR).contains(&self.skew_factor) {
            return Err(EngineError::InvalidConfig(format!(
                "skew_factor {} must be in [0, {}]",
                self.skew_factor, MAX_SKEW_FACTOR
            )));
        }
        if !(self.max_position_usd >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "max_position_usd must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
