//! Environment-driven configuration.

use crate::error::EngineError;
use crate::indicators::IndicatorEngine;
use crate::models::strategy::{MarketMakingConfig, StrategyConfig};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const SUPPORTED_INTERVALS: [&str; 11] = [
    "1m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "12h", "1d", "1w",
];

pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub assets: Vec<String>,
    pub interval: String,
    pub history_bars: usize,
    pub strategy: StrategyConfig,
    pub market_making: MarketMakingConfig,
    /// Zero disables capital allocation.
    pub capital_pool_usd: f64,
    pub price_history_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);
        let strategy_defaults = StrategyConfig::default();
        let mm_defaults = MarketMakingConfig::default();

        let strategy = StrategyConfig {
            fast_period: vars.parse("TRADER_XO_FAST_EMA", strategy_defaults.fast_period)?,
            slow_period: vars.parse("TRADER_XO_SLOW_EMA", strategy_defaults.slow_period)?,
            ma_filter_period: vars.parse(
                "TRADER_XO_MA_FILTER_PERIOD",
                strategy_defaults.ma_filter_period,
            )?,
            ma_filter_type: vars.parse(
                "TRADER_XO_MA_FILTER_TYPE",
                strategy_defaults.ma_filter_type,
            )?,
            stop_loss_percent: vars.parse(
                "TRADER_XO_STOP_LOSS_PERCENT",
                strategy_defaults.stop_loss_percent,
            )?,
            use_stop_loss: vars.flag("TRADER_XO_USE_STOP_LOSS", strategy_defaults.use_stop_loss),
            use_stoch_confirmation: vars.flag(
                "TRADER_XO_USE_STOCH_CONFIRMATION",
                strategy_defaults.use_stoch_confirmation,
            ),
            stoch_k: vars.parse("TRADER_XO_STOCH_K", strategy_defaults.stoch_k)?,
            stoch_d: vars.parse("TRADER_XO_STOCH_D", strategy_defaults.stoch_d)?,
            rsi_length: vars.parse("TRADER_XO_RSI_LENGTH", strategy_defaults.rsi_length)?,
            stoch_length: vars.parse("TRADER_XO_STOCH_LENGTH", strategy_defaults.stoch_length)?,
            stoch_upper_band: vars.parse(
                "TRADER_XO_STOCH_UPPER_BAND",
                strategy_defaults.stoch_upper_band,
            )?,
            stoch_middle_band: vars.parse(
                "TRADER_XO_STOCH_MIDDLE_BAND",
                strategy_defaults.stoch_middle_band,
            )?,
            stoch_lower_band: vars.parse(
                "TRADER_XO_STOCH_LOWER_BAND",
                strategy_defaults.stoch_lower_band,
            )?,
            mode: vars.parse("STRATEGY_MODE", strategy_defaults.mode)?,
        };

        let market_making = MarketMakingConfig {
            enabled: vars.flag("MM_ENABLED", mm_defaults.enabled),
            spread_bps: vars.parse("MM_SPREAD_BPS", mm_defaults.spread_bps)?,
            order_size_usd: vars.parse("MM_ORDER_SIZE_USD", mm_defaults.order_size_usd)?,
            num_levels: vars.parse("MM_NUM_LEVELS", mm_defaults.num_levels)?,
            level_spacing_bps: vars.parse("MM_LEVEL_SPACING_BPS", mm_defaults.level_spacing_bps)?,
            refresh_interval_sec: vars.parse(
                "MM_REFRESH_INTERVAL_SEC",
                mm_defaults.refresh_interval_sec,
            )?,
            skew_enabled: vars.flag("MM_SKEW_ENABLED", mm_defaults.skew_enabled),
            skew_factor: vars.parse("MM_SKEW_FACTOR", mm_defaults.skew_factor)?,
            max_position_usd: vars.parse("MM_MAX_POSITION_USD", mm_defaults.max_position_usd)?,
        };

        let config = Self {
            environment: vars.get("ENVIRONMENT").unwrap_or_else(|| "sandbox".to_string()),
            assets: parse_assets(&vars.get("ASSETS").unwrap_or_else(|| "BTC".to_string())),
            interval: normalize_interval(&vars.get("INTERVAL").unwrap_or_else(|| "5m".to_string()))?,
            history_bars: vars.parse("HISTORY_BARS", 300usize)?,
            strategy,
            market_making,
            capital_pool_usd: vars.parse("CAPITAL_POOL_USD", 0.0)?,
            price_history_path: vars.get("PRICE_HISTORY_PATH").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.assets.is_empty() {
            return Err(EngineError::InvalidConfig(
                "ASSETS must name at least one asset".to_string(),
            ));
        }
        self.strategy.validate()?;
        self.market_making.validate()?;

        let required = IndicatorEngine::new(self.strategy.clone()).required_bars();
        if self.history_bars < required {
            return Err(EngineError::InvalidConfig(format!(
                "HISTORY_BARS ({}) is shorter than the indicator lookback ({})",
                self.history_bars, required
            )));
        }
        if !(self.capital_pool_usd >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "CAPITAL_POOL_USD must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, EngineError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.parse().map_err(|e: T::Err| {
                EngineError::InvalidConfig(format!("{}='{}': {}", key, raw, e))
            }),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).map(|raw| parse_bool(&raw)).unwrap_or(default)
    }
}

/// `true`, `1` and `yes` (any case) are true; anything else is false.
pub fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Space- or comma-separated asset list, upper-cased and de-duplicated.
pub fn parse_assets(raw: &str) -> Vec<String> {
    let mut assets: Vec<String> = Vec::new();
    for asset in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_uppercase())
    {
        if !assets.contains(&asset) {
            assets.push(asset);
        }
    }
    assets
}

pub fn normalize_interval(raw: &str) -> Result<String, EngineError> {
    let interval = raw.trim().to_ascii_lowercase();
    if SUPPORTED_INTERVALS.contains(&interval.as_str()) {
        Ok(interval)
    } else {
        Err(EngineError::InvalidConfig(format!(
            "unsupported interval '{}', expected one of {}",
            raw,
            SUPPORTED_INTERVALS.join(" ")
        )))
    }
}
