//! Turns a price window into the per-asset indicator snapshot.

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{calculate_rsi, calculate_stoch_rsi, StochRsiParams};
use crate::indicators::trend::{calculate_ma, ExponentialAverage};
use crate::models::indicators::{IndicatorState, MaFilterValue};
use crate::models::market::PriceWindow;
use crate::models::strategy::StrategyConfig;

/// Extra bars beyond the longest period, so the previous EMA value exists.
pub const LOOKBACK_BUFFER: usize = 1;

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: StrategyConfig,
}

impl IndicatorEngine {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn stoch_params(&self) -> StochRsiParams {
        StochRsiParams {
            rsi_length: self.config.rsi_length,
            stoch_length: self.config.stoch_length,
            k: self.config.stoch_k,
            d: self.config.stoch_d,
        }
    }

    /// `max(fast, slow, filter, stoch) + LOOKBACK_BUFFER`; the filter and stoch
    /// terms only count when enabled.
    pub fn required_bars(&self) -> usize {
        let mut longest = self.config.fast_period.max(self.config.slow_period) as usize;
        if self.config.ma_filter_type.is_enabled() {
            longest = longest.max(self.config.ma_filter_period as usize);
        }
        if self.config.use_stoch_confirmation {
            longest = longest.max(self.stoch_params().required_bars());
        }
        longest + LOOKBACK_BUFFER
    }

    pub fn compute(
        &self,
        asset: &str,
        window: &PriceWindow,
    ) -> Result<IndicatorState, IndicatorError> {
        let required = self.required_bars();
        let last = match window.last() {
            Some(bar) if window.len() >= required => *bar,
            _ => {
                return Err(IndicatorError::InsufficientHistory {
                    required,
                    available: window.len(),
                })
            }
        };

        let closes = window.closes();
        let mut fast = ExponentialAverage::new(self.config.fast_period as usize);
        let mut slow = ExponentialAverage::new(self.config.slow_period as usize);
        for close in &closes {
            fast.update(*close);
            slow.update(*close);
        }
        let insufficient = IndicatorError::InsufficientHistory {
            required,
            available: window.len(),
        };
        let fast_line = fast.line().ok_or_else(|| insufficient.clone())?;
        let slow_line = slow.line().ok_or(insufficient)?;

        let mut state = IndicatorState::new(
            asset.to_string(),
            last.close,
            last.timestamp,
            fast_line,
            slow_line,
        )
        .with_periods(self.config.fast_period, self.config.slow_period)
        .with_bars_used(closes.len());

        if let Some(value) = calculate_ma(
            &closes,
            self.config.ma_filter_type,
            self.config.ma_filter_period,
        ) {
            state = state.with_ma_filter(MaFilterValue {
                value,
                kind: self.config.ma_filter_type,
                period: self.config.ma_filter_period,
            });
        }

        if let Some(rsi) = calculate_rsi(&closes, self.config.rsi_length) {
            state = state.with_rsi(rsi);
        }

        // Also feeds the context summary when confirmation is off.
        if let Some(stoch) = calculate_stoch_rsi(&closes, &self.stoch_params()) {
            state = state.with_stoch_rsi(stoch);
        }

        Ok(state)
    }
}
