//! Indicator/signal summary handed to the advisory collaborator in hybrid mode.

use crate::models::indicators::IndicatorState;
use crate::models::risk::RiskLevels;
use crate::models::signal::{Signal, SignalAction};
use crate::models::strategy::StrategyConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumLabel {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSummary {
    pub asset: String,
    pub action: SignalAction,
    pub trend: TrendLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum: Option<MomentumLabel>,
    pub indicators: IndicatorState,
    pub signal: Signal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevels>,
    pub text: String,
}

impl ContextSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone)]
pub struct StrategyContextFormatter {
    fast_period: u32,
    slow_period: u32,
    upper_band: f64,
    lower_band: f64,
}

impl StrategyContextFormatter {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            fast_period: config.fast_period,
            slow_period: config.slow_period,
            upper_band: config.stoch_upper_band,
            lower_band: config.stoch_lower_band,
        }
    }

    pub fn trend(&self, indicators: &IndicatorState) -> TrendLabel {
        let fast = indicators.fast_ema.current;
        let slow = indicators.slow_ema.current;
        if fast > slow {
            TrendLabel::Bullish
        } else if fast < slow {
            TrendLabel::Bearish
        } else {
            TrendLabel::Neutral
        }
    }

    pub fn momentum(&self, indicators: &IndicatorState) -> Option<MomentumLabel> {
        let stoch = indicators.stoch_rsi?;
        Some(if stoch.k > self.upper_band {
            MomentumLabel::Overbought
        } else if stoch.k < self.lower_band {
            MomentumLabel::Oversold
        } else {
            MomentumLabel::Neutral
        })
    }

    pub fn render(
        &self,
        indicators: &IndicatorState,
        signal: &Signal,
        risk: Option<&RiskLevels>,
    ) -> String {
        let mut lines = vec![format!(
            "=== Trader XO Strategy Indicators for {} ===",
            indicators.asset
        )];
        lines.push(format!(
            "Fast EMA({}): {:.2}",
            self.fast_period, indicators.fast_ema.current
        ));
        lines.push(format!(
            "Slow EMA({}): {:.2}",
            self.slow_period, indicators.slow_ema.current
        ));
        lines.push(format!("EMA Trend: {:?}", self.trend(indicators)));
        if let Some(filter) = indicators.ma_filter {
            lines.push(format!(
                "{}({}): {:.2}",
                filter.kind, filter.period, filter.value
            ));
        }
        if let Some(rsi) = indicators.rsi {
            lines.push(format!("RSI({}): {:.2}", rsi.period, rsi.value));
        }
        if let (Some(stoch), Some(momentum)) = (indicators.stoch_rsi, self.momentum(indicators)) {
            lines.push(format!("Stochastic RSI K: {:.2}", stoch.k));
            lines.push(format!("Stochastic RSI D: {:.2}", stoch.d));
            lines.push(format!("Momentum: {:?}", momentum));
        }
        lines.push(format!(
            "Signal: {} ({})",
            signal.action.as_str().to_uppercase(),
            signal.rationale
        ));
        if let Some(levels) = risk {
            if let Some(sl) = levels.stop_loss {
                lines.push(format!("Stop loss: {:.2}", sl));
            }
            lines.push(format!("Take profit: {:.2}", levels.take_profit));
        }
        lines.join("\n")
    }

    pub fn summarize(
        &self,
        indicators: &IndicatorState,
        signal: &Signal,
        risk: Option<&RiskLevels>,
    ) -> ContextSummary {
        ContextSummary {
            asset: indicators.asset.clone(),
            action: signal.action,
            trend: self.trend(indicators),
            momentum: self.momentum(indicators),
            indicators: indicators.clone(),
            signal: signal.clone(),
            risk: risk.copied(),
            text: self.render(indicators, signal, risk),
        }
    }
}
