//! Per-asset signal pipeline: indicators → detector → risk levels.

use crate::error::EngineError;
use crate::indicators::IndicatorEngine;
use crate::models::indicators::IndicatorState;
use crate::models::market::{PriceBar, PriceWindow};
use crate::models::risk::RiskLevels;
use crate::models::signal::Signal;
use crate::models::strategy::StrategyConfig;
use crate::signals::context::{ContextSummary, StrategyContextFormatter};
use crate::signals::decision::{exit_plan, RiskCalculator};
use crate::signals::detector::SignalDetector;
use tracing::debug;

/// Outcome of one evaluation tick.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub indicators: IndicatorState,
    pub signal: Signal,
    /// Present only when a directional signal fired on this tick.
    pub risk: Option<RiskLevels>,
}

pub struct SignalEngine {
    indicators: IndicatorEngine,
    detector: SignalDetector,
    risk: RiskCalculator,
    formatter: StrategyContextFormatter,
}

impl SignalEngine {
    /// Validates `config`; an invalid stop-loss percent is fatal for the asset.
    pub fn new(config: StrategyConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let risk = RiskCalculator::from_config(&config)?;
        Ok(Self {
            indicators: IndicatorEngine::new(config.clone()),
            formatter: StrategyContextFormatter::new(&config),
            detector: SignalDetector::new(config),
            risk,
        })
    }

    pub fn required_bars(&self) -> usize {
        self.indicators.required_bars()
    }

    pub fn detector(&self) -> &SignalDetector {
        &self.detector
    }

    pub fn config(&self) -> &StrategyConfig {
        self.indicators.config()
    }

    /// Evaluate the latest bar of `window`. On `InsufficientHistory` the
    /// detector is left untouched.
    pub fn evaluate(&mut self, asset: &str, window: &PriceWindow) -> Result<Evaluation, EngineError> {
        let indicators = self.indicators.compute(asset, window)?;
        let mut signal = self.detector.evaluate(&indicators);
        let risk = self.risk.levels_for_signal(&signal);
        if let Some(levels) = &risk {
            let config = self.indicators.config();
            signal.exit_plan = Some(exit_plan(levels, config.fast_period, config.slow_period));
        }

        debug!(
            asset = %asset,
            action = ?signal.action,
            fast_ema = indicators.fast_ema.current,
            slow_ema = indicators.slow_ema.current,
            buy_count = signal.buy_count,
            sell_count = signal.sell_count,
            "SignalEngine: evaluated {} bars for {}",
            window.len(),
            asset
        );

        Ok(Evaluation {
            indicators,
            signal,
            risk,
        })
    }

    /// Walk `bars` one bar at a time, evaluating every prefix long enough to
    /// satisfy the lookback.
    pub fn replay(&mut self, asset: &str, bars: &[PriceBar]) -> Result<Vec<Evaluation>, EngineError> {
        let start = self.required_bars().max(1);
        let mut evaluations = Vec::new();
        for end in start..=bars.len() {
            let window = PriceWindow::new(bars[..end].to_vec())?;
            evaluations.push(self.evaluate(asset, &window)?);
        }
        Ok(evaluations)
    }

    pub fn context_summary(&self, evaluation: &Evaluation) -> ContextSummary {
        self.formatter.summarize(
            &evaluation.indicators,
            &evaluation.signal,
            evaluation.risk.as_ref(),
        )
    }
}
