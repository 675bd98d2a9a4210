//! Stop-loss / take-profit derivation and exit checks.

use crate::error::EngineError;
use crate::models::risk::{ExitReason, PositionSide, RiskLevels};
use crate::models::signal::{Signal, SignalAction};
use crate::models::strategy::StrategyConfig;

/// Take-profit distance as a multiple of the stop distance.
pub const REWARD_RISK_RATIO: f64 = 2.0;

/// Risk distance used for the take-profit when stops are disabled.
pub const FALLBACK_RISK_FRACTION: f64 = 0.07;

#[derive(Debug, Clone, Copy)]
pub struct RiskCalculator {
    stop_loss_percent: f64,
    use_stop_loss: bool,
}

impl RiskCalculator {
    pub fn new(stop_loss_percent: f64, use_stop_loss: bool) -> Result<Self, EngineError> {
        if !(stop_loss_percent > 0.0 && stop_loss_percent < 100.0) {
            return Err(EngineError::InvalidRiskParameter(stop_loss_percent));
        }
        Ok(Self {
            stop_loss_percent,
            use_stop_loss,
        })
    }

    pub fn from_config(config: &StrategyConfig) -> Result<Self, EngineError> {
        Self::new(config.stop_loss_percent, config.use_stop_loss)
    }

    pub fn levels(&self, entry_price: f64, side: PositionSide) -> RiskLevels {
        let fraction = self.stop_loss_percent / 100.0;
        let stop_loss = self.use_stop_loss.then(|| match side {
            PositionSide::Long => entry_price * (1.0 - fraction),
            PositionSide::Short => entry_price * (1.0 + fraction),
        });
        let risk = match stop_loss {
            Some(sl) => (entry_price - sl).abs(),
            None => entry_price * FALLBACK_RISK_FRACTION,
        };
        let take_profit = match side {
            PositionSide::Long => entry_price + risk * REWARD_RISK_RATIO,
            PositionSide::Short => entry_price - risk * REWARD_RISK_RATIO,
        };
        RiskLevels {
            entry_price,
            stop_loss,
            take_profit,
            side,
            risk,
        }
    }

    /// Levels for a directional signal entered at its close; `None` for holds.
    pub fn levels_for_signal(&self, signal: &Signal) -> Option<RiskLevels> {
        let side = match signal.action {
            SignalAction::Buy => PositionSide::Long,
            SignalAction::Sell => PositionSide::Short,
            SignalAction::Hold => return None,
        };
        Some(self.levels(signal.price, side))
    }
}

/// Exit request for an open position: an opposite directional signal wins
/// over a level touch on the same tick.
pub fn check_exit(levels: &RiskLevels, signal: &Signal) -> Option<ExitReason> {
    let opposite = match levels.side {
        PositionSide::Long => SignalAction::Sell,
        PositionSide::Short => SignalAction::Buy,
    };
    if signal.action == opposite {
        return Some(ExitReason::OppositeSignal);
    }
    levels.exit_trigger(signal.price)
}

pub fn exit_plan(levels: &RiskLevels, fast_period: u32, slow_period: u32) -> String {
    let mut parts = Vec::new();
    if let Some(sl) = levels.stop_loss {
        parts.push(format!("SL at {:.2}", sl));
    }
    parts.push(format!("TP at {:.2}", levels.take_profit));
    let direction = match levels.side {
        PositionSide::Long => "below",
        PositionSide::Short => "above",
    };
    parts.push(format!(
        "Exit if Fast EMA({}) crosses {} Slow EMA({})",
        fast_period, direction, slow_period
    ));
    parts.join("; ")
}
