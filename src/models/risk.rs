use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub entry_price: f64,
    /// Absent when stop losses are disabled.
    pub stop_loss: Option<f64>,
    pub take_profit: f64,
    pub side: PositionSide,
    /// Distance from entry to the stop (or the fallback risk distance).
    pub risk: f64,
}

impl RiskLevels {
    pub fn stop_distance(&self) -> Option<f64> {
        self.stop_loss.map(|sl| (self.entry_price - sl).abs())
    }

    pub fn take_profit_distance(&self) -> f64 {
        (self.take_profit - self.entry_price).abs()
    }

    /// Touch test for the protective levels at `price`.
    pub fn exit_trigger(&self, price: f64) -> Option<ExitReason> {
        match self.side {
            PositionSide::Long => {
                if self.stop_loss.is_some_and(|sl| price <= sl) {
                    Some(ExitReason::StopLossHit)
                } else if price >= self.take_profit {
                    Some(ExitReason::TakeProfitHit)
                } else {
                    None
                }
            }
            PositionSide::Short => {
                if self.stop_loss.is_some_and(|sl| price >= sl) {
                    Some(ExitReason::StopLossHit)
                } else if price <= self.take_profit {
                    Some(ExitReason::TakeProfitHit)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    OppositeSignal,
    StopLossHit,
    TakeProfitHit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OppositeSignal => "opposite_signal",
            Self::StopLossHit => "stop_loss_hit",
            Self::TakeProfitHit => "take_profit_hit",
        }
    }
}

/// Request for the execution side to close the position tied to `levels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitRequest {
    pub asset: String,
    pub reason: ExitReason,
    pub price: f64,
    pub levels: RiskLevels,
    pub timestamp: DateTime<Utc>,
}
