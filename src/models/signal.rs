use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    pub fn is_directional(&self) -> bool {
        !matches!(self, Self::Hold)
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
            Self::Hold => Self::Hold,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mirrors the last emitted directional signal; not a position guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalState {
    #[default]
    Flat,
    Long,
    Short,
}

impl SignalState {
    /// Whether `action` points away from the position this state holds.
    pub fn is_opposite_of(&self, action: SignalAction) -> bool {
        matches!(
            (self, action),
            (Self::Long, SignalAction::Sell) | (Self::Short, SignalAction::Buy)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    Bullish,
    Bearish,
    None,
}

/// Directional decision for one evaluation tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub asset: String,
    pub action: SignalAction,
    /// Crossover detected on this tick's bar.
    pub crossover: CrossoverType,
    /// Whether the action came from a crossover carried over from an earlier,
    /// filtered tick.
    pub from_pending: bool,
    pub buy_count: u64,
    pub sell_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_filter_passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoch_confirmed: Option<bool>,
    pub state: SignalState,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_plan: Option<String>,
}

impl Signal {
    pub fn is_directional(&self) -> bool {
        self.action.is_directional()
    }
}
