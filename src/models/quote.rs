use crate::models::signal::SignalAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSide {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteLevel {
    pub side: QuoteSide,
    pub level: u32,
    /// Signed offset from mid; negative for bids.
    pub price_offset_bps: f64,
    pub price: f64,
    pub size_usd: f64,
}

impl QuoteLevel {
    /// Size in units of the base asset, valued at the set's mid price.
    pub fn base_size(&self, mid_price: f64) -> f64 {
        if mid_price > 0.0 {
            self.size_usd / mid_price
        } else {
            0.0
        }
    }
}

/// Ladder built from a single mid-price snapshot. Replaced, never mutated in
/// place, by the next refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSet {
    pub asset: String,
    pub mid_price: f64,
    /// Best level first on both sides.
    pub bids: Vec<QuoteLevel>,
    pub asks: Vec<QuoteLevel>,
    /// Directional bias the sizes were skewed with.
    pub bias: SignalAction,
    pub created_at: DateTime<Utc>,
    pub rationale: String,
}

impl QuoteSet {
    pub fn total_bid_usd(&self) -> f64 {
        self.bids.iter().map(|l| l.size_usd).sum()
    }

    pub fn total_ask_usd(&self) -> f64 {
        self.asks.iter().map(|l| l.size_usd).sum()
    }

    /// Bids then asks, level order preserved.
    pub fn levels(&self) -> impl Iterator<Item = &QuoteLevel> {
        self.bids.iter().chain(self.asks.iter())
    }

    pub fn level_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }
}
