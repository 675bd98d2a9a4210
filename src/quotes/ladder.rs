//! Tiered bid/ask ladder around a mid price.

use crate::common::math;
use crate::models::quote::{QuoteLevel, QuoteSet, QuoteSide};
use crate::models::signal::SignalAction;
use crate::models::strategy::MarketMakingConfig;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct QuoteEngine {
    spread_bps: f64,
    num_levels: u32,
    level_spacing_bps: f64,
    order_size_usd: f64,
}

impl QuoteEngine {
    pub fn new(spread_bps: f64, num_levels: u32, level_spacing_bps: f64, order_size_usd: f64) -> Self {
        Self {
            spread_bps,
            num_levels,
            level_spacing_bps,
            order_size_usd,
        }
    }

    pub fn from_config(config: &MarketMakingConfig) -> Self {
        Self::new(
            config.spread_bps,
            config.num_levels,
            config.level_spacing_bps,
            config.order_size_usd,
        )
    }

    pub fn spread_bps(&self) -> f64 {
        self.spread_bps
    }

    pub fn order_size_usd(&self) -> f64 {
        self.order_size_usd
    }

    /// Distance of level `i` from mid: `spread + i * spacing`.
    pub fn level_offset_bps(&self, level: u32) -> f64 {
        self.spread_bps + level as f64 * self.level_spacing_bps
    }

    /// Symmetric ladder with uniform sizes. Deterministic for equal inputs.
    pub fn build(&self, asset: &str, mid_price: f64, now: DateTime<Utc>) -> QuoteSet {
        let mut bids = Vec::with_capacity(self.num_levels as usize);
        let mut asks = Vec::with_capacity(self.num_levels as usize);
        for level in 0..self.num_levels {
            let offset = self.level_offset_bps(level);
            bids.push(QuoteLevel {
                side: QuoteSide::Bid,
                level,
                price_offset_bps: -offset,
                price: math::offset_price(mid_price, -offset),
                size_usd: self.order_size_usd,
            });
            asks.push(QuoteLevel {
                side: QuoteSide::Ask,
                level,
                price_offset_bps: offset,
                price: math::offset_price(mid_price, offset),
                size_usd: self.order_size_usd,
            });
        }
        QuoteSet {
            asset: asset.to_string(),
            mid_price,
            bids,
            asks,
            bias: SignalAction::Hold,
            created_at: now,
            rationale: self.rationale(mid_price, SignalAction::Hold, 0.0),
        }
    }

    pub fn rationale(&self, mid_price: f64, bias: SignalAction, skew_factor: f64) -> String {
        let mut parts = vec![format!(
            "Market making with {} levels, {}bps spread",
            self.num_levels, self.spread_bps
        )];
        match bias {
            SignalAction::Hold => parts.push("Neutral (no directional signal)".to_string()),
            directional => parts.push(format!(
                "Directional bias: {} (skewing {} sizes by {:.0}%)",
                directional.as_str().to_uppercase(),
                if directional == SignalAction::Buy { "bid" } else { "ask" },
                skew_factor * 100.0
            )),
        }
        parts.push(format!("Mid price: ${:.2}", mid_price));
        parts.join(". ")
    }
}
