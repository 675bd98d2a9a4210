//! Directional size skew applied to a symmetric ladder.

use crate::models::quote::{QuoteSet, QuoteSide};
use crate::models::signal::SignalAction;
use crate::models::strategy::MAX_SKEW_FACTOR;
use crate::quotes::ladder::QuoteEngine;
use tracing::warn;

/// Smallest size a level may shrink to, as a fraction of its base size.
pub const MIN_CLIP_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
pub struct SkewBlender {
    skew_factor: f64,
}

impl SkewBlender {
    /// `skew_factor` is clamped into `[0, MAX_SKEW_FACTOR]`.
    pub fn new(skew_factor: f64) -> Self {
        let clamped = if skew_factor.is_finite() {
            skew_factor.clamp(0.0, MAX_SKEW_FACTOR)
        } else {
            0.0
        };
        if clamped != skew_factor {
            warn!(
                requested = skew_factor,
                applied = clamped,
                "SkewBlender: skew factor {} out of range, using {}",
                skew_factor,
                clamped
            );
        }
        Self {
            skew_factor: clamped,
        }
    }

    pub fn skew_factor(&self) -> f64 {
        self.skew_factor
    }

    /// Multipliers for (bid, ask) under `bias`.
    pub fn multipliers(&self, bias: SignalAction) -> (f64, f64) {
        let up = 1.0 + self.skew_factor;
        let down = 1.0 - self.skew_factor;
        match bias {
            SignalAction::Buy => (up, down),
            SignalAction::Sell => (down, up),
            SignalAction::Hold => (1.0, 1.0),
        }
    }

    /// New set with bid/ask sizes rescaled for `bias`; never below the clip.
    pub fn apply(&self, set: &QuoteSet, bias: SignalAction, engine: &QuoteEngine) -> QuoteSet {
        let (bid_mult, ask_mult) = self.multipliers(bias);
        let mut skewed = set.clone();
        for level in skewed.bids.iter_mut().chain(skewed.asks.iter_mut()) {
            let mult = match level.side {
                QuoteSide::Bid => bid_mult,
                QuoteSide::Ask => ask_mult,
            };
            level.size_usd = clip(level.size_usd * mult, level.size_usd);
        }
        skewed.bias = bias;
        skewed.rationale = engine.rationale(set.mid_price, bias, self.skew_factor);
        skewed
    }
}

/// Floor `size` at the minimum clip of `base`.
pub fn clip(size: f64, base: f64) -> f64 {
    size.max(base * MIN_CLIP_FRACTION)
}
