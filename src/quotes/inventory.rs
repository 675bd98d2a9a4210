//! Inventory-aware resizing of a quote set.

use crate::models::quote::QuoteSet;
use crate::quotes::skew::clip;

/// Inventory ratio magnitude below which sizes are left alone.
pub const INVENTORY_THRESHOLD: f64 = 0.3;
/// Largest fractional change applied to either side.
pub const MAX_INVENTORY_ADJUSTMENT: f64 = 0.5;

/// Lean the book against the current position. A long position shrinks bids
/// and grows asks; a short position does the opposite.
pub fn adjust_for_inventory(set: &QuoteSet, position_usd: f64, max_position_usd: f64) -> QuoteSet {
    if max_position_usd <= 0.0 || !position_usd.is_finite() {
        return set.clone();
    }
    let ratio = position_usd / max_position_usd;
    if ratio.abs() <= INVENTORY_THRESHOLD {
        return set.clone();
    }
    let adjustment = ratio.abs().min(MAX_INVENTORY_ADJUSTMENT);
    let (bid_mult, ask_mult) = if ratio > 0.0 {
        (1.0 - adjustment, 1.0 + adjustment)
    } else {
        (1.0 + adjustment, 1.0 - adjustment)
    };

    let mut adjusted = set.clone();
    for bid in adjusted.bids.iter_mut() {
        bid.size_usd = clip(bid.size_usd * bid_mult, bid.size_usd);
    }
    for ask in adjusted.asks.iter_mut() {
        ask.size_usd = clip(ask.size_usd * ask_mult, ask.size_usd);
    }
    let side = if ratio > 0.0 { "Long" } else { "Short" };
    adjusted.rationale = format!(
        "{}. {} position (${:.2}): leaning sizes by {:.0}%",
        set.rationale,
        side,
        position_usd,
        adjustment * 100.0
    );
    adjusted
}
