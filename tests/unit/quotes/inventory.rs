//! Unit tests for inventory-aware sizing

use crate::fixtures::{approx_eq, base_time};
use quotrix::quotes::{adjust_for_inventory, QuoteEngine};

fn ladder() -> quotrix::models::quote::QuoteSet {
    QuoteEngine::new(10.0, 2, 5.0, 100.0).build("BTC", 1000.0, base_time())
}

#[test]
fn test_small_position_unchanged() {
    let set = ladder();
    assert_eq!(adjust_for_inventory(&set, 250.0, 1000.0), set);
    assert_eq!(adjust_for_inventory(&set, 900.0, 0.0), set);
}

#[test]
fn test_long_position_leans_toward_selling() {
    let adjusted = adjust_for_inventory(&ladder(), 400.0, 1000.0);
    assert!(adjusted.bids.iter().all(|l| approx_eq(l.size_usd, 60.0)));
    assert!(adjusted.asks.iter().all(|l| approx_eq(l.size_usd, 140.0)));
    assert!(adjusted.rationale.contains("Long position"));
}

#[test]
fn test_adjustment_capped_at_half() {
    let adjusted = adjust_for_inventory(&ladder(), -5000.0, 1000.0);
    assert!(adjusted.bids.iter().all(|l| approx_eq(l.size_usd, 150.0)));
    assert!(adjusted.asks.iter().all(|l| approx_eq(l.size_usd, 50.0)));
}
