//! Unit tests for directional size skew

use crate::fixtures::{approx_eq, base_time};
use proptest::prelude::*;
use quotrix::models::signal::SignalAction;
use quotrix::models::strategy::{MarketMakingConfig, MAX_SKEW_FACTOR};
use quotrix::quotes::{QuoteEngine, SkewBlender, MIN_CLIP_FRACTION};

#[test]
fn test_buy_skew_sizes() {
    let engine = QuoteEngine::new(10.0, 3, 5.0, 100.0);
    let set = engine.build("ETH", 1000.0, base_time());
    let skewed = SkewBlender::new(0.30).apply(&set, SignalAction::Buy, &engine);

    assert!(skewed.bids.iter().all(|l| approx_eq(l.size_usd, 130.0)));
    assert!(skewed.asks.iter().all(|l| approx_eq(l.size_usd, 70.0)));
    assert!(approx_eq(skewed.bids[0].size_usd / skewed.asks[0].size_usd, 13.0 / 7.0));
    assert_eq!(skewed.bias, SignalAction::Buy);
    assert!(skewed
        .rationale
        .contains("Directional bias: BUY (skewing bid sizes by 30%)"));
    // Prices are untouched.
    assert_eq!(skewed.bids[0].price, set.bids[0].price);
}

#[test]
fn test_sell_mirrors_buy() {
    let engine = QuoteEngine::new(10.0, 2, 5.0, 100.0);
    let set = engine.build("ETH", 1000.0, base_time());
    let skewed = SkewBlender::new(0.30).apply(&set, SignalAction::Sell, &engine);
    assert!(skewed.bids.iter().all(|l| approx_eq(l.size_usd, 70.0)));
    assert!(skewed.asks.iter().all(|l| approx_eq(l.size_usd, 130.0)));
    assert!(skewed.rationale.contains("skewing ask sizes"));
}

#[test]
fn test_hold_leaves_book_symmetric() {
    let engine = QuoteEngine::new(10.0, 3, 5.0, 100.0);
    let set = engine.build("ETH", 1000.0, base_time());
    let skewed = SkewBlender::new(0.30).apply(&set, SignalAction::Hold, &engine);
    assert_eq!(skewed.bids, set.bids);
    assert_eq!(skewed.asks, set.asks);
}

#[test]
fn test_config_bound_matches_blender_clamp() {
    let at_bound = MarketMakingConfig {
        skew_factor: MAX_SKEW_FACTOR,
        ..MarketMakingConfig::default()
    };
    assert!(at_bound.validate().is_ok());
    assert_eq!(SkewBlender::new(at_bound.skew_factor).skew_factor(), MAX_SKEW_FACTOR);

    let beyond = MarketMakingConfig {
        skew_factor: 0.995,
        ..MarketMakingConfig::default()
    };
    assert!(beyond.validate().is_err());
    assert_eq!(SkewBlender::new(0.995).skew_factor(), MAX_SKEW_FACTOR);
}

proptest! {
    #[test]
    fn prop_skew_ratio_and_floor(
        factor in 0.0f64..0.99,
        base in 0.01f64..1_000_000.0,
        buy in any::<bool>(),
    ) {
        let engine = QuoteEngine::new(10.0, 3, 5.0, base);
        let set = engine.build("ETH", 1000.0, base_time());
        let action = if buy { SignalAction::Buy } else { SignalAction::Sell };
        let skewed = SkewBlender::new(factor).apply(&set, action, &engine);

        for level in skewed.levels() {
            prop_assert!(level.size_usd >= base * MIN_CLIP_FRACTION * (1.0 - 1e-12));
            prop_assert!(level.size_usd > 0.0);
        }
        let (favoured, other) = if buy {
            (skewed.bids[0].size_usd, skewed.asks[0].size_usd)
        } else {
            (skewed.asks[0].size_usd, skewed.bids[0].size_usd)
        };
        let expected = (1.0 + factor) / (1.0 - factor);
        prop_assert!((favoured / other - expected).abs() <= 1e-9 * expected);
    }
}
