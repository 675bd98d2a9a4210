//! Unit tests for the hybrid-mode context summary

use crate::fixtures::{bars_from_closes, rise_then_fall};
use quotrix::models::signal::SignalAction;
use quotrix::models::strategy::{StrategyConfig, StrategyMode};
use quotrix::models::PriceWindow;
use quotrix::signals::{SignalEngine, TrendLabel};

#[test]
fn test_summary_for_buy_signal() {
    let closes = rise_then_fall(3.0);
    let mut engine = SignalEngine::new(StrategyConfig {
        mode: StrategyMode::Hybrid,
        ..StrategyConfig::default()
    })
    .unwrap();
    let window = PriceWindow::new(bars_from_closes(&closes[..206])).unwrap();
    let evaluation = engine.evaluate("BTC", &window).unwrap();
    assert_eq!(evaluation.signal.action, SignalAction::Buy);

    let summary = engine.context_summary(&evaluation);
    assert_eq!(summary.asset, "BTC");
    assert_eq!(summary.trend, TrendLabel::Bullish);
    assert!(summary.risk.is_some());
    assert!(summary.text.contains("Fast EMA(12)"));
    assert!(summary.text.contains("EMA(200)"));
    assert!(summary.text.contains("Signal: BUY"));
    assert!(summary.text.contains("Take profit:"));

    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(json["asset"], "BTC");
    assert_eq!(json["trend"], "Bullish");
}
