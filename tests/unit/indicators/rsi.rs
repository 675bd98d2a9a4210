//! Unit tests for Wilder RSI

use quotrix::indicators::momentum::{calculate_rsi, calculate_rsi_default, rsi_series, WilderRsi};

/// 15 closes whose 14 changes alternate +1 / -1.
fn alternating() -> Vec<f64> {
    let mut closes = vec![100.0];
    for i in 0..14 {
        let last = closes[closes.len() - 1];
        closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
    }
    closes
}

#[test]
fn test_seed_uses_simple_average() {
    let rsi = calculate_rsi_default(&alternating()).unwrap();
    assert!((rsi.avg_gain - 0.5).abs() < 1e-12);
    assert!((rsi.avg_loss - 0.5).abs() < 1e-12);
    assert!((rsi.value - 50.0).abs() < 1e-9);
}

#[test]
fn test_wilder_smoothing_after_seed() {
    let mut closes = alternating();
    let last = closes[closes.len() - 1];
    closes.push(last + 1.0);
    let rsi = calculate_rsi(&closes, 14).unwrap();
    // avg_gain = (0.5 * 13 + 1) / 14, avg_loss = 0.5 * 13 / 14
    assert!((rsi.avg_gain - 7.5 / 14.0).abs() < 1e-12);
    assert!((rsi.avg_loss - 6.5 / 14.0).abs() < 1e-12);
    assert!((rsi.value - 100.0 * 7.5 / 14.0).abs() < 1e-9);
}

#[test]
fn test_no_losses_reads_100() {
    let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    assert_eq!(calculate_rsi(&closes, 14).unwrap().value, 100.0);
}

#[test]
fn test_needs_period_plus_one_closes() {
    let closes = vec![100.0; 14];
    assert!(calculate_rsi(&closes, 14).is_none());
    assert_eq!(rsi_series(&alternating(), 14).len(), 1);

    let mut rsi = WilderRsi::new(2);
    assert!(rsi.update(1.0).is_none());
    assert!(rsi.update(2.0).is_none());
    assert!(rsi.update(1.0).is_some());
}
