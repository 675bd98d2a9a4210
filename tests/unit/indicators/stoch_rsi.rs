//! Unit tests for Stochastic RSI

use quotrix::indicators::momentum::{calculate_stoch_rsi, stochastic_series, StochRsiParams};

fn params() -> StochRsiParams {
    StochRsiParams {
        rsi_length: 14,
        stoch_length: 14,
        k: 3,
        d: 3,
    }
}

#[test]
fn test_required_bars() {
    assert_eq!(params().required_bars(), 33);
    let closes: Vec<f64> = (0..32).map(|i| 100.0 + (i as f64).sin()).collect();
    assert!(calculate_stoch_rsi(&closes, &params()).is_none());
}

#[test]
fn test_stochastic_scaling() {
    let stoch = stochastic_series(&[10.0, 30.0, 20.0], 3);
    assert_eq!(stoch, vec![50.0]);
    let stoch = stochastic_series(&[10.0, 20.0, 30.0, 30.0], 2);
    assert_eq!(stoch, vec![100.0, 100.0, 50.0]);
}

#[test]
fn test_values_stay_in_range() {
    let closes: Vec<f64> = (0..120)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.05)
        .collect();
    let value = calculate_stoch_rsi(&closes, &params()).unwrap();
    for reading in [value.k, value.d, value.prev_k, value.prev_d] {
        assert!((0.0..=100.0).contains(&reading), "{}", reading);
    }
}

#[test]
fn test_cross_flags() {
    let value = quotrix::models::indicators::StochRsiValue {
        k: 30.0,
        d: 25.0,
        prev_k: 20.0,
        prev_d: 25.0,
    };
    assert!(value.crossed_above());
    assert!(!value.crossed_below());
}
