//! Moving-average and basis-point arithmetic shared by indicators and quoting.

/// Basis points per unit (1 bps = 0.01%).
pub const BPS_PER_UNIT: f64 = 10_000.0;

/// EMA smoothing factor `2 / (period + 1)`.
pub fn ema_multiplier(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// One step of the EMA recurrence.
pub fn ema_from_previous(price: f64, previous: f64, period: usize) -> f64 {
    (price - previous) * ema_multiplier(period) + previous
}

/// Arithmetic mean of the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Rolling SMA; element `i` covers `values[i..i + period]`.
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Linearly weighted mean of the trailing `period` values.
///
/// The most recent value carries weight `period`, the oldest weight 1.
pub fn wma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let weighted: f64 = window
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i + 1) as f64)
        .sum();
    let norm = (period * (period + 1)) as f64 / 2.0;
    Some(weighted / norm)
}

/// EMA seeded with the SMA of the first `period` values, then the recurrence
/// `ema = (price - ema) * k + ema` over the remainder.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

/// Every EMA value from the seed onward. Element 0 is the SMA seed at
/// index `period - 1` of `values`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(current);
    for price in &values[period..] {
        current = ema_from_previous(*price, current, period);
        out.push(current);
    }
    out
}

/// EMA evaluated as an explicit weighted sum instead of a recurrence:
/// `(1-k)^m * seed + sum_j k (1-k)^j * price[n-1-j]` where `m` is the number
/// of bars after the seed window.
pub fn ema_weighted_sum(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let k = ema_multiplier(period);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let tail = &values[period..];
    let m = tail.len();
    let decay = 1.0 - k;
    let weighted: f64 = tail
        .iter()
        .rev()
        .enumerate()
        .map(|(j, price)| k * decay.powi(j as i32) * price)
        .sum();
    Some(decay.powi(m as i32) * seed + weighted)
}

/// Price at a signed basis-point offset from `reference`.
pub fn offset_price(reference: f64, offset_bps: f64) -> f64 {
    reference * (1.0 + offset_bps / BPS_PER_UNIT)
}

/// Absolute move from `from` to `to` expressed in basis points of `from`.
pub fn move_bps(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return f64::INFINITY;
    }
    ((to - from) / from).abs() * BPS_PER_UNIT
}
