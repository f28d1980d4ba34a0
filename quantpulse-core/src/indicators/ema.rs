//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1], with
//! alpha = 2 / (period + 1). Seed: EMA[0] = value[0] — the first available
//! close, so the series is defined from index 0 with no warmup prefix. This
//! matches the adjust-free exponential smoothing the rest of the pipeline
//! (and its upstream data vendors) assume, not the SMA-seeded variant.

/// Compute the EMA series of `values` over `period`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "EMA period must be >= 1");
    let n = values.len();
    let mut result = Vec::with_capacity(n);

    if n == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[0];
    result.push(prev);

    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        result.push(prev);
    }

    result
}
