//! Relative Strength Index (RSI).
//!
//! Uses simple trailing means of gains and losses (not Wilder smoothing):
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss) over the last `period`
//! close-to-close changes. Lookback: period (first valid value at index
//! `period`).
//!
//! Division guard: avg_loss == 0 yields 100 when avg_gain > 0, else 50 —
//! a flat window reads as neutral, an all-up window as fully overbought.

/// Compute the RSI series of `closes` over `period`.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "RSI period must be >= 1");
    let n = closes.len();
    let mut result = vec![f64::NAN; n];

    if n < period + 1 {
        return result;
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gain_sum += change;
        } else {
            loss_sum -= change;
        }
    }
    result[period] = point_rsi(gain_sum / period as f64, loss_sum / period as f64);

    for i in (period + 1)..n {
        let leaving = closes[i - period] - closes[i - period - 1];
        if leaving > 0.0 {
            gain_sum -= leaving;
        } else {
            loss_sum += leaving;
        }
        let entering = closes[i] - closes[i - 1];
        if entering > 0.0 {
            gain_sum += entering;
        } else {
            loss_sum -= entering;
        }
        // Rolling subtraction can leave tiny negative dust.
        gain_sum = gain_sum.max(0.0);
        loss_sum = loss_sum.max(0.0);

        result[i] = point_rsi(gain_sum / period as f64, loss_sum / period as f64);
    }

    result
}

fn point_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            100.0
        } else {
            50.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn rsi_all_gains_is_100() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let result = rsi_series(&closes, 3);
        assert_approx(result[3], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_flat_is_50() {
        let closes = [100.0; 8];
        let result = rsi_series(&closes, 3);
        assert_approx(result[7], 50.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes = [105.0, 104.0, 103.0, 102.0, 101.0];
        let result = rsi_series(&closes, 3);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_mixed_window() {
        // Changes over period 3 at the last index: -0.25, -0.48, +0.72
        // avg_gain = 0.72/3, avg_loss = 0.73/3
        // RSI = 100 - 100/(1 + 0.72/0.73) = 49.655...
        let closes = [44.0, 44.34, 44.09, 43.61, 44.33];
        let result = rsi_series(&closes, 3);
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + 0.72 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_stays_in_bounds() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        for v in rsi_series(&closes, 3) {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds: {v}");
            }
        }
    }

    #[test]
    fn rsi_warmup_is_nan() {
        let closes = [100.0, 101.0, 102.0];
        let result = rsi_series(&closes, 14);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
