//! Trailing-window indicator math over canonical bar series.
//!
//! Conventions match the charting defaults the signal layer expects: EMA
//! seeds at the first close with alpha = 2/(n+1); RSI uses simple 14-bar
//! means of gains and losses; ATR is a simple mean of true range. Series are
//! right-aligned with NaN warmup prefixes; `snapshot` sanitizes every NaN and
//! infinity to 0.0 at the boundary, so NaN never leaves this module tree.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod snapshot;

pub use atr::{atr_series, true_range};
pub use ema::ema_series;
pub use macd::{cross_state, macd_series, MacdCross, MacdSeries};
pub use rsi::rsi_series;
pub use sma::sma_series;
pub use snapshot::{safe_round, IndicatorSnapshot, MaAlignment};

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev close (or close for the first bar),
/// high/low bracket the open/close by 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
