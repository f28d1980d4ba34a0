//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR is a simple trailing mean of TR over `period` bars (not Wilder
//! smoothing). First valid value at index period - 1.

use crate::domain::Bar;

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = Vec::with_capacity(n);

    if n == 0 {
        return tr;
    }

    tr.push(bars[0].high - bars[0].low);
    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        tr.push((h - l).max((h - pc).abs()).max((l - pc).abs()));
    }

    tr
}

/// Compute the ATR series: simple moving average of true range.
pub fn atr_series(bars: &[Bar], period: usize) -> Vec<f64> {
    crate::indicators::sma_series(&true_range(bars), period)
}
