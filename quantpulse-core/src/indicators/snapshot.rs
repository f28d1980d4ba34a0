//! Indicator snapshot — every derived value for the most recent bar.
//!
//! The snapshot is the hand-off point between raw series math and signal
//! scoring, and it is where the NaN boundary sits: any NaN or infinity
//! produced by a short window collapses to 0.0 through `safe_round`, so
//! downstream consumers never see a non-finite number.

use crate::domain::Bar;
use crate::indicators::{
    atr_series, cross_state, ema_series, macd_series, rsi_series, sma_series, MacdCross,
};
use serde::{Deserialize, Serialize};

/// Fewest bars the engine will compute anything from; below this every field
/// stays at its zero default.
const MIN_BARS: usize = 5;

/// Window for support/resistance extremes.
const RANGE_WINDOW: usize = 20;

/// Sanitize a computed value for the snapshot boundary: NaN and infinities
/// collapse to 0.0, finite values round to `decimals` places.
pub fn safe_round(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Stacking order of the four moving averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaAlignment {
    #[serde(rename = "bullish-stack")]
    BullishStack,
    #[serde(rename = "bearish-stack")]
    BearishStack,
    #[default]
    #[serde(rename = "indeterminate")]
    Indeterminate,
}

/// Immutable value object computed from the last bar of a canonical series
/// plus trailing windows. Every numeric field is finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub current_price: f64,
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub ema13: f64,
    pub ema26: f64,
    pub rsi14: f64,
    pub atr14: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub macd_cross: MacdCross,
    pub bias_ma5: f64,
    pub volume_ratio: f64,
    pub ma_alignment: MaAlignment,
    pub support_level: f64,
    pub resistance_level: f64,
}

impl IndicatorSnapshot {
    /// Compute the snapshot for the last bar of `bars`.
    ///
    /// Returns the all-zero default when fewer than 5 bars are present.
    /// Individual indicators whose window exceeds the series length degrade
    /// to 0.0 rather than failing the whole snapshot.
    pub fn compute(bars: &[Bar]) -> Self {
        if bars.len() < MIN_BARS {
            return Self::default();
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let n = closes.len();
        let price = closes[n - 1];

        let ma5 = last(&sma_series(&closes, 5));
        let ma10 = last(&sma_series(&closes, 10));
        let ma20 = last(&sma_series(&closes, 20));
        let ma60 = last(&sma_series(&closes, 60));
        let ema13 = last(&ema_series(&closes, 13));
        let ema26 = last(&ema_series(&closes, 26));
        let rsi14 = last(&rsi_series(&closes, 14));
        let atr14 = last(&atr_series(bars, 14));

        let macd = macd_series(&closes);
        let macd_cross = cross_state(&macd.line, &macd.signal);

        let bias_ma5 = if ma5.is_finite() && ma5 != 0.0 {
            (price - ma5) / ma5 * 100.0
        } else {
            0.0
        };

        let volume_ratio = volume_ratio(bars);
        let ma_alignment = alignment(ma5, ma10, ma20, ma60);

        let window = &bars[n.saturating_sub(RANGE_WINDOW)..];
        let recent_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let recent_high = window
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);

        // Support is deliberately biased upward: the 20-bar low alone lets a
        // single flush-out wick set a uselessly deep level.
        let support = if ma20.is_finite() {
            recent_low.max(ma20)
        } else {
            recent_low
        };

        let resistance = resistance_level(price, recent_high, ma5, ma10);

        Self {
            current_price: safe_round(price, 2),
            ma5: safe_round(ma5, 2),
            ma10: safe_round(ma10, 2),
            ma20: safe_round(ma20, 2),
            ma60: safe_round(ma60, 2),
            ema13: safe_round(ema13, 2),
            ema26: safe_round(ema26, 2),
            rsi14: safe_round(rsi14, 2),
            atr14: safe_round(atr14, 3),
            macd: safe_round(last(&macd.line), 3),
            macd_signal: safe_round(last(&macd.signal), 3),
            macd_hist: safe_round(last(&macd.histogram), 3),
            macd_cross,
            bias_ma5: safe_round(bias_ma5, 2),
            volume_ratio: safe_round(volume_ratio, 2),
            ma_alignment,
            support_level: safe_round(support, 2),
            resistance_level: safe_round(resistance, 2),
        }
    }
}

fn last(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}

/// Current volume against the mean of the five preceding bars (current
/// excluded). 1.0 when there is no usable baseline.
fn volume_ratio(bars: &[Bar]) -> f64 {
    let n = bars.len();
    if n < 6 {
        return 1.0;
    }
    let baseline: f64 = bars[n - 6..n - 1].iter().map(|b| b.volume).sum::<f64>() / 5.0;
    if baseline > 0.0 {
        bars[n - 1].volume / baseline
    } else {
        1.0
    }
}

fn alignment(ma5: f64, ma10: f64, ma20: f64, ma60: f64) -> MaAlignment {
    if ![ma5, ma10, ma20, ma60].iter().all(|v| v.is_finite()) {
        return MaAlignment::Indeterminate;
    }
    if ma5 > ma10 && ma10 > ma20 && ma20 > ma60 {
        MaAlignment::BullishStack
    } else if ma5 < ma10 && ma10 < ma20 && ma20 < ma60 {
        MaAlignment::BearishStack
    } else {
        MaAlignment::Indeterminate
    }
}

/// Nearest defined level strictly above price among the trailing high and the
/// short moving averages; synthetic 5% fallback when nothing sits above.
fn resistance_level(price: f64, recent_high: f64, ma5: f64, ma10: f64) -> f64 {
    let nearest = [recent_high, ma5, ma10]
        .into_iter()
        .filter(|v| v.is_finite() && *v > price)
        .fold(f64::INFINITY, f64::min);
    if nearest.is_finite() {
        nearest
    } else {
        price * 1.05
    }
}
