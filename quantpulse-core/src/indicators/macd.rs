//! Moving Average Convergence Divergence (MACD).
//!
//! Line: EMA12 - EMA26 of close. Signal: EMA9 of the line. Histogram:
//! line - signal. With the first-value EMA seed, all three series are defined
//! from index 0. The cross state compares the last two line/signal pairs.

use crate::indicators::ema_series;
use serde::{Deserialize, Serialize};

const FAST_PERIOD: usize = 12;
const SLOW_PERIOD: usize = 26;
const SIGNAL_PERIOD: usize = 9;

/// MACD line, signal and histogram series, same length as the input.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Whether the MACD line has just crossed its signal line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdCross {
    Golden,
    Death,
    #[default]
    None,
}

/// Compute the 12/26/9 MACD series over close prices.
pub fn macd_series(closes: &[f64]) -> MacdSeries {
    let fast = ema_series(closes, FAST_PERIOD);
    let slow = ema_series(closes, SLOW_PERIOD);

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&line, SIGNAL_PERIOD);
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

/// Detect a cross at the last bar: golden when the line has just moved above
/// the signal, death when just below, none otherwise (including series too
/// short to have a previous bar).
pub fn cross_state(line: &[f64], signal: &[f64]) -> MacdCross {
    let n = line.len().min(signal.len());
    if n < 2 {
        return MacdCross::None;
    }

    let prev = line[n - 2] - signal[n - 2];
    let curr = line[n - 1] - signal[n - 1];

    if prev <= 0.0 && curr > 0.0 {
        MacdCross::Golden
    } else if prev >= 0.0 && curr < 0.0 {
        MacdCross::Death
    } else {
        MacdCross::None
    }
}
