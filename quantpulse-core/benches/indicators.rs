//! Criterion benchmarks for the indicator hot path.
//!
//! The snapshot is recomputed from scratch on every analysis request, so the
//! full-series cost over a typical one-year window is what matters.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::NaiveDate;
use quantpulse_core::indicators::{macd_series, rsi_series, IndicatorSnapshot};
use quantpulse_core::Bar;

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000.0 + (i % 500_000) as f64,
            }
        })
        .collect()
}

fn bench_snapshot(c: &mut Criterion) {
    let bars = make_bars(320);
    c.bench_function("snapshot_320_bars", |b| {
        b.iter(|| IndicatorSnapshot::compute(black_box(&bars)))
    });
}

fn bench_series(c: &mut Criterion) {
    let closes: Vec<f64> = make_bars(320).iter().map(|b| b.close).collect();

    c.bench_function("macd_320", |b| {
        b.iter(|| macd_series(black_box(&closes)))
    });
    c.bench_function("rsi14_320", |b| {
        b.iter(|| rsi_series(black_box(&closes), 14))
    });
}

criterion_group!(benches, bench_snapshot, bench_series);
criterion_main!(benches);
