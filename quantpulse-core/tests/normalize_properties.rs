//! Property tests for the normalizer.
//!
//! Uses proptest to verify:
//! 1. Output invariants — sorted ascending, unique dates, finite fields —
//!    hold for arbitrary well-formed provider batches, shuffled or not.
//! 2. Idempotence — normalizing an already-canonical series reproduces it
//!    exactly.
//! 3. Junk rows never panic the normalizer; they are dropped or rejected.

use chrono::NaiveDate;
use proptest::prelude::*;
use quantpulse_core::data::{normalize, RawBarBatch, RawRow};
use quantpulse_core::Bar;
use serde_json::json;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn row_for(bar: &Bar) -> RawRow {
    [
        ("date", json!(bar.date.format("%Y-%m-%d").to_string())),
        ("open", json!(bar.open)),
        ("high", json!(bar.high)),
        ("low", json!(bar.low)),
        ("close", json!(bar.close)),
        ("volume", json!(bar.volume)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Arbitrary canonical-ish day: offset plus plausible OHLCV. Offsets stay
/// below 100 so generated dates never collide with the fixed junk-row date.
fn arb_day() -> impl Strategy<Value = (u16, f64, f64)> {
    (0u16..100, 1.0..500.0f64, 0.0..1e7f64)
}

proptest! {
    /// Whatever order rows arrive in, the output is date-sorted, duplicate
    /// free, and every field is finite.
    #[test]
    fn output_is_canonical(days in proptest::collection::vec(arb_day(), 1..60)) {
        let rows: Vec<RawRow> = days
            .iter()
            .map(|&(offset, close, volume)| {
                let bar = Bar {
                    date: base_date() + chrono::Duration::days(offset as i64),
                    open: close * 0.99,
                    high: close * 1.02,
                    low: close * 0.97,
                    close,
                    volume,
                };
                row_for(&bar)
            })
            .collect();

        let bars = normalize(RawBarBatch::new(rows));

        prop_assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        prop_assert!(bars.iter().all(Bar::is_finite));

        let unique_dates: std::collections::BTreeSet<_> =
            days.iter().map(|d| d.0).collect();
        prop_assert_eq!(bars.len(), unique_dates.len());
    }

    /// normalize ∘ normalize == normalize: re-normalizing a canonical series
    /// reproduces it bar for bar.
    #[test]
    fn renormalizing_is_idempotent(days in proptest::collection::vec(arb_day(), 1..60)) {
        let rows: Vec<RawRow> = days
            .iter()
            .map(|&(offset, close, volume)| {
                let bar = Bar {
                    date: base_date() + chrono::Duration::days(offset as i64),
                    open: close,
                    high: close * 1.01,
                    low: close * 0.99,
                    close,
                    volume,
                };
                row_for(&bar)
            })
            .collect();

        let once = normalize(RawBarBatch::new(rows));
        let twice = normalize(RawBarBatch::new(once.iter().map(row_for).collect()));
        prop_assert_eq!(once, twice);
    }

    /// Rows with junk numerics are dropped, never panicked on, and never
    /// leak non-finite values.
    #[test]
    fn junk_rows_are_dropped(
        days in proptest::collection::vec(arb_day(), 1..30),
        junk in "[a-z-]{1,8}",
    ) {
        let mut rows: Vec<RawRow> = days
            .iter()
            .map(|&(offset, close, volume)| {
                let bar = Bar {
                    date: base_date() + chrono::Duration::days(offset as i64),
                    open: close,
                    high: close * 1.01,
                    low: close * 0.99,
                    close,
                    volume,
                };
                row_for(&bar)
            })
            .collect();

        let mut bad: RawRow = rows[0].clone();
        bad.insert("date".into(), json!("2023-06-01"));
        bad.insert("close".into(), json!(junk));
        rows.push(bad);

        let bars = normalize(RawBarBatch::new(rows));
        prop_assert!(bars.iter().all(Bar::is_finite));
        prop_assert!(bars
            .iter()
            .all(|b| b.date != NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()));
    }
}
