//! Schema normalization — provider rows onto the canonical bar schema.
//!
//! Providers label columns differently (English, Chinese, capitalized) and
//! return numbers as strings as often as not. Normalization maps the six
//! canonical fields by alias, parses dates down to calendar-day granularity,
//! coerces numerics, drops unusable rows, and returns a date-sorted,
//! duplicate-free series. A batch where any of the six fields cannot be
//! located at all yields an empty series rather than partially filled bars.

use crate::data::source::{RawBarBatch, RawRow};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde_json::Value;

const DATE_KEYS: &[&str] = &["date", "日期", "Date", "day", "datetime"];
const OPEN_KEYS: &[&str] = &["open", "开盘", "Open"];
const HIGH_KEYS: &[&str] = &["high", "最高", "High"];
const LOW_KEYS: &[&str] = &["low", "最低", "Low"];
const CLOSE_KEYS: &[&str] = &["close", "收盘", "Close"];
const VOLUME_KEYS: &[&str] = &["volume", "成交量", "Volume", "vol", "成交"];

/// Normalize a provider batch into a canonical bar series.
///
/// Returns an empty vec when the batch is empty, when any canonical field
/// cannot be located, or when no row survives coercion.
pub fn normalize(batch: RawBarBatch) -> Vec<Bar> {
    let Some(first) = batch.rows.first() else {
        return Vec::new();
    };

    // All six fields must resolve on the leading row, or the whole batch is
    // rejected — a half-mapped schema produces garbage indicators downstream.
    let all_located = [
        DATE_KEYS,
        OPEN_KEYS,
        HIGH_KEYS,
        LOW_KEYS,
        CLOSE_KEYS,
        VOLUME_KEYS,
    ]
    .iter()
    .all(|aliases| locate(first, aliases).is_some());
    if !all_located {
        return Vec::new();
    }

    let mut bars: Vec<Bar> = batch
        .rows
        .iter()
        .filter_map(row_to_bar)
        .collect();

    bars.sort_by_key(|b| b.date);
    // Duplicate dates: keep the first occurrence, matching the sort-then-
    // unique-stable policy used at ingest.
    bars.dedup_by_key(|b| b.date);
    bars
}

fn row_to_bar(row: &RawRow) -> Option<Bar> {
    let date = parse_date(locate(row, DATE_KEYS)?)?;
    let open = coerce_f64(locate(row, OPEN_KEYS)?);
    let close = coerce_f64(locate(row, CLOSE_KEYS)?);
    // A bar without an open or close is useless for every indicator.
    if !open.is_finite() || !close.is_finite() {
        return None;
    }

    let envelope_high = open.max(close);
    let envelope_low = open.min(close);
    let high = locate(row, HIGH_KEYS)
        .map(coerce_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(envelope_high);
    let low = locate(row, LOW_KEYS)
        .map(coerce_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(envelope_low);
    let volume = locate(row, VOLUME_KEYS)
        .map(coerce_f64)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0);

    let bar = Bar {
        date,
        open,
        high,
        low,
        close,
        volume,
    };
    bar.is_finite().then_some(bar)
}

fn locate<'a>(row: &'a RawRow, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| row.get(*key))
}

/// Coerce a JSON value to f64, treating anything non-numeric as missing.
fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim().replace(',', "");
            s.parse::<f64>().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Parse a provider date value to calendar-day granularity.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD`, datetime strings (the
/// time-of-day and any zone suffix are discarded), and numeric dates
/// (`20240102` or epoch seconds).
fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => {
            let v = n.as_i64()?;
            if (19_000_101..=99_991_231).contains(&v) {
                parse_yyyymmdd(v)
            } else {
                chrono::DateTime::from_timestamp(v, 0).map(|dt| dt.date_naive())
            }
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    // Take the date part of a datetime ("2024-01-02 15:00:00", "...T15:00Z").
    let head = s.split(|c| c == ' ' || c == 'T').next()?.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(head, fmt) {
            return Some(d);
        }
    }
    if head.len() == 8 && head.chars().all(|c| c.is_ascii_digit()) {
        return parse_yyyymmdd(head.parse().ok()?);
    }
    None
}

fn parse_yyyymmdd(v: i64) -> Option<NaiveDate> {
    let year = (v / 10_000) as i32;
    let month = ((v / 100) % 100) as u32;
    let day = (v % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn english_row(date: &str, open: f64, close: f64) -> RawRow {
        row(&[
            ("date", json!(date)),
            ("open", json!(open)),
            ("high", json!(open.max(close) + 0.5)),
            ("low", json!(open.min(close) - 0.5)),
            ("close", json!(close)),
            ("volume", json!(1000.0)),
        ])
    }

    #[test]
    fn maps_chinese_labels() {
        let batch = RawBarBatch::new(vec![row(&[
            ("日期", json!("2024-01-02")),
            ("开盘", json!("10.00")),
            ("最高", json!("10.40")),
            ("最低", json!("9.90")),
            ("收盘", json!("10.20")),
            ("成交量", json!("123456")),
        ])]);
        let bars = normalize(batch);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 10.0);
        assert_eq!(bars[0].close, 10.2);
        assert_eq!(bars[0].volume, 123456.0);
    }

    #[test]
    fn rejects_batch_missing_a_field() {
        // No close column anywhere: the whole batch is unusable.
        let batch = RawBarBatch::new(vec![row(&[
            ("date", json!("2024-01-02")),
            ("open", json!(10.0)),
            ("high", json!(10.5)),
            ("low", json!(9.8)),
            ("volume", json!(1000)),
        ])]);
        assert!(normalize(batch).is_empty());
    }

    #[test]
    fn drops_rows_missing_open_or_close() {
        let mut bad = english_row("2024-01-03", 10.0, 10.2);
        bad.insert("close".into(), json!("n/a"));
        let batch = RawBarBatch::new(vec![english_row("2024-01-02", 10.0, 10.2), bad]);
        let bars = normalize(batch);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn sorts_ascending_and_dedupes_dates() {
        let batch = RawBarBatch::new(vec![
            english_row("2024-01-04", 11.0, 11.1),
            english_row("2024-01-02", 10.0, 10.1),
            english_row("2024-01-02", 99.0, 99.0), // duplicate date, dropped
            english_row("2024-01-03", 10.5, 10.6),
        ]);
        let bars = normalize(batch);
        assert_eq!(bars.len(), 3);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        // First occurrence of the duplicate date wins.
        assert_eq!(bars[0].open, 10.0);
    }

    #[test]
    fn discards_time_of_day() {
        let batch = RawBarBatch::new(vec![row(&[
            ("datetime", json!("2024-01-02 15:00:00")),
            ("open", json!(10.0)),
            ("high", json!(10.5)),
            ("low", json!(9.8)),
            ("close", json!(10.2)),
            ("vol", json!(500)),
        ])]);
        let bars = normalize(batch);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn parses_compact_and_numeric_dates() {
        let batch = RawBarBatch::new(vec![
            row(&[
                ("date", json!("20240102")),
                ("open", json!(10.0)),
                ("high", json!(10.5)),
                ("low", json!(9.8)),
                ("close", json!(10.2)),
                ("volume", json!(500)),
            ]),
            row(&[
                ("date", json!(20240103)),
                ("open", json!(10.2)),
                ("high", json!(10.6)),
                ("low", json!(10.0)),
                ("close", json!(10.4)),
                ("volume", json!(600)),
            ]),
        ]);
        let bars = normalize(batch);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn repairs_missing_high_low_from_envelope() {
        let batch = RawBarBatch::new(vec![row(&[
            ("date", json!("2024-01-02")),
            ("open", json!(10.0)),
            ("high", json!("-")),
            ("low", json!("-")),
            ("close", json!(10.4)),
            ("volume", json!(500)),
        ])]);
        let bars = normalize(batch);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].high, 10.4);
        assert_eq!(bars[0].low, 10.0);
    }

    #[test]
    fn empty_batch_yields_empty_series() {
        assert!(normalize(RawBarBatch::default()).is_empty());
    }
}
