//! Tencent fqkline — high-availability HTTP fallback.
//!
//! Symbol grammar: composite `sh600000`/`sz000001`. Response shape: a nested
//! map keyed by the composite symbol, with day bars as list-of-list rows
//! ordered date, open, close, high, low, volume (plus trailing extras).
//! Forward-adjusted responses come back under `qfqday`, plain ones under
//! `day`.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::data::sources::http_client;
use crate::domain::{market, Market};
use serde_json::{json, Value};

pub struct TencentAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TencentAdapter {
    pub fn new() -> Self {
        Self::with_base_url("https://web.ifzq.gtimg.cn")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }

    fn composite_symbol(code: &str) -> String {
        let bare = market::bare_code(code);
        format!("{}{bare}", market::exchange_prefix(bare))
    }

    fn row_from_list(row: &Value) -> Option<RawRow> {
        let fields = row.as_array()?;
        if fields.len() < 6 {
            return None;
        }
        Some(
            [
                ("date", fields[0].clone()),
                ("open", fields[1].clone()),
                ("close", fields[2].clone()),
                ("high", fields[3].clone()),
                ("low", fields[4].clone()),
                ("volume", fields[5].clone()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }

    fn extract_rows(body: &Value, symbol: &str) -> Option<Vec<RawRow>> {
        let per_symbol = body.get("data")?.get(symbol)?;
        let days = per_symbol
            .get("qfqday")
            .or_else(|| per_symbol.get("day"))?
            .as_array()?;
        Some(days.iter().filter_map(Self::row_from_list).collect())
    }
}

impl Default for TencentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for TencentAdapter {
    fn name(&self) -> &'static str {
        "tencent"
    }

    fn fetch(&self, code: &str, _market: Market) -> Result<RawBarBatch, SourceError> {
        let symbol = Self::composite_symbol(code);
        let url = format!(
            "{}/appstock/app/fqkline/get?param={symbol},day,,,320,qfq",
            self.base_url
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(SourceError::from_http)?;
        if !resp.status().is_success() {
            return Err(SourceError::from_status(resp.status()));
        }

        let body: Value = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;

        let rows = Self::extract_rows(&body, &symbol).ok_or_else(|| {
            SourceError::ResponseFormatChanged(format!("no day bars under '{symbol}'"))
        })?;
        if rows.is_empty() {
            return Err(SourceError::EmptyPayload);
        }
        Ok(RawBarBatch::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_symbol_grammar() {
        assert_eq!(TencentAdapter::composite_symbol("600000"), "sh600000");
        assert_eq!(TencentAdapter::composite_symbol("000001"), "sz000001");
    }

    #[test]
    fn extracts_list_of_list_rows() {
        let body = json!({
            "data": {
                "sh600000": {
                    "qfqday": [
                        ["2024-01-02", "10.00", "10.20", "10.40", "9.90", "123456", "ignored"],
                        ["2024-01-03", "10.20", "10.30", "10.50", "10.10", "98765"]
                    ]
                }
            }
        });
        let rows = TencentAdapter::extract_rows(&body, "sh600000").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["close"], "10.20");
        assert_eq!(rows[1]["date"], "2024-01-03");
    }

    #[test]
    fn falls_back_to_plain_day_key() {
        let body = json!({
            "data": {
                "sz000001": {
                    "day": [["2024-01-02", "9.0", "9.1", "9.2", "8.9", "100"]]
                }
            }
        });
        let rows = TencentAdapter::extract_rows(&body, "sz000001").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_symbol_key_is_none() {
        let body = json!({"data": {}});
        assert!(TencentAdapter::extract_rows(&body, "sh600000").is_none());
    }
}
