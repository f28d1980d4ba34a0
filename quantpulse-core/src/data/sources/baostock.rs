//! Baostock — the official-vendor backup source.
//!
//! Symbol grammar: dot-separated `sh.600000`/`sz.000001`. Response shape: a
//! field-name list plus row arrays (`fields` + `data`), zipped into keyed
//! rows here. The request window is the trailing year.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::data::sources::http_client;
use crate::domain::{market, Market};
use chrono::{Duration, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    error_code: String,
    #[serde(default)]
    error_msg: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<serde_json::Value>>,
}

pub struct BaostockAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BaostockAdapter {
    pub fn new() -> Self {
        Self::with_base_url("http://www.baostock.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }

    fn dotted_symbol(code: &str) -> String {
        let bare = market::bare_code(code);
        format!("{}.{bare}", market::exchange_prefix(bare))
    }

    fn zip_rows(fields: &[String], data: &[Vec<serde_json::Value>]) -> Vec<RawRow> {
        data.iter()
            .map(|row| {
                fields
                    .iter()
                    .zip(row.iter())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .collect()
    }
}

impl Default for BaostockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for BaostockAdapter {
    fn name(&self) -> &'static str {
        "baostock"
    }

    fn fetch(&self, code: &str, _market: Market) -> Result<RawBarBatch, SourceError> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(365);
        let url = format!(
            "{}/api/query_history_k_data?code={}&fields=date,open,high,low,close,volume&frequency=d&adjustflag=1&start_date={}&end_date={}",
            self.base_url,
            Self::dotted_symbol(code),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(SourceError::from_http)?;
        if !resp.status().is_success() {
            return Err(SourceError::from_status(resp.status()));
        }

        let body: QueryResponse = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;

        if body.error_code != "0" {
            return Err(SourceError::Other(format!(
                "baostock error {}: {}",
                body.error_code, body.error_msg
            )));
        }
        if body.data.is_empty() {
            return Err(SourceError::EmptyPayload);
        }

        Ok(RawBarBatch::new(Self::zip_rows(&body.fields, &body.data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_symbol_grammar() {
        assert_eq!(BaostockAdapter::dotted_symbol("600000"), "sh.600000");
        assert_eq!(BaostockAdapter::dotted_symbol("000001"), "sz.000001");
    }

    #[test]
    fn zips_fields_with_row_arrays() {
        let fields: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
            .into_iter()
            .map(String::from)
            .collect();
        let data = vec![vec![
            json!("2024-01-02"),
            json!("10.00"),
            json!("10.40"),
            json!("9.90"),
            json!("10.20"),
            json!("123456"),
        ]];
        let rows = BaostockAdapter::zip_rows(&fields, &data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["date"], "2024-01-02");
        assert_eq!(rows[0]["volume"], "123456");
    }

    #[test]
    fn error_code_body_parses() {
        let body: QueryResponse = serde_json::from_str(
            r#"{"error_code":"10001","error_msg":"symbol unknown"}"#,
        )
        .unwrap();
        assert_eq!(body.error_code, "10001");
        assert!(body.data.is_empty());
    }
}
