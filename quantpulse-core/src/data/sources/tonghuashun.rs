//! Tonghuashun line API — independent source, third HTTP fallback.
//!
//! Response shape: a JSONP-wrapped object whose `data` field is one string of
//! semicolon-separated days, each day a comma-joined record ordered date
//! (YYYYMMDD), open, high, low, close, volume.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::data::sources::http_client;
use crate::domain::{market, Market};
use serde_json::{json, Value};

pub struct TonghuashunAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TonghuashunAdapter {
    pub fn new() -> Self {
        Self::with_base_url("https://d.10jqka.com.cn")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }

    /// Strip the JSONP callback wrapper: `cb({...})` -> `{...}`.
    fn strip_jsonp(body: &str) -> Option<&str> {
        let start = body.find('(')?;
        let end = body.rfind(')')?;
        (start < end).then(|| &body[start + 1..end])
    }

    fn parse_day(record: &str) -> Option<RawRow> {
        let fields: Vec<&str> = record.split(',').collect();
        if fields.len() < 6 {
            return None;
        }
        Some(
            [
                ("date", json!(fields[0])),
                ("open", json!(fields[1])),
                ("high", json!(fields[2])),
                ("low", json!(fields[3])),
                ("close", json!(fields[4])),
                ("volume", json!(fields[5])),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }

    fn parse_body(body: &str) -> Result<Vec<RawRow>, SourceError> {
        let inner = Self::strip_jsonp(body)
            .ok_or_else(|| SourceError::ResponseFormatChanged("missing JSONP wrapper".into()))?;
        let value: Value = serde_json::from_str(inner)
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;
        let data = value
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| SourceError::ResponseFormatChanged("missing data string".into()))?;

        Ok(data
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .filter_map(Self::parse_day)
            .collect())
    }
}

impl Default for TonghuashunAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for TonghuashunAdapter {
    fn name(&self) -> &'static str {
        "tonghuashun"
    }

    fn fetch(&self, code: &str, _market: Market) -> Result<RawBarBatch, SourceError> {
        let bare = market::bare_code(code);
        let url = format!("{}/v6/line/hs_{bare}/01/last.js", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header("Referer", "https://stockpage.10jqka.com.cn/")
            .send()
            .map_err(SourceError::from_http)?;
        if !resp.status().is_success() {
            return Err(SourceError::from_status(resp.status()));
        }

        let text = resp.text().map_err(SourceError::from_http)?;
        let rows = Self::parse_body(&text)?;
        if rows.is_empty() {
            return Err(SourceError::EmptyPayload);
        }
        Ok(RawBarBatch::new(rows))
    }
}
