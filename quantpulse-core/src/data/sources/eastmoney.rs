//! EastMoney kline API — fastest and most stable source, first in the chain.
//!
//! Symbol grammar: `secid` is `{exchange}.{code}` where the exchange digit is
//! 1 for Shanghai (codes leading with 6) and 0 for Shenzhen. Response shape:
//! `data.klines` is an array of comma-joined strings, one per day, fields
//! ordered date, open, close, high, low, volume.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::data::sources::http_client;
use crate::domain::{market, Market};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct KlineResponse {
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    klines: Option<Vec<String>>,
}

pub struct EastMoneyAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl EastMoneyAdapter {
    pub fn new() -> Self {
        Self::with_base_url("https://push2his.eastmoney.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }

    fn secid(code: &str) -> String {
        let bare = market::bare_code(code);
        let exchange = if bare.starts_with('6') { 1 } else { 0 };
        format!("{exchange}.{bare}")
    }

    /// Split one kline string into a keyed row.
    fn parse_kline(line: &str) -> Option<RawRow> {
        let mut fields = line.split(',');
        let date = fields.next()?;
        let open = fields.next()?;
        let close = fields.next()?;
        let high = fields.next()?;
        let low = fields.next()?;
        let volume = fields.next()?;
        Some(
            [
                ("date", json!(date)),
                ("open", json!(open)),
                ("close", json!(close)),
                ("high", json!(high)),
                ("low", json!(low)),
                ("volume", json!(volume)),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }
}

impl Default for EastMoneyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for EastMoneyAdapter {
    fn name(&self) -> &'static str {
        "eastmoney"
    }

    fn fetch(&self, code: &str, _market: Market) -> Result<RawBarBatch, SourceError> {
        let url = format!(
            "{}/api/qt/stock/kline/get?secid={}&fields1=f1,f2,f3&fields2=f51,f52,f53,f54,f55,f56&klt=101&fqt=1&end=20500101&lmt=320",
            self.base_url,
            Self::secid(code)
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(SourceError::from_http)?;
        if !resp.status().is_success() {
            return Err(SourceError::from_status(resp.status()));
        }

        let body: KlineResponse = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;

        let klines = body
            .data
            .and_then(|d| d.klines)
            .ok_or_else(|| SourceError::SymbolNotFound {
                symbol: code.to_string(),
            })?;
        if klines.is_empty() {
            return Err(SourceError::EmptyPayload);
        }

        let rows = klines
            .iter()
            .filter_map(|line| Self::parse_kline(line))
            .collect();
        Ok(RawBarBatch::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secid_uses_exchange_digit() {
        assert_eq!(EastMoneyAdapter::secid("600000"), "1.600000");
        assert_eq!(EastMoneyAdapter::secid("000001"), "0.000001");
        assert_eq!(EastMoneyAdapter::secid("sz300750"), "0.300750");
    }

    #[test]
    fn kline_splits_into_keyed_row() {
        let row =
            EastMoneyAdapter::parse_kline("2024-01-02,10.00,10.20,10.40,9.90,123456").unwrap();
        assert_eq!(row["date"], "2024-01-02");
        assert_eq!(row["open"], "10.00");
        assert_eq!(row["close"], "10.20");
        assert_eq!(row["volume"], "123456");
    }

    #[test]
    fn truncated_kline_is_skipped() {
        assert!(EastMoneyAdapter::parse_kline("2024-01-02,10.00").is_none());
    }
}
