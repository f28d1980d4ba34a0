//! EastMoney forward-adjusted daily history — the primary high-confidence
//! source. The fallback chain grants this adapter (and only this one) a
//! local retry.
//!
//! Response rows carry the vendor's published Chinese column labels
//! (日期/开盘/收盘/最高/最低/成交量); the normalizer maps them by alias.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::data::sources::http_client;
use crate::domain::{market, Market};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct HistResponse {
    data: Option<HistData>,
}

#[derive(Debug, Deserialize)]
struct HistData {
    klines: Option<Vec<String>>,
}

pub struct EastMoneyDailyAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl EastMoneyDailyAdapter {
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

    /// Kline fields with fields2=f51..f57: date, open, close, high, low,
    /// volume, amount. Rows are labeled the way the vendor documents them.
    fn parse_kline(line: &str) -> Option<RawRow> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 6 {
            return None;
        }
        Some(
            [
                ("日期", json!(fields[0])),
                ("开盘", json!(fields[1])),
                ("收盘", json!(fields[2])),
                ("最高", json!(fields[3])),
                ("最低", json!(fields[4])),
                ("成交量", json!(fields[5])),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }
}

impl Default for EastMoneyDailyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for EastMoneyDailyAdapter {
    fn name(&self) -> &'static str {
        "eastmoney_daily"
    }

    fn fetch(&self, code: &str, _market: Market) -> Result<RawBarBatch, SourceError> {
        let url = format!(
            "{}/api/qt/stock/kline/get?secid={}&fields1=f1,f2,f3&fields2=f51,f52,f53,f54,f55,f56,f57&klt=101&fqt=1&beg=19900101&end=20500101",
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

        let body: HistResponse = resp
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
    use crate::data::normalize::normalize;

    #[test]
    fn rows_carry_vendor_labels() {
        let row = EastMoneyDailyAdapter::parse_kline(
            "2024-01-02,10.00,10.20,10.40,9.90,123456,1267890.0",
        )
        .unwrap();
        assert_eq!(row["日期"], "2024-01-02");
        assert_eq!(row["收盘"], "10.20");
        assert!(row.get("close").is_none());
    }

    #[test]
    fn labeled_rows_normalize_cleanly() {
        let rows = vec![
            EastMoneyDailyAdapter::parse_kline("2024-01-02,10.00,10.20,10.40,9.90,100,0").unwrap(),
            EastMoneyDailyAdapter::parse_kline("2024-01-03,10.20,10.30,10.50,10.10,120,0").unwrap(),
        ];
        let bars = normalize(RawBarBatch::new(rows));
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 10.2);
    }
}
