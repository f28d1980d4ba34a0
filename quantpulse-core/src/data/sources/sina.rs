//! Sina quotes service — legacy backup for the domestic chain and the
//! official-vendor analogue on the Hong Kong chain.
//!
//! Response shape: a JSON array of day objects with a `day` date key and
//! string-valued OHLCV fields. Symbol grammar: composite `sh600000` for the
//! domestic market, `hk00700` (zero-padded to five digits) for Hong Kong.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::data::sources::http_client;
use crate::domain::{market, Market};
use serde_json::Value;

pub struct SinaAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl SinaAdapter {
    pub fn new() -> Self {
        Self::with_base_url("https://money.finance.sina.com.cn")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }

    fn symbol_for(code: &str, mkt: Market) -> Result<String, SourceError> {
        match mkt {
            Market::Cn => {
                let bare = market::bare_code(code);
                Ok(format!("{}{bare}", market::exchange_prefix(bare)))
            }
            Market::Hk => market::hk_code(code)
                .map(|padded| format!("hk{padded}"))
                .ok_or_else(|| SourceError::SymbolNotFound {
                    symbol: code.to_string(),
                }),
        }
    }

    fn rows_from_array(body: &Value) -> Option<Vec<RawRow>> {
        let days = body.as_array()?;
        Some(
            days.iter()
                .filter_map(|day| day.as_object().cloned())
                .collect(),
        )
    }
}

impl Default for SinaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for SinaAdapter {
    fn name(&self) -> &'static str {
        "sina"
    }

    fn fetch(&self, code: &str, mkt: Market) -> Result<RawBarBatch, SourceError> {
        let symbol = Self::symbol_for(code, mkt)?;
        let url = format!(
            "{}/quotes_service/api/json_v2.php/CN_MarketData.getKLineData?symbol={symbol}&scale=240&ma=no&datalen=320",
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

        let rows = Self::rows_from_array(&body).ok_or_else(|| {
            SourceError::ResponseFormatChanged("expected a JSON array of day objects".into())
        })?;
        if rows.is_empty() {
            return Err(SourceError::EmptyPayload);
        }
        Ok(RawBarBatch::new(rows))
    }
}
