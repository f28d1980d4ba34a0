//! Yahoo Finance v8 chart API — international last resort.
//!
//! Yahoo has no official API and changes formats without notice, which is why
//! it sits at the bottom of every chain. Symbol grammar: `.SS`/`.SZ` suffix
//! for domestic codes by exchange, 4-digit `.HK` for Hong Kong. Rows come
//! back with Yahoo's capitalized column labels.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::data::sources::http_client;
use crate::domain::{market, Market};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Self {
        Self::with_base_url("https://query2.finance.yahoo.com")
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
                let suffix = if bare.starts_with('6') { "SS" } else { "SZ" };
                Ok(format!("{bare}.{suffix}"))
            }
            Market::Hk => {
                // Yahoo lists Hong Kong equities under 4-digit symbols.
                let padded = market::hk_code(code).ok_or_else(|| SourceError::SymbolNotFound {
                    symbol: code.to_string(),
                })?;
                let n: u32 = padded.parse().expect("hk_code returns digits");
                Ok(format!("{n:04}.HK"))
            }
        }
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawRow>, SourceError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    SourceError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    SourceError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                SourceError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::ResponseFormatChanged("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| SourceError::ResponseFormatChanged("no timestamps".into()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::ResponseFormatChanged("no quote data".into()))?;

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays come through as all-null rows; skip them.
            let (Some(open), Some(close)) = (open, close) else {
                continue;
            };

            rows.push(
                [
                    ("Date", json!(ts)),
                    ("Open", json!(open)),
                    ("High", json!(high.unwrap_or(open.max(close)))),
                    ("Low", json!(low.unwrap_or(open.min(close)))),
                    ("Close", json!(close)),
                    ("Volume", json!(volume.unwrap_or(0))),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<RawRow>(),
            );
        }
        Ok(rows)
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch(&self, code: &str, mkt: Market) -> Result<RawBarBatch, SourceError> {
        let symbol = Self::symbol_for(code, mkt)?;
        let url = format!(
            "{}/v8/finance/chart/{symbol}?range=1y&interval=1d",
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

        let chart: ChartResponse = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;

        let rows = Self::parse_response(&symbol, chart)?;
        if rows.is_empty() {
            return Err(SourceError::EmptyPayload);
        }
        Ok(RawBarBatch::new(rows))
    }
}
