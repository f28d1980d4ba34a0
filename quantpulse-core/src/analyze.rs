//! Analysis facade — the two narrow contracts the pipeline exposes.
//!
//! `fetch_history` hands back a canonical series (possibly empty) and
//! `analyze` runs the full pipeline for one symbol: fetch, snapshot, signal,
//! position plan. Total acquisition failure is a typed no-data value, never
//! an error — only programming faults may panic past this boundary.

use crate::data::HistoryFetcher;
use crate::domain::{Bar, Market};
use crate::etf::EtfCatalog;
use crate::indicators::IndicatorSnapshot;
use crate::risk::{position_size, RiskPlan};
use crate::signal::{generate, Signal, SignalConfig};
use chrono::NaiveDate;
use serde::Serialize;

/// Everything `analyze` derives for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub market: Market,
    pub code: String,
    pub as_of: NaiveDate,
    pub etf: bool,
    pub signal: Signal,
    pub technical: IndicatorSnapshot,
    pub risk_ctrl: RiskPlan,
}

/// Result of an analysis request: a report, or an explicit no-data object
/// when every source was exhausted.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(Box<AnalysisReport>),
    NoData { error: String, code: String },
}

impl AnalysisOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, AnalysisOutcome::NoData { .. })
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Report(report) => Some(report),
            AnalysisOutcome::NoData { .. } => None,
        }
    }
}

/// Stateless single-symbol analyzer. Each call runs one independent pipeline
/// invocation; nothing is cached between calls.
pub struct Analyzer {
    fetcher: HistoryFetcher,
    etf_catalog: EtfCatalog,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(HistoryFetcher::default())
    }
}

impl Analyzer {
    pub fn new(fetcher: HistoryFetcher) -> Self {
        Self {
            fetcher,
            etf_catalog: EtfCatalog::embedded(),
        }
    }

    pub fn with_etf_catalog(mut self, catalog: EtfCatalog) -> Self {
        self.etf_catalog = catalog;
        self
    }

    /// Canonical daily history for a bare exchange code; empty on failure.
    pub fn fetch_history(&self, code: &str) -> Vec<Bar> {
        self.fetcher.fetch_history(code)
    }

    /// Run the full pipeline for one symbol.
    pub fn analyze(&self, code: &str, balance: f64, risk_fraction: f64) -> AnalysisOutcome {
        let code = code.trim();
        let market = Market::from_code(code);

        let bars = self.fetcher.fetch_history(code);
        let Some(last_bar) = bars.last() else {
            return AnalysisOutcome::NoData {
                error: "no data".into(),
                code: code.to_string(),
            };
        };

        let technical = IndicatorSnapshot::compute(&bars);
        let config = SignalConfig::for_market(market);
        let signal = generate(&technical, &config);
        let risk_ctrl = position_size(
            balance,
            risk_fraction,
            technical.current_price,
            signal.stop_loss,
            technical.atr14,
        );

        AnalysisOutcome::Report(Box::new(AnalysisReport {
            market,
            code: code.to_string(),
            as_of: last_bar.date,
            etf: self.etf_catalog.is_etf(code, market, None),
            signal,
            technical,
            risk_ctrl,
        }))
    }
}
