//! quantpulse core — multi-source market data acquisition, technical
//! indicators, signal scoring, and risk-based position sizing.
//!
//! The pipeline runs strictly left to right for one symbol per invocation:
//! code → fallback fetch across eight source adapters → canonical bar series
//! → indicator snapshot → scored signal with ATR-scaled risk levels →
//! lot-rounded position plan. Nothing is cached or shared between
//! invocations; callers may analyze many symbols concurrently by running
//! independent pipelines.

pub mod analyze;
pub mod data;
pub mod domain;
pub mod etf;
pub mod indicators;
pub mod risk;
pub mod signal;

pub use analyze::{AnalysisOutcome, AnalysisReport, Analyzer};
pub use data::{BarSource, ChainEntry, HistoryFetcher, RawBarBatch, SourceError};
pub use domain::{Bar, Market};
pub use indicators::IndicatorSnapshot;
pub use risk::RiskPlan;
pub use signal::{Signal, SignalConfig, SignalLabel};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types handed across pipeline boundaries are
    /// Send + Sync, so callers can fan out per-symbol invocations on threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Market>();
        require_sync::<Market>();
        require_send::<IndicatorSnapshot>();
        require_sync::<IndicatorSnapshot>();
        require_send::<Signal>();
        require_sync::<Signal>();
        require_send::<RiskPlan>();
        require_sync::<RiskPlan>();
        require_send::<AnalysisOutcome>();
        require_sync::<AnalysisOutcome>();
        require_send::<HistoryFetcher>();
        require_sync::<HistoryFetcher>();
        require_send::<Analyzer>();
        require_sync::<Analyzer>();
    }
}
