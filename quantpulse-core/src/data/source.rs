//! Source adapter contract and structured error types.
//!
//! The `BarSource` trait abstracts over upstream history providers so the
//! fallback chain can walk a fixed priority list without caring about
//! transport or payload shape. Each adapter owns its symbol grammar and
//! converts its provider payload into loosely keyed rows; the normalizer maps
//! those onto the canonical schema.

use crate::domain::Market;
use serde_json::{Map, Value};
use thiserror::Error;

/// One loosely typed row from a provider response, keyed however the
/// provider labels its columns (English, Chinese, capitalized).
pub type RawRow = Map<String, Value>;

/// Provider-specific record set returned by a single adapter call.
///
/// Owned transiently: the normalizer consumes it and nothing survives past
/// the pipeline invocation.
#[derive(Debug, Clone, Default)]
pub struct RawBarBatch {
    pub rows: Vec<RawRow>,
}

impl RawBarBatch {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Structured error types for adapter calls.
///
/// These cover the ordinary failure modes of unreliable upstreams. Adapters
/// return them instead of panicking; the fallback chain logs each one and
/// moves on to the next source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited by provider (HTTP {status})")]
    RateLimited { status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("empty payload from provider")]
    EmptyPayload,

    #[error("source error: {0}")]
    Other(String),
}

impl SourceError {
    /// Map a transport error onto the taxonomy.
    pub(crate) fn from_http(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else if err.is_connect() {
            SourceError::NetworkUnreachable(err.to_string())
        } else {
            SourceError::Other(err.to_string())
        }
    }

    /// Map a non-success HTTP status onto the taxonomy.
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            SourceError::RateLimited {
                status: status.as_u16(),
            }
        } else {
            SourceError::Other(format!("HTTP {status}"))
        }
    }
}

/// Source adapter contract.
///
/// Implementations must never panic across this boundary for ordinary
/// failures (timeout, malformed payload, empty result, unknown symbol) —
/// those come back as `Err` and the orchestrator continues down the chain.
pub trait BarSource: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch a window of daily bars for one symbol.
    fn fetch(&self, code: &str, market: Market) -> Result<RawBarBatch, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_reports_empty() {
        let batch = RawBarBatch::default();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = SourceError::SymbolNotFound {
            symbol: "600000".into(),
        };
        assert!(err.to_string().contains("600000"));

        let err = SourceError::RateLimited { status: 429 };
        assert!(err.to_string().contains("429"));
    }
}
