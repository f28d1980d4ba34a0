//! Fallback orchestrator — walks a fixed priority chain of source adapters.
//!
//! The chain is strictly sequential: a later adapter is only tried after the
//! earlier one has conclusively failed or returned too little data. Upstreams
//! rate-limit aggressively, so there is no speculative fan-out; instead one
//! randomized pre-call delay per request spreads synchronized load.

use crate::data::normalize::normalize;
use crate::data::source::BarSource;
use crate::data::sources::{
    BaostockAdapter, EastMoneyAdapter, EastMoneyDailyAdapter, SinaAdapter, TdxAdapter,
    TencentAdapter, TonghuashunAdapter, YahooAdapter,
};
use crate::domain::{Bar, Market};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

/// Minimum accepted series length on the domestic chain.
const MIN_CN_BARS: usize = 30;

/// One slot in a priority chain. `attempts > 1` is reserved for the primary
/// high-confidence adapter; everything else gets a single shot.
pub struct ChainEntry {
    source: Box<dyn BarSource>,
    attempts: u32,
}

impl ChainEntry {
    pub fn once(source: Box<dyn BarSource>) -> Self {
        Self {
            source,
            attempts: 1,
        }
    }

    pub fn with_attempts(source: Box<dyn BarSource>, attempts: u32) -> Self {
        Self {
            source,
            attempts: attempts.max(1),
        }
    }
}

/// History acquisition with per-market fallback chains.
///
/// `fetch_history` never fails: total exhaustion of a chain yields an empty
/// series, which callers treat as "no data available".
pub struct HistoryFetcher {
    cn_chain: Vec<ChainEntry>,
    hk_chain: Vec<ChainEntry>,
    /// Randomized pre-call delay bounds in milliseconds; `None` disables it.
    jitter_ms: Option<(u64, u64)>,
    retry_backoff: Duration,
}

impl Default for HistoryFetcher {
    fn default() -> Self {
        let cn_chain = vec![
            ChainEntry::once(Box::new(EastMoneyAdapter::new())),
            // Primary high-confidence source: the only adapter granted a
            // local retry.
            ChainEntry::with_attempts(Box::new(EastMoneyDailyAdapter::new()), 2),
            ChainEntry::once(Box::new(TencentAdapter::new())),
            ChainEntry::once(Box::new(TonghuashunAdapter::new())),
            ChainEntry::once(Box::new(TdxAdapter::new())),
            ChainEntry::once(Box::new(BaostockAdapter::new())),
            ChainEntry::once(Box::new(SinaAdapter::new())),
            ChainEntry::once(Box::new(YahooAdapter::new())),
        ];
        let hk_chain = vec![
            ChainEntry::once(Box::new(SinaAdapter::new())),
            ChainEntry::once(Box::new(YahooAdapter::new())),
        ];
        Self::new(cn_chain, hk_chain)
    }
}

impl HistoryFetcher {
    pub fn new(cn_chain: Vec<ChainEntry>, hk_chain: Vec<ChainEntry>) -> Self {
        Self {
            cn_chain,
            hk_chain,
            jitter_ms: Some((500, 1500)),
            retry_backoff: Duration::from_secs(1),
        }
    }

    /// Override the pre-call jitter bounds; `None` disables the delay.
    pub fn with_jitter(mut self, jitter_ms: Option<(u64, u64)>) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// Override the backoff between local retries of the primary adapter.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Fetch a canonical daily-bar series for a bare exchange code.
    ///
    /// Routes by code shape, walks the market's chain in priority order, and
    /// accepts the first normalized series meeting the market's minimum
    /// length. Returns an empty series when every adapter is exhausted.
    pub fn fetch_history(&self, code: &str) -> Vec<Bar> {
        let code = code.trim();
        let market = Market::from_code(code);
        let (chain, min_bars) = match market {
            Market::Cn => (&self.cn_chain, MIN_CN_BARS),
            // Last-resort path: any non-empty series is better than nothing.
            Market::Hk => (&self.hk_chain, 1),
        };

        // One jitter per request, not per adapter.
        self.apply_jitter();

        for entry in chain {
            for attempt in 0..entry.attempts {
                if attempt > 0 {
                    std::thread::sleep(self.retry_backoff);
                }
                match entry.source.fetch(code, market) {
                    Ok(batch) => {
                        let bars = normalize(batch);
                        if bars.len() >= min_bars {
                            debug!(
                                source = entry.source.name(),
                                bars = bars.len(),
                                %market,
                                "accepted history series"
                            );
                            return bars;
                        }
                        warn!(
                            source = entry.source.name(),
                            bars = bars.len(),
                            min_bars,
                            "series too short, trying next source"
                        );
                    }
                    Err(err) => {
                        warn!(
                            source = entry.source.name(),
                            error = %err,
                            "source failed, trying next"
                        );
                    }
                }
            }
        }

        warn!(code, %market, "all sources exhausted, returning empty series");
        Vec::new()
    }

    fn apply_jitter(&self) {
        if let Some((lo, hi)) = self.jitter_ms {
            if lo < hi {
                let ms = rand::thread_rng().gen_range(lo..hi);
                std::thread::sleep(Duration::from_millis(ms));
            }
        }
    }
}
