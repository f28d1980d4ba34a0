//! Concrete source adapters, one module per upstream provider.
//!
//! Domestic chain priority: EastMoney kline API, EastMoney daily history,
//! Tencent, Tonghuashun, TDX terminal protocol, Baostock, Sina legacy,
//! Yahoo. The Hong Kong chain reuses Sina (HK endpoint) and Yahoo.
//!
//! Each adapter owns its symbol grammar and response parsing; all of them
//! return loosely keyed rows for the normalizer and map ordinary failures
//! onto `SourceError`.

pub mod baostock;
pub mod eastmoney;
pub mod eastmoney_daily;
pub mod sina;
pub mod tdx;
pub mod tencent;
pub mod tonghuashun;
pub mod yahoo;

pub use baostock::BaostockAdapter;
pub use eastmoney::EastMoneyAdapter;
pub use eastmoney_daily::EastMoneyDailyAdapter;
pub use sina::SinaAdapter;
pub use tdx::TdxAdapter;
pub use tencent::TencentAdapter;
pub use tonghuashun::TonghuashunAdapter;
pub use yahoo::YahooAdapter;

use std::time::Duration;

/// Bounded per-request timeout so one slow provider cannot stall the whole
/// fallback chain.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(8);

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Blocking HTTP client with the shared timeout and a desktop user agent.
pub(crate) fn http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build HTTP client")
}
