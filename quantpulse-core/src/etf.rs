//! ETF classification — versioned reference data, not embedded logic.
//!
//! Index funds trade like equities but get analyzed with different
//! expectations, so reports flag them. The code-range table lives in a TOML
//! file (an embedded default ships with the crate, a file override is
//! supported) and a name-substring heuristic catches listings the table
//! misses.

use crate::domain::{market, Market};
use serde::Deserialize;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("../reference/etf_catalog.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct EtfCatalog {
    /// Substrings of instrument names that mark a fund product.
    name_markers: Vec<String>,
    cn: CnRules,
    hk: HkRules,
}

#[derive(Debug, Clone, Deserialize)]
struct CnRules {
    /// Leading-digit prefixes of domestic ETF codes.
    prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct HkRules {
    /// Inclusive numeric code bands of Hong Kong ETFs.
    ranges: Vec<[u32; 2]>,
}

impl EtfCatalog {
    /// The catalog version shipped with the crate.
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_CATALOG).expect("embedded ETF catalog is valid")
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse ETF catalog TOML: {e}"))
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read ETF catalog file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Classify a code (and optionally its listing name) as an ETF.
    pub fn is_etf(&self, code: &str, mkt: Market, name: Option<&str>) -> bool {
        if let Some(name) = name {
            if self.name_markers.iter().any(|m| name.contains(m.as_str())) {
                return true;
            }
        }

        match mkt {
            Market::Cn => {
                let bare = market::bare_code(code);
                self.cn.prefixes.iter().any(|p| bare.starts_with(p.as_str()))
            }
            Market::Hk => {
                let Some(padded) = market::hk_code(code) else {
                    return false;
                };
                let n: u32 = padded.parse().expect("hk_code returns digits");
                self.hk.ranges.iter().any(|[lo, hi]| (*lo..=*hi).contains(&n))
            }
        }
    }
}

impl Default for EtfCatalog {
    fn default() -> Self {
        Self::embedded()
    }
}
