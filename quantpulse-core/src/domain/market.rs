//! Market routing — which adapter chain and symbol grammar a code uses.
//!
//! Routing is by code shape: a 5-character code is a Hong Kong instrument;
//! everything else follows the domestic chain, with the exchange prefix
//! derived from the leading digit (6xxxxx lists in Shanghai, the rest in
//! Shenzhen).

use serde::{Deserialize, Serialize};

/// Listing market, derived from the shape of the bare exchange code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "CN")]
    Cn,
    #[serde(rename = "HK")]
    Hk,
}

impl Market {
    /// Classify a bare exchange code.
    pub fn from_code(code: &str) -> Self {
        if code.trim().len() == 5 {
            Market::Hk
        } else {
            Market::Cn
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Market::Cn => "CN",
            Market::Hk => "HK",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip an `sh`/`sz` exchange prefix if the caller passed one.
pub fn bare_code(code: &str) -> &str {
    code.trim()
        .trim_start_matches("sh")
        .trim_start_matches("sz")
}

/// Domestic exchange prefix from the leading digit of the bare code.
pub fn exchange_prefix(code: &str) -> &'static str {
    if bare_code(code).starts_with('6') {
        "sh"
    } else {
        "sz"
    }
}

/// Zero-pad a Hong Kong code to the canonical 5 digits (`700` -> `00700`).
///
/// Returns `None` for codes that are not purely numeric after stripping an
/// optional `HK` prefix.
pub fn hk_code(code: &str) -> Option<String> {
    let digits = code.trim().trim_start_matches("HK").trim_start_matches("hk");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: u32 = digits.parse().ok()?;
    Some(format!("{n:05}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_character_codes_route_to_hk() {
        assert_eq!(Market::from_code("00700"), Market::Hk);
        assert_eq!(Market::from_code("09988"), Market::Hk);
        assert_eq!(Market::from_code("600000"), Market::Cn);
        assert_eq!(Market::from_code("000001"), Market::Cn);
    }

    #[test]
    fn prefix_follows_leading_digit() {
        assert_eq!(exchange_prefix("600000"), "sh");
        assert_eq!(exchange_prefix("000001"), "sz");
        assert_eq!(exchange_prefix("300750"), "sz");
        assert_eq!(exchange_prefix("sh601318"), "sh");
    }

    #[test]
    fn bare_code_strips_prefixes() {
        assert_eq!(bare_code("sh600000"), "600000");
        assert_eq!(bare_code("sz000001"), "000001");
        assert_eq!(bare_code("600000"), "600000");
    }

    #[test]
    fn hk_code_pads_to_five() {
        assert_eq!(hk_code("700").as_deref(), Some("00700"));
        assert_eq!(hk_code("HK700").as_deref(), Some("00700"));
        assert_eq!(hk_code("00700").as_deref(), Some("00700"));
        assert_eq!(hk_code("garbage"), None);
    }
}
