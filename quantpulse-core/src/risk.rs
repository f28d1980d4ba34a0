//! Position sizing — a risk budget and a per-share risk distance into a
//! lot-rounded share count.
//!
//! Classic fixed-fractional sizing: risk `risk_fraction` of the balance per
//! trade, with the stop distance as the per-share risk. Share counts round
//! down to whole lots of 100; anything below one lot is not actionable and
//! collapses to zero.

use crate::indicators::safe_round;
use serde::{Deserialize, Serialize};

/// Minimum tradable share increment.
pub const LOT_SIZE: u64 = 100;

/// Per-share risk distances below this are treated as zero.
const RISK_EPSILON: f64 = 1e-4;

/// Risk-bounded plan for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPlan {
    pub risk_per_share: f64,
    pub suggested_shares: u64,
}

/// Size a position from a risk budget.
///
/// `risk_per_share = price - stop_loss`; a non-positive distance falls back
/// to the ATR as a volatility proxy. `shares = floor(balance * risk_fraction
/// / risk_per_share / 100) * 100`.
pub fn position_size(
    balance: f64,
    risk_fraction: f64,
    price: f64,
    stop_loss: f64,
    atr: f64,
) -> RiskPlan {
    let mut risk_per_share = price - stop_loss;
    if risk_per_share <= 0.0 {
        risk_per_share = atr;
    }

    if risk_per_share <= RISK_EPSILON || balance <= 0.0 || risk_fraction <= 0.0 {
        return RiskPlan {
            risk_per_share: safe_round(risk_per_share.max(0.0), 2),
            suggested_shares: 0,
        };
    }

    let account_risk_money = balance * risk_fraction;
    let lots = (account_risk_money / risk_per_share / LOT_SIZE as f64).floor();
    let suggested_shares = if lots.is_finite() && lots >= 1.0 {
        lots as u64 * LOT_SIZE
    } else {
        0
    };

    RiskPlan {
        risk_per_share: safe_round(risk_per_share, 2),
        suggested_shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_down_to_whole_lots() {
        // 100k balance, 1% risk, 4 yuan per share: 250 raw shares -> 2 lots.
        let plan = position_size(100_000.0, 0.01, 100.0, 96.0, 2.0);
        assert_eq!(plan.risk_per_share, 4.0);
        assert_eq!(plan.suggested_shares, 200);
    }

    #[test]
    fn below_one_lot_collapses_to_zero() {
        // 5k balance, 1% risk, 4 yuan per share: 12.5 raw shares.
        let plan = position_size(5_000.0, 0.01, 100.0, 96.0, 2.0);
        assert_eq!(plan.suggested_shares, 0);
    }

    #[test]
    fn inverted_stop_falls_back_to_atr() {
        // stop above price: distance is the ATR instead.
        let plan = position_size(100_000.0, 0.01, 100.0, 105.0, 2.0);
        assert_eq!(plan.risk_per_share, 2.0);
        assert_eq!(plan.suggested_shares, 500);
    }

    #[test]
    fn zero_risk_distance_means_no_trade() {
        let plan = position_size(100_000.0, 0.01, 100.0, 100.0, 0.0);
        assert_eq!(plan.suggested_shares, 0);
    }

    #[test]
    fn non_positive_budget_means_no_trade() {
        assert_eq!(
            position_size(0.0, 0.01, 100.0, 96.0, 2.0).suggested_shares,
            0
        );
        assert_eq!(
            position_size(100_000.0, 0.0, 100.0, 96.0, 2.0).suggested_shares,
            0
        );
    }

    #[test]
    fn exact_lot_boundary_is_kept() {
        // 1000 budget / 5 per share = 200 shares exactly.
        let plan = position_size(100_000.0, 0.01, 100.0, 95.0, 2.0);
        assert_eq!(plan.suggested_shares, 200);
    }
}
