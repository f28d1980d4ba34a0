//! Signal scoring — one indicator snapshot in, one labeled signal out.
//!
//! Scoring is an additive ledger starting from a neutral 50: each condition
//! adjusts the score and records a human-readable reason. Cautionary
//! observations additionally land in `risk_factors`. The label is chosen
//! separately from the score, and an explicit bearish crossover below the
//! 20-day line forces a sell regardless of what the ledger says.

use crate::domain::Market;
use crate::indicators::{safe_round, IndicatorSnapshot, MacdCross};
use serde::{Deserialize, Serialize};

/// Discrete trading recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalLabel {
    #[serde(rename = "strong-buy")]
    StrongBuy,
    #[serde(rename = "buy")]
    Buy,
    #[default]
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "sell")]
    Sell,
}

impl SignalLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalLabel::StrongBuy => "strong-buy",
            SignalLabel::Buy => "buy",
            SignalLabel::Hold => "hold",
            SignalLabel::Sell => "sell",
        }
    }
}

/// Tunable scoring and risk parameters.
///
/// The volatility multiplier widens the ATR stop for the more volatile
/// international market. Reward-multiple tiers are configurable because only
/// the strong-trend boundary is pinned down by observed behavior; the middle
/// boundary is a default, not a law.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// k in `stop = price - k * ATR14`.
    pub volatility_multiplier: f64,
    /// Scores at or above this take the strong reward multiple.
    pub strong_reward_threshold: i32,
    /// Scores at or above this (but below strong) take the normal multiple.
    pub normal_reward_threshold: i32,
    pub strong_reward: f64,
    pub normal_reward: f64,
    pub weak_reward: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::for_market(Market::Cn)
    }
}

impl SignalConfig {
    pub fn for_market(market: Market) -> Self {
        Self {
            volatility_multiplier: match market {
                Market::Cn => 2.0,
                Market::Hk => 2.5,
            },
            strong_reward_threshold: 80,
            normal_reward_threshold: 60,
            strong_reward: 3.0,
            normal_reward: 2.0,
            weak_reward: 1.5,
        }
    }
}

/// Scored recommendation with risk levels, derived from one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub label: SignalLabel,
    pub trend_score: i32,
    pub reasons: Vec<String>,
    pub risk_factors: Vec<String>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub suggested_buy: f64,
    pub support_level: f64,
    pub resistance_level: f64,
}

/// Score a snapshot into a signal.
pub fn generate(tech: &IndicatorSnapshot, config: &SignalConfig) -> Signal {
    let price = tech.current_price;
    let ma5 = tech.ma5;
    let ma20 = tech.ma20;
    let rsi = tech.rsi14;
    let volume_ratio = tech.volume_ratio;

    let mut score: i32 = 50;
    let mut reasons: Vec<String> = Vec::new();
    let mut risk_factors: Vec<String> = Vec::new();

    if price > ma5 {
        score += 10;
    }
    if price > ma20 {
        score += 20;
        reasons.push("above the 20-day line".into());
    } else {
        score -= 20;
        reasons.push("below the 20-day line".into());
        risk_factors.push("below the 20-day line".into());
    }

    if rsi > 70.0 {
        score -= 10;
        reasons.push("RSI overbought".into());
        risk_factors.push("RSI overbought".into());
    } else if rsi < 30.0 {
        // An oversold reading only helps once price has reclaimed the 5-day
        // line; a falling knife gets a token bonus and a warning instead.
        if price > ma5 {
            score += 15;
            reasons.push("RSI oversold, stabilizing above MA5".into());
        } else {
            score += 5;
            reasons.push("RSI oversold, not yet stable".into());
            risk_factors.push("RSI oversold, not yet stable".into());
        }
    }

    match tech.macd_cross {
        MacdCross::Golden => {
            score += 15;
            reasons.push("MACD golden cross".into());
        }
        MacdCross::Death => {
            score -= 15;
            reasons.push("MACD death cross".into());
            risk_factors.push("MACD death cross".into());
        }
        MacdCross::None => {}
    }

    if volume_ratio > 1.5 {
        score += 10;
        reasons.push("volume expansion on the up-move".into());
    } else if volume_ratio < 0.8 {
        // Observation only; thin tape moves the label discussion, not the score.
        reasons.push("volume contraction, consolidating".into());
    }

    let mut label = SignalLabel::Hold;
    if price > ma20 && ma5 > ma20 {
        if ma20 > 0.0 && (ma5 - ma20).abs() / ma20 < 0.05 {
            label = SignalLabel::StrongBuy;
            reasons.push("moving averages coiled, breakout setup".into());
        } else {
            label = SignalLabel::Buy;
            reasons.push("bullish alignment above the 20-day line".into());
        }
    }
    // Confirmed breakdown overrides everything the ledger accumulated.
    if tech.macd_cross == MacdCross::Death && price < ma20 && ma5 < ma20 {
        label = SignalLabel::Sell;
    }

    let atr = if tech.atr14 > 0.0 {
        tech.atr14
    } else {
        // Synthetic volatility estimate when the ATR window never filled.
        price * 0.03
    };

    let atr_stop = price - config.volatility_multiplier * atr;
    let support = tech.support_level;
    let stop_loss = if support > 0.0 {
        // The tighter of the two stops: giving back less than the volatility
        // budget when a support shelf sits just under price.
        atr_stop.max(support * 0.98)
    } else {
        atr_stop
    };

    let mut risk_per_share = price - stop_loss;
    if risk_per_share <= 0.0 {
        risk_per_share = atr;
    }

    let reward = if score >= config.strong_reward_threshold {
        config.strong_reward
    } else if score >= config.normal_reward_threshold {
        config.normal_reward
    } else {
        config.weak_reward
    };
    let take_profit = price + reward * risk_per_share;

    let suggested_buy = support.max(price * 0.98);

    Signal {
        label,
        trend_score: score,
        reasons,
        risk_factors,
        stop_loss: safe_round(stop_loss, 2),
        take_profit: safe_round(take_profit, 2),
        suggested_buy: safe_round(suggested_buy, 2),
        support_level: safe_round(support, 2),
        resistance_level: safe_round(tech.resistance_level, 2),
    }
}
