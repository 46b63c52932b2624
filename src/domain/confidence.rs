//! Heuristic confidence scores for single-strategy signals.
//!
//! Scores rate signal strength on 0-100; they are not probabilities. Every
//! formula is clamped to that range and degenerate inputs score 0.

use crate::domain::signal::Direction;

pub const MAX_CONFIDENCE: f64 = 100.0;

/// Clamp to [0, 100]; non-finite values become 0.
pub fn clamp_confidence(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, MAX_CONFIDENCE)
    } else {
        0.0
    }
}

fn percent_gap(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// `50 + 10·|gap%|`, gap measured against the long MA for buys and the short MA for sells.
pub fn moving_average_confidence(short_ma: f64, long_ma: f64, direction: Direction) -> f64 {
    let gap = match direction {
        Direction::Buy => percent_gap(short_ma - long_ma, long_ma),
        Direction::Sell => percent_gap(long_ma - short_ma, short_ma),
    };
    clamp_confidence(50.0 + gap.abs() * 10.0)
}

/// Buy: `100 − 2·rsi`. Sell: `2·(rsi − 50)`.
pub fn rsi_confidence(rsi: f64, direction: Direction) -> f64 {
    let score = match direction {
        Direction::Buy => 100.0 - rsi * 2.0,
        Direction::Sell => (rsi - 50.0) * 2.0,
    };
    clamp_confidence(score)
}

pub fn macd_confidence(macd: f64, signal: f64) -> f64 {
    clamp_confidence(50.0 + (macd - signal).abs() * 100.0)
}

/// `50 + 20·|price − band| / middle · 100`.
pub fn bollinger_confidence(price: f64, touched_band: f64, middle: f64) -> f64 {
    let distance = percent_gap(price - touched_band, middle).abs();
    clamp_confidence(50.0 + distance * 20.0)
}
