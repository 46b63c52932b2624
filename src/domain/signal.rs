//! Trading signal events.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::strategy::StrategyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "Buy"),
            Direction::Sell => write!(f, "Sell"),
        }
    }
}

/// Consensus category; single-strategy signals are always `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStrength {
    Normal,
    Strong,
}

/// One sub-strategy's contribution to a consensus signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vote {
    pub source: StrategyId,
    pub direction: Option<Direction>,
}

/// Indicator readings that justified a signal.
#[derive(Debug, Clone, PartialEq)]
pub enum SupportingValues {
    MovingAverage {
        short_ma: f64,
        long_ma: f64,
    },
    Rsi {
        rsi: f64,
    },
    Macd {
        macd: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    Consensus {
        buy_score: f64,
        sell_score: f64,
        votes: Vec<Vote>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub direction: Direction,
    pub strength: SignalStrength,
    pub price: f64,
    /// Heuristic 0-100 rating, not a probability.
    pub confidence: f64,
    pub source: StrategyId,
    pub supporting: SupportingValues,
}

impl Signal {
    /// "Buy", "Sell", "Strong Buy" or "Strong Sell".
    pub fn label(&self) -> String {
        match self.strength {
            SignalStrength::Normal => self.direction.to_string(),
            SignalStrength::Strong => format!("Strong {}", self.direction),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {:.2} (confidence {:.1}, {})",
            self.date,
            self.label(),
            self.price,
            self.confidence,
            self.source
        )
    }
}

/// True when no two consecutive signals share a direction.
pub fn strictly_alternating(signals: &[Signal]) -> bool {
    signals
        .windows(2)
        .all(|w| w[0].direction != w[1].direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_signal(day: u32, direction: Direction, strength: SignalStrength) -> Signal {
        Signal {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            direction,
            strength,
            price: 52.0,
            confidence: 75.0,
            source: StrategyId::MovingAverage,
            supporting: SupportingValues::MovingAverage {
                short_ma: 2.0,
                long_ma: 1.0,
            },
        }
    }

    #[test]
    fn direction_opposite() {
        assert_eq!(Direction::Buy.opposite(), Direction::Sell);
        assert_eq!(Direction::Sell.opposite(), Direction::Buy);
    }

    #[test]
    fn signal_labels() {
        assert_eq!(
            make_signal(1, Direction::Buy, SignalStrength::Normal).label(),
            "Buy"
        );
        assert_eq!(
            make_signal(1, Direction::Sell, SignalStrength::Strong).label(),
            "Strong Sell"
        );
    }

    #[test]
    fn signal_display() {
        let signal = make_signal(4, Direction::Buy, SignalStrength::Normal);
        assert_eq!(
            signal.to_string(),
            "2024-03-04 Buy @ 52.00 (confidence 75.0, moving_average)"
        );
    }

    #[test]
    fn alternation_check() {
        let ok = vec![
            make_signal(1, Direction::Buy, SignalStrength::Normal),
            make_signal(2, Direction::Sell, SignalStrength::Normal),
            make_signal(3, Direction::Buy, SignalStrength::Strong),
        ];
        let repeated = vec![
            make_signal(1, Direction::Buy, SignalStrength::Normal),
            make_signal(2, Direction::Buy, SignalStrength::Strong),
        ];
        assert!(strictly_alternating(&ok));
        assert!(!strictly_alternating(&repeated));
        assert!(strictly_alternating(&[]));
    }
}
