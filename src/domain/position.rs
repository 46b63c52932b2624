//! Position state and trade records.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::signal::Direction;

/// Market exposure of the component currently iterating a signal stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
    Short,
}

impl PositionState {
    /// Buy is accepted unless already long, sell unless already short.
    pub fn admits(self, direction: Direction) -> bool {
        match direction {
            Direction::Buy => self != PositionState::Long,
            Direction::Sell => self != PositionState::Short,
        }
    }

    /// State entered after acting on `direction`.
    pub fn after(direction: Direction) -> Self {
        match direction {
            Direction::Buy => PositionState::Long,
            Direction::Sell => PositionState::Short,
        }
    }

    pub fn side(self) -> Option<TradeSide> {
        match self {
            PositionState::Flat => None,
            PositionState::Long => Some(TradeSide::Long),
            PositionState::Short => Some(TradeSide::Short),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// Fractional return of a round trip; 0 when the entry price is not positive.
    pub fn realized_return(self, entry_price: f64, exit_price: f64) -> f64 {
        if entry_price <= 0.0 {
            return 0.0;
        }
        match self {
            TradeSide::Long => (exit_price - entry_price) / entry_price,
            TradeSide::Short => (entry_price - exit_price) / entry_price,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Long => write!(f, "long"),
            TradeSide::Short => write!(f, "short"),
        }
    }
}

/// Percentage round trip produced by the performance evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub side: TradeSide,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub realized_return: f64,
}

impl Trade {
    pub fn is_profitable(&self) -> bool {
        self.realized_return > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    OpenLong,
    CloseLong,
    CloseShort,
    FinalClose,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::OpenLong => write!(f, "open long"),
            TradeAction::CloseLong => write!(f, "close long"),
            TradeAction::CloseShort => write!(f, "close short"),
            TradeAction::FinalClose => write!(f, "final close"),
        }
    }
}

/// Entry in the currency simulator's trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: f64,
    pub shares: i64,
    /// Realized profit, present on closing actions.
    pub profit: Option<f64>,
    /// Cash committed, present on opening actions.
    pub capital_used: Option<f64>,
}
