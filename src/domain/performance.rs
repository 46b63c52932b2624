//! Percentage-based round-trip statistics for a signal sequence.

use crate::domain::ohlcv::PriceBar;
use crate::domain::position::{PositionState, Trade, TradeSide};
use crate::domain::signal::Signal;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformanceMetrics {
    pub total_signals: usize,
    pub profitable_signals: usize,
    /// Profitable trades over the number of signals, as a percentage.
    pub success_rate: f64,
    /// Sum of per-trade fractional returns, as a percentage.
    pub total_return_pct: f64,
    pub avg_return_per_trade: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformanceReport {
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
}

struct OpenPosition {
    side: TradeSide,
    entry_date: chrono::NaiveDate,
    entry_price: f64,
}

impl OpenPosition {
    fn close(self, exit_date: chrono::NaiveDate, exit_price: f64) -> Trade {
        Trade {
            side: self.side,
            entry_date: self.entry_date,
            exit_date,
            entry_price: self.entry_price,
            exit_price,
            realized_return: self.side.realized_return(self.entry_price, exit_price),
        }
    }
}

/// Pairs consecutive opposite signals into trades.
///
/// A signal that flips direction closes the open position and opens the
/// opposite one; a position still open after the last signal is closed at the
/// final bar's close.
pub fn evaluate_performance(signals: &[Signal], bars: &[PriceBar]) -> PerformanceReport {
    let mut trades = Vec::new();
    let mut open: Option<OpenPosition> = None;

    for signal in signals {
        let Some(side) = PositionState::after(signal.direction).side() else {
            continue;
        };
        if open.as_ref().is_some_and(|position| position.side == side) {
            continue;
        }
        if let Some(position) = open.take() {
            trades.push(position.close(signal.date, signal.price));
        }
        open = Some(OpenPosition {
            side,
            entry_date: signal.date,
            entry_price: signal.price,
        });
    }

    if let (Some(position), Some(last)) = (open, bars.last()) {
        trades.push(position.close(last.date, last.close));
    }

    PerformanceReport {
        metrics: summarize(signals.len(), &trades),
        trades,
    }
}

fn summarize(total_signals: usize, trades: &[Trade]) -> PerformanceMetrics {
    let profitable_signals = trades.iter().filter(|t| t.is_profitable()).count();
    let total_return_pct = trades.iter().map(|t| t.realized_return).sum::<f64>() * 100.0;
    let denominator = total_signals.max(1) as f64;

    PerformanceMetrics {
        total_signals,
        profitable_signals,
        success_rate: profitable_signals as f64 / denominator * 100.0,
        total_return_pct,
        avg_return_per_trade: total_return_pct / denominator,
    }
}
