//! Currency-unit backtest over a signal sequence.
//!
//! Long entries deploy a fixed fraction of cash into whole shares. Short
//! entries only record the entry price: no shares are borrowed and no cash
//! moves, so closing a short realizes nothing. At the end of the run an open
//! long is sold at the last close; an open short is left as is.

use chrono::NaiveDate;
use tracing::info;

use crate::domain::ohlcv::PriceBar;
use crate::domain::position::{PositionState, TradeAction, TradeRecord};
use crate::domain::signal::{Direction, Signal};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Fraction of available cash used to size a long entry.
pub const CAPITAL_DEPLOYMENT: f64 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub net_worth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return_pct: f64,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Whole shares affordable with the deployable part of `capital`.
pub fn shares_for(capital: f64, price: f64) -> i64 {
    if price <= 0.0 || !capital.is_finite() {
        return 0;
    }
    (capital * CAPITAL_DEPLOYMENT / price).floor().max(0.0) as i64
}

#[derive(Debug, Clone)]
pub struct BacktestSimulator {
    initial_capital: f64,
    capital: f64,
    shares: i64,
    position: PositionState,
    entry_price: f64,
    trades: Vec<TradeRecord>,
    equity_curve: Vec<EquityPoint>,
}

impl BacktestSimulator {
    pub fn new(config: &BacktestConfig) -> Self {
        BacktestSimulator {
            initial_capital: config.initial_capital,
            capital: config.initial_capital,
            shares: 0,
            position: PositionState::Flat,
            entry_price: 0.0,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn shares(&self) -> i64 {
        self.shares
    }

    pub fn position(&self) -> PositionState {
        self.position
    }

    /// Applies one signal. Signals that repeat the current side are ignored
    /// and leave no equity point.
    pub fn on_signal(&mut self, signal: &Signal) {
        if !self.position.admits(signal.direction) {
            return;
        }

        match signal.direction {
            Direction::Buy => self.buy(signal.date, signal.price),
            Direction::Sell => self.sell(signal.date, signal.price),
        }

        self.equity_curve.push(EquityPoint {
            date: signal.date,
            net_worth: self.net_worth(signal.price),
        });
    }

    fn buy(&mut self, date: NaiveDate, price: f64) {
        if self.position == PositionState::Short {
            let profit = self.shares as f64 * (self.entry_price - price);
            self.capital += profit;
            self.trades.push(TradeRecord {
                date,
                action: TradeAction::CloseShort,
                price,
                shares: self.shares,
                profit: Some(profit),
                capital_used: None,
            });
        }

        self.shares = shares_for(self.capital, price);
        let cost = self.shares as f64 * price;
        self.capital -= cost;
        self.position = PositionState::Long;
        self.entry_price = price;
        self.trades.push(TradeRecord {
            date,
            action: TradeAction::OpenLong,
            price,
            shares: self.shares,
            profit: None,
            capital_used: Some(cost),
        });
    }

    fn sell(&mut self, date: NaiveDate, price: f64) {
        if self.position == PositionState::Long {
            let profit = self.shares as f64 * (price - self.entry_price);
            self.capital += self.shares as f64 * price;
            self.trades.push(TradeRecord {
                date,
                action: TradeAction::CloseLong,
                price,
                shares: self.shares,
                profit: Some(profit),
                capital_used: None,
            });
            self.shares = 0;
        }

        self.position = PositionState::Short;
        self.entry_price = price;
    }

    fn net_worth(&self, price: f64) -> f64 {
        match self.position {
            PositionState::Long => self.capital + self.shares as f64 * price,
            _ => self.capital,
        }
    }

    /// Closes an open long at `last_bar` and produces the result.
    pub fn finish(mut self, last_bar: Option<&PriceBar>) -> BacktestResult {
        let open_long = self.position == PositionState::Long && self.shares > 0;
        if let Some(bar) = last_bar.filter(|_| open_long) {
            let profit = self.shares as f64 * (bar.close - self.entry_price);
            self.capital += self.shares as f64 * bar.close;
            self.trades.push(TradeRecord {
                date: bar.date,
                action: TradeAction::FinalClose,
                price: bar.close,
                shares: self.shares,
                profit: Some(profit),
                capital_used: None,
            });
            self.shares = 0;
            self.position = PositionState::Flat;
        }

        let total_return_pct = if self.initial_capital != 0.0 {
            (self.capital - self.initial_capital) / self.initial_capital * 100.0
        } else {
            0.0
        };

        BacktestResult {
            initial_capital: self.initial_capital,
            final_capital: self.capital,
            total_return_pct,
            trades: self.trades,
            equity_curve: self.equity_curve,
        }
    }
}

pub fn run_backtest(signals: &[Signal], bars: &[PriceBar], config: &BacktestConfig) -> BacktestResult {
    let mut simulator = BacktestSimulator::new(config);
    for signal in signals {
        simulator.on_signal(signal);
    }
    let result = simulator.finish(bars.last());

    info!(
        signals = signals.len(),
        trades = result.trades.len(),
        final_capital = result.final_capital,
        return_pct = result.total_return_pct,
        "backtest complete"
    );
    result
}
