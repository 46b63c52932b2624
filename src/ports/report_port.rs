//! Report rendering port trait.

use std::io::Write;

use crate::domain::analysis::{StrategyComparison, StrategyResult};
use crate::domain::backtest::BacktestResult;
use crate::domain::error::SigtraderError;
use crate::domain::metrics::RiskMetrics;
use crate::domain::portfolio::PortfolioResult;
use crate::domain::strategy::StrategyInfo;

/// Port for presenting results to a writer.
pub trait ReportPort {
    fn write_catalog(&self, out: &mut dyn Write, catalog: &[StrategyInfo])
    -> Result<(), SigtraderError>;

    fn write_symbols(&self, out: &mut dyn Write, symbols: &[String]) -> Result<(), SigtraderError>;

    fn write_strategy(
        &self,
        out: &mut dyn Write,
        symbol: &str,
        result: &StrategyResult,
    ) -> Result<(), SigtraderError>;

    fn write_comparison(
        &self,
        out: &mut dyn Write,
        comparison: &StrategyComparison,
    ) -> Result<(), SigtraderError>;

    fn write_backtest(
        &self,
        out: &mut dyn Write,
        symbol: &str,
        result: &StrategyResult,
        backtest: &BacktestResult,
        risk: Option<&RiskMetrics>,
    ) -> Result<(), SigtraderError>;

    fn write_portfolio(
        &self,
        out: &mut dyn Write,
        result: &PortfolioResult,
    ) -> Result<(), SigtraderError>;
}
