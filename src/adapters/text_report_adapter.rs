//! Plain-text report adapter implementing ReportPort.
//!
//! Figures are rounded to two decimals here only; the engine keeps full
//! precision.

use std::io::Write;

use crate::domain::analysis::{StrategyComparison, StrategyResult};
use crate::domain::backtest::BacktestResult;
use crate::domain::error::SigtraderError;
use crate::domain::metrics::RiskMetrics;
use crate::domain::performance::PerformanceMetrics;
use crate::domain::portfolio::PortfolioResult;
use crate::domain::strategy::StrategyInfo;
use crate::ports::report_port::ReportPort;

/// Most recent signals listed under a strategy result.
const SIGNALS_SHOWN: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        TextReportAdapter
    }
}

fn write_performance(out: &mut dyn Write, m: &PerformanceMetrics) -> std::io::Result<()> {
    writeln!(out, "Total Signals:    {}", m.total_signals)?;
    writeln!(out, "Profitable:       {}", m.profitable_signals)?;
    writeln!(out, "Success Rate:     {:.2}%", m.success_rate)?;
    writeln!(out, "Total Return:     {:.2}%", m.total_return_pct)?;
    writeln!(out, "Avg Return:       {:.2}%", m.avg_return_per_trade)
}

impl ReportPort for TextReportAdapter {
    fn write_catalog(
        &self,
        out: &mut dyn Write,
        catalog: &[StrategyInfo],
    ) -> Result<(), SigtraderError> {
        for info in catalog {
            writeln!(out, "{:<16} {}", info.id.as_str(), info.name)?;
            writeln!(out, "    {}", info.description)?;
            writeln!(
                out,
                "    risk: {}, timeframe: {}",
                info.risk_level, info.timeframe
            )?;
            if !info.parameters.is_empty() {
                writeln!(out, "    parameters: {}", info.parameters.join(", "))?;
            }
        }
        Ok(())
    }

    fn write_symbols(&self, out: &mut dyn Write, symbols: &[String]) -> Result<(), SigtraderError> {
        if symbols.is_empty() {
            writeln!(out, "No price files.")?;
        }
        for symbol in symbols {
            writeln!(out, "{}", symbol)?;
        }
        Ok(())
    }

    fn write_strategy(
        &self,
        out: &mut dyn Write,
        symbol: &str,
        result: &StrategyResult,
    ) -> Result<(), SigtraderError> {
        writeln!(out, "=== {} on {} ===", result.name, symbol)?;
        write_performance(out, &result.performance)?;

        if !result.components.is_empty() {
            writeln!(out, "\nComponents:")?;
            for component in &result.components {
                writeln!(
                    out,
                    "  {:<34} {:>4} signals  {:>8.2}%",
                    component.name,
                    component.performance.total_signals,
                    component.performance.total_return_pct
                )?;
            }
        }

        let skip = result.signals.len().saturating_sub(SIGNALS_SHOWN);
        if result.signals.is_empty() {
            writeln!(out, "\nNo signals.")?;
        } else {
            writeln!(out, "\nLatest signals:")?;
            for signal in &result.signals[skip..] {
                writeln!(out, "  {}", signal)?;
            }
        }
        Ok(())
    }

    fn write_comparison(
        &self,
        out: &mut dyn Write,
        comparison: &StrategyComparison,
    ) -> Result<(), SigtraderError> {
        writeln!(out, "=== Strategy comparison on {} ===", comparison.symbol)?;
        writeln!(
            out,
            "{:<4} {:<34} {:>8} {:>10} {:>10}",
            "#", "Strategy", "Signals", "Success", "Return"
        )?;
        for (rank, (name, summary)) in comparison.ranking().into_iter().enumerate() {
            writeln!(
                out,
                "{:<4} {:<34} {:>8} {:>9.2}% {:>9.2}%",
                rank + 1,
                name,
                summary.signal_count,
                summary.performance.success_rate,
                summary.performance.total_return_pct
            )?;
        }

        let failures: Vec<_> = comparison.failures().collect();
        if !failures.is_empty() {
            writeln!(out, "\nFailed:")?;
            for (name, err) in failures {
                writeln!(out, "  {}: {}", name, err)?;
            }
        }
        Ok(())
    }

    fn write_backtest(
        &self,
        out: &mut dyn Write,
        symbol: &str,
        result: &StrategyResult,
        backtest: &BacktestResult,
        risk: Option<&RiskMetrics>,
    ) -> Result<(), SigtraderError> {
        writeln!(out, "=== Backtest: {} on {} ===", result.name, symbol)?;
        writeln!(out, "Initial Capital:  {:.2}", backtest.initial_capital)?;
        writeln!(out, "Final Capital:    {:.2}", backtest.final_capital)?;
        writeln!(out, "Total Return:     {:.2}%", backtest.total_return_pct)?;

        match risk {
            Some(risk) => {
                writeln!(out, "Volatility:       {:.2}%", risk.volatility_pct)?;
                writeln!(out, "Max Drawdown:     -{:.2}%", risk.max_drawdown_pct)?;
                writeln!(out, "Sharpe Ratio:     {:.2}", risk.sharpe_ratio)?;
                writeln!(out, "Peak Value:       {:.2}", risk.peak_value)?;
            }
            None => writeln!(out, "Risk:             insufficient equity history")?,
        }

        writeln!(out, "\n--- Signal performance ---")?;
        write_performance(out, &result.performance)?;

        writeln!(out, "\n--- Trades ---")?;
        if backtest.trades.is_empty() {
            writeln!(out, "No trades.")?;
        }
        for trade in &backtest.trades {
            write!(
                out,
                "{} {:<12} {:>8} @ {:>10.2}",
                trade.date,
                trade.action.to_string(),
                trade.shares,
                trade.price
            )?;
            if let Some(profit) = trade.profit {
                write!(out, "  profit {:.2}", profit)?;
            }
            if let Some(used) = trade.capital_used {
                write!(out, "  cost {:.2}", used)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_portfolio(
        &self,
        out: &mut dyn Write,
        result: &PortfolioResult,
    ) -> Result<(), SigtraderError> {
        writeln!(out, "=== Portfolio: {} ===", result.strategy)?;
        writeln!(
            out,
            "{:<10} {:>8} {:>8} {:>10} {:>10} {:>10}",
            "Symbol", "Weight", "Signals", "Success", "Return", "Weighted"
        )?;
        for outcome in &result.symbols {
            match &outcome.result {
                Ok(s) => writeln!(
                    out,
                    "{:<10} {:>8.2} {:>8} {:>9.2}% {:>9.2}% {:>9.2}%",
                    s.symbol,
                    s.weight,
                    s.performance.total_signals,
                    s.performance.success_rate,
                    s.performance.total_return_pct,
                    s.weighted_return
                )?,
                Err(e) => writeln!(out, "{:<10} error: {}", outcome.symbol, e)?,
            }
        }

        let p = &result.performance;
        writeln!(out, "\nTotal Return:     {:.2}%", p.total_return)?;
        writeln!(out, "Total Signals:    {}", p.total_signals)?;
        writeln!(out, "Profitable:       {}", p.profitable_signals)?;
        writeln!(out, "Success Rate:     {:.2}%", p.success_rate)?;
        writeln!(out, "Diversification:  {}", p.diversification_score)?;

        if !result.recommendations.is_empty() {
            writeln!(out, "\nRecommendations:")?;
            for recommendation in &result.recommendations {
                writeln!(out, "  - {}", recommendation)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{BacktestConfig, run_backtest};
    use crate::domain::metrics::analyze_risk;
    use crate::domain::strategy::StrategyKind;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> Result<(), SigtraderError>,
    {
        let mut buf: Vec<u8> = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn empty_result() -> StrategyResult {
        StrategyResult {
            name: "MACD".to_string(),
            kind: StrategyKind::MacdCrossover,
            signals: Vec::new(),
            performance: PerformanceMetrics::default(),
            trades: Vec::new(),
            components: Vec::new(),
        }
    }

    #[test]
    fn catalog_lists_every_strategy() {
        let text = render(|out| TextReportAdapter::new().write_catalog(out, &StrategyKind::catalog()));
        assert!(text.contains("moving_average"));
        assert!(text.contains("bollinger_bands"));
        assert!(text.contains("risk: high"));
    }

    #[test]
    fn symbols_one_per_line() {
        let symbols = vec!["QQQ".to_string(), "SPY".to_string()];
        let text = render(|out| TextReportAdapter::new().write_symbols(out, &symbols));
        assert_eq!(text, "QQQ\nSPY\n");
        let empty = render(|out| TextReportAdapter::new().write_symbols(out, &[]));
        assert_eq!(empty, "No price files.\n");
    }

    #[test]
    fn strategy_without_signals() {
        let text = render(|out| TextReportAdapter::new().write_strategy(out, "SPY", &empty_result()));
        assert!(text.contains("=== MACD on SPY ==="));
        assert!(text.contains("Success Rate:     0.00%"));
        assert!(text.contains("No signals."));
    }

    #[test]
    fn backtest_without_risk() {
        let backtest = run_backtest(&[], &[], &BacktestConfig::default());
        let risk = analyze_risk(&backtest.equity_curve);
        let text = render(|out| {
            TextReportAdapter::new().write_backtest(out, "SPY", &empty_result(), &backtest, risk.as_ref())
        });
        assert!(text.contains("Final Capital:    100000.00"));
        assert!(text.contains("insufficient equity history"));
        assert!(text.contains("No trades."));
    }
}
