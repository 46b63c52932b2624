//! Strategy runs and side-by-side comparison for one symbol.

use tracing::{debug, warn};

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{IndicatorSet, IndicatorType};
use crate::domain::ohlcv::PriceBar;
use crate::domain::performance::{PerformanceMetrics, evaluate_performance};
use crate::domain::position::Trade;
use crate::domain::signal::Signal;
use crate::domain::signal_generator::{combine_components, component_signals, generate_signals};
use crate::domain::strategy::StrategyKind;

/// Number of most recent signals kept in a comparison entry.
pub const LATEST_SIGNALS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    pub name: String,
    pub kind: StrategyKind,
    pub signals: Vec<Signal>,
    pub performance: PerformanceMetrics,
    pub trades: Vec<Trade>,
    /// Sub-strategy runs backing a combined result; empty otherwise.
    pub components: Vec<StrategyResult>,
}

impl StrategyResult {
    pub fn latest_signal(&self) -> Option<&Signal> {
        self.signals.last()
    }
}

/// Distinct indicator series needed to run every strategy in `kinds`.
pub fn indicator_requests(kinds: &[StrategyKind]) -> Vec<IndicatorType> {
    let mut requests: Vec<IndicatorType> = Vec::new();
    for indicator in kinds.iter().flat_map(StrategyKind::required_indicators) {
        if !requests.contains(&indicator) {
            requests.push(indicator);
        }
    }
    requests
}

pub fn run_strategy(
    kind: &StrategyKind,
    symbol: &str,
    bars: &[PriceBar],
    indicators: &IndicatorSet,
) -> Result<StrategyResult, SigtraderError> {
    let result = match kind {
        StrategyKind::Combined => {
            let streams = component_signals(bars, indicators)?;
            let signals = combine_components(&streams);
            let components = streams
                .into_iter()
                .map(|(component, signals)| strategy_result(component, signals, bars, Vec::new()))
                .collect();
            strategy_result(*kind, signals, bars, components)
        }
        _ => strategy_result(*kind, generate_signals(kind, bars, indicators)?, bars, Vec::new()),
    };

    debug!(
        symbol,
        strategy = %kind,
        signals = result.signals.len(),
        return_pct = result.performance.total_return_pct,
        "strategy run"
    );
    Ok(result)
}

fn strategy_result(
    kind: StrategyKind,
    signals: Vec<Signal>,
    bars: &[PriceBar],
    components: Vec<StrategyResult>,
) -> StrategyResult {
    let report = evaluate_performance(&signals, bars);
    StrategyResult {
        name: kind.name(),
        kind,
        signals,
        performance: report.metrics,
        trades: report.trades,
        components,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategySummary {
    pub performance: PerformanceMetrics,
    pub signal_count: usize,
    pub latest_signals: Vec<Signal>,
}

impl From<StrategyResult> for StrategySummary {
    fn from(result: StrategyResult) -> Self {
        let skip = result.signals.len().saturating_sub(LATEST_SIGNALS);
        StrategySummary {
            performance: result.performance,
            signal_count: result.signals.len(),
            latest_signals: result.signals[skip..].to_vec(),
        }
    }
}

#[derive(Debug)]
pub struct ComparisonEntry {
    pub name: String,
    pub kind: StrategyKind,
    pub outcome: Result<StrategySummary, SigtraderError>,
}

#[derive(Debug)]
pub struct StrategyComparison {
    pub symbol: String,
    pub entries: Vec<ComparisonEntry>,
}

impl StrategyComparison {
    /// Successful entries by success rate, highest first; ties keep input order.
    pub fn ranking(&self) -> Vec<(&str, &StrategySummary)> {
        let mut ranked: Vec<(&str, &StrategySummary)> = self
            .entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok().map(|s| (e.name.as_str(), s)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.performance
                .success_rate
                .total_cmp(&a.1.performance.success_rate)
        });
        ranked
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SigtraderError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (e.name.as_str(), err)))
    }
}

/// Runs each strategy independently; a failing strategy is recorded in its
/// entry and does not stop the others.
pub fn compare_strategies(
    kinds: &[StrategyKind],
    symbol: &str,
    bars: &[PriceBar],
    indicators: &IndicatorSet,
) -> StrategyComparison {
    let entries = kinds
        .iter()
        .map(|kind| {
            let outcome = run_strategy(kind, symbol, bars, indicators).map(StrategySummary::from);
            if let Err(e) = &outcome {
                warn!(symbol, strategy = %kind, error = %e, "strategy failed");
            }
            ComparisonEntry {
                name: kind.name(),
                kind: *kind,
                outcome,
            }
        })
        .collect();

    StrategyComparison {
        symbol: symbol.to_string(),
        entries,
    }
}
