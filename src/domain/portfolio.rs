//! Multi-symbol evaluation of one strategy.
//!
//! Symbols are independent, so they may be evaluated on the rayon pool; the
//! collect is the join point, and accumulation happens afterwards in input
//! order so the outcome does not depend on scheduling.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::analysis::run_strategy;
use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::window_start;
use crate::domain::performance::PerformanceMetrics;
use crate::domain::signal::Signal;
use crate::domain::strategy::StrategyKind;
use crate::ports::indicator_port::IndicatorPort;
use crate::ports::price_history_port::PriceHistoryPort;

pub const DEFAULT_PORTFOLIO_LOOKBACK_DAYS: i64 = 100;

/// Success rate above which a symbol is suggested for a larger weight.
pub const INCREASE_THRESHOLD: f64 = 70.0;
/// Success rate below which a symbol is suggested for a smaller weight.
pub const DECREASE_THRESHOLD: f64 = 50.0;
/// Fewer evaluated symbols than this triggers a diversification suggestion.
pub const MIN_DIVERSIFIED_SYMBOLS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRequest {
    pub symbols: Vec<String>,
    pub strategy: StrategyKind,
    /// Explicit weights; symbols not listed get `1/N`.
    pub weights: HashMap<String, f64>,
    /// Window end; each symbol's latest bar when absent.
    pub end_date: Option<NaiveDate>,
    pub lookback_days: i64,
}

impl PortfolioRequest {
    pub fn new(symbols: Vec<String>, strategy: StrategyKind) -> Self {
        PortfolioRequest {
            symbols,
            strategy,
            weights: HashMap::new(),
            end_date: None,
            lookback_days: DEFAULT_PORTFOLIO_LOOKBACK_DAYS,
        }
    }

    pub fn weight_of(&self, symbol: &str) -> f64 {
        match self.weights.get(symbol) {
            Some(&weight) => weight,
            None if self.symbols.is_empty() => 0.0,
            None => 1.0 / self.symbols.len() as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPerformance {
    pub symbol: String,
    pub weight: f64,
    pub performance: PerformanceMetrics,
    pub weighted_return: f64,
    pub latest_signal: Option<Signal>,
}

#[derive(Debug)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub result: Result<SymbolPerformance, SigtraderError>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioPerformance {
    pub total_return: f64,
    pub total_signals: usize,
    pub profitable_signals: usize,
    pub success_rate: f64,
    /// Number of symbols evaluated without error.
    pub diversification_score: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    IncreaseWeight { symbols: Vec<String> },
    DecreaseWeight { symbols: Vec<String> },
    Diversify,
}

impl Recommendation {
    pub fn reason(&self) -> &'static str {
        match self {
            Recommendation::IncreaseWeight { .. } => "High success rate",
            Recommendation::DecreaseWeight { .. } => "Low success rate",
            Recommendation::Diversify => "Consider adding more symbols for better diversification",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::IncreaseWeight { symbols } => {
                write!(f, "increase weight: {} ({})", symbols.join(", "), self.reason())
            }
            Recommendation::DecreaseWeight { symbols } => {
                write!(f, "decrease weight: {} ({})", symbols.join(", "), self.reason())
            }
            Recommendation::Diversify => write!(f, "diversify: {}", self.reason()),
        }
    }
}

#[derive(Debug)]
pub struct PortfolioResult {
    pub strategy: String,
    /// One entry per requested symbol, in request order.
    pub symbols: Vec<SymbolOutcome>,
    pub performance: PortfolioPerformance,
    pub recommendations: Vec<Recommendation>,
}

impl PortfolioResult {
    pub fn successes(&self) -> impl Iterator<Item = &SymbolPerformance> {
        self.symbols.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SigtraderError)> {
        self.symbols
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.symbol.as_str(), e)))
    }
}

pub struct PortfolioAggregator<'a> {
    prices: &'a dyn PriceHistoryPort,
    indicators: &'a dyn IndicatorPort,
    parallel: bool,
}

impl<'a> PortfolioAggregator<'a> {
    pub fn new(prices: &'a dyn PriceHistoryPort, indicators: &'a dyn IndicatorPort) -> Self {
        PortfolioAggregator {
            prices,
            indicators,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(&self, request: &PortfolioRequest) -> PortfolioResult {
        let evaluate = |symbol: &String| SymbolOutcome {
            symbol: symbol.clone(),
            result: self.evaluate_symbol(request, symbol),
        };

        let outcomes: Vec<SymbolOutcome> = if self.parallel {
            request.symbols.par_iter().map(evaluate).collect()
        } else {
            request.symbols.iter().map(evaluate).collect()
        };

        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                warn!(symbol = %outcome.symbol, error = %e, "symbol skipped");
            }
        }

        let performance = aggregate(&outcomes);
        let recommendations = recommend(&outcomes, &performance);

        info!(
            strategy = %request.strategy,
            symbols = outcomes.len(),
            evaluated = performance.diversification_score,
            total_return = performance.total_return,
            "portfolio evaluated"
        );

        PortfolioResult {
            strategy: request.strategy.name(),
            symbols: outcomes,
            performance,
            recommendations,
        }
    }

    fn evaluate_symbol(
        &self,
        request: &PortfolioRequest,
        symbol: &str,
    ) -> Result<SymbolPerformance, SigtraderError> {
        let end = match request.end_date {
            Some(date) => date,
            None => self.prices.latest_date(symbol)?,
        };
        let start = window_start(end, request.lookback_days).ok_or_else(|| {
            SigtraderError::ConfigInvalid {
                section: "portfolio".to_string(),
                key: "lookback_days".to_string(),
                reason: format!("{} days before {} is out of range", request.lookback_days, end),
            }
        })?;

        let bars = self.prices.fetch_bars(symbol, start, end)?;
        if bars.is_empty() {
            return Err(SigtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let indicators = self
            .indicators
            .compute(&bars, &request.strategy.required_indicators());
        let result = run_strategy(&request.strategy, symbol, &bars, &indicators)?;

        let weight = request.weight_of(symbol);
        let weighted_return = result.performance.total_return_pct * weight;
        let latest_signal = result.latest_signal().cloned();

        Ok(SymbolPerformance {
            symbol: symbol.to_string(),
            weight,
            performance: result.performance,
            weighted_return,
            latest_signal,
        })
    }
}

fn aggregate(outcomes: &[SymbolOutcome]) -> PortfolioPerformance {
    let mut totals = PortfolioPerformance::default();

    for symbol in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        totals.total_return += symbol.weighted_return;
        totals.total_signals += symbol.performance.total_signals;
        totals.profitable_signals += symbol.performance.profitable_signals;
        totals.diversification_score += 1;
    }

    totals.success_rate =
        totals.profitable_signals as f64 / totals.total_signals.max(1) as f64 * 100.0;
    totals
}

fn recommend(outcomes: &[SymbolOutcome], performance: &PortfolioPerformance) -> Vec<Recommendation> {
    let mut increase = Vec::new();
    let mut decrease = Vec::new();

    for symbol in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        let rate = symbol.performance.success_rate;
        if rate > INCREASE_THRESHOLD {
            increase.push(symbol.symbol.clone());
        } else if rate < DECREASE_THRESHOLD {
            decrease.push(symbol.symbol.clone());
        }
    }

    let mut recommendations = Vec::new();
    if !increase.is_empty() {
        recommendations.push(Recommendation::IncreaseWeight { symbols: increase });
    }
    if !decrease.is_empty() {
        recommendations.push(Recommendation::DecreaseWeight { symbols: decrease });
    }
    if performance.diversification_score < MIN_DIVERSIFIED_SYMBOLS {
        recommendations.push(Recommendation::Diversify);
    }
    recommendations
}
