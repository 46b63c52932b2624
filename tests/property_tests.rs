//! Property tests for signal and simulation invariants.
//!
//! Uses proptest to verify, over random price paths:
//! 1. Alternation: no strategy emits two consecutive signals in one direction
//! 2. Determinism: identical inputs give identical results
//! 3. Cash accounting: the simulator never goes negative
//! 4. Risk bounds: drawdown stays within 0..100% and peak is the maximum

mod common;

use common::*;
use proptest::prelude::*;
use sigtrader::adapters::indicator_adapter::TechnicalIndicatorAdapter;
use sigtrader::domain::analysis::run_strategy;
use sigtrader::domain::backtest::{BacktestConfig, run_backtest};
use sigtrader::domain::combiner::combine_signals;
use sigtrader::domain::metrics::analyze_values;
use sigtrader::domain::signal::{
    Direction, Signal, SignalStrength, SupportingValues, strictly_alternating,
};
use sigtrader::domain::strategy::{StrategyId, StrategyKind};
use sigtrader::ports::indicator_port::IndicatorPort;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Closes of a multiplicative random walk starting at 100.
fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.04..0.04_f64, 60..160).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|step| {
                price *= 1.0 + step;
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

fn arb_strategy() -> impl Strategy<Value = StrategyKind> {
    prop_oneof![
        (2usize..10, 11usize..40).prop_map(|(short_period, long_period)| {
            StrategyKind::MovingAverageCrossover {
                short_period,
                long_period,
            }
        }),
        (5usize..21, 10.0..40.0_f64, 60.0..90.0_f64).prop_map(|(period, oversold, overbought)| {
            StrategyKind::RsiThreshold {
                period,
                oversold,
                overbought,
            }
        }),
        Just(StrategyKind::MacdCrossover),
        (10usize..30, 1.0..3.0_f64)
            .prop_map(|(period, std_dev)| StrategyKind::BollingerTouch { period, std_dev }),
        Just(StrategyKind::Combined),
    ]
}

/// A stream of at most one signal per day over a 30-day range.
fn arb_stream(source: StrategyId) -> impl Strategy<Value = Vec<Signal>> {
    prop::collection::btree_map(0i64..30, (any::<bool>(), 0.0..100.0_f64), 0..20).prop_map(
        move |days| {
            days.into_iter()
                .map(|(day, (buy, confidence))| Signal {
                    date: date(2024, 1, 1) + chrono::Duration::days(day),
                    direction: if buy { Direction::Buy } else { Direction::Sell },
                    strength: SignalStrength::Normal,
                    price: 100.0 + day as f64,
                    confidence,
                    source,
                    supporting: SupportingValues::MovingAverage {
                        short_ma: 0.0,
                        long_ma: 0.0,
                    },
                })
                .collect()
        },
    )
}

fn run(kind: &StrategyKind, closes: &[f64]) -> Option<Vec<Signal>> {
    let bars = bars_from_closes(closes);
    let indicators = TechnicalIndicatorAdapter::new().compute(&bars, &kind.required_indicators());
    run_strategy(kind, "RAND", &bars, &indicators)
        .ok()
        .map(|r| r.signals)
}

// ── 1. Alternation ───────────────────────────────────────────────────

proptest! {
    /// Every strategy's output alternates and stays in chronological order.
    #[test]
    fn strategies_alternate(closes in arb_closes(), kind in arb_strategy()) {
        if let Some(signals) = run(&kind, &closes) {
            prop_assert!(strictly_alternating(&signals));
            prop_assert!(signals.windows(2).all(|w| w[0].date < w[1].date));
            for signal in &signals {
                prop_assert!((0.0..=100.0).contains(&signal.confidence));
                prop_assert_eq!(signal.source, kind.id());
            }
        }
    }

    /// The combiner alternates whatever its input streams look like.
    #[test]
    fn combiner_alternates(
        ma in arb_stream(StrategyId::MovingAverage),
        rsi in arb_stream(StrategyId::Rsi),
        macd in arb_stream(StrategyId::Macd),
    ) {
        let combined = combine_signals(&[
            (StrategyId::MovingAverage, ma),
            (StrategyId::Rsi, rsi),
            (StrategyId::Macd, macd),
        ]);
        prop_assert!(strictly_alternating(&combined));
        for signal in &combined {
            prop_assert!((0.0..=100.0).contains(&signal.confidence));
            prop_assert_eq!(signal.source, StrategyId::Combined);
        }
    }
}

// ── 2. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn runs_are_deterministic(closes in arb_closes(), kind in arb_strategy()) {
        prop_assert_eq!(run(&kind, &closes), run(&kind, &closes));
    }
}

// ── 3. Cash accounting ───────────────────────────────────────────────

proptest! {
    /// Capital and net worth stay non-negative through any signal sequence.
    #[test]
    fn simulator_never_overdraws(closes in arb_closes(), capital in 1_000.0..1_000_000.0_f64) {
        let kind = StrategyKind::MovingAverageCrossover { short_period: 3, long_period: 12 };
        let bars = bars_from_closes(&closes);
        let signals = run(&kind, &closes).unwrap_or_default();

        let result = run_backtest(&signals, &bars, &BacktestConfig { initial_capital: capital });

        prop_assert!(result.final_capital >= 0.0);
        prop_assert!(result.equity_curve.iter().all(|p| p.net_worth >= 0.0));
        for trade in &result.trades {
            prop_assert!(trade.shares >= 0);
            if let Some(used) = trade.capital_used {
                prop_assert!(used >= 0.0);
            }
        }
    }

    #[test]
    fn no_signals_keep_capital(closes in arb_closes(), capital in 1.0..1_000_000.0_f64) {
        let bars = bars_from_closes(&closes);
        let result = run_backtest(&[], &bars, &BacktestConfig { initial_capital: capital });
        prop_assert_eq!(result.final_capital, capital);
        prop_assert_eq!(result.total_return_pct, 0.0);
        prop_assert!(result.trades.is_empty());
    }
}

// ── 4. Risk bounds ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_is_bounded(values in prop::collection::vec(1.0..1_000_000.0_f64, 2..50)) {
        let risk = analyze_values(&values).unwrap();
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        prop_assert!(risk.max_drawdown_pct >= 0.0);
        prop_assert!(risk.max_drawdown_pct < 100.0);
        prop_assert!(risk.volatility_pct >= 0.0);
        prop_assert_eq!(risk.peak_value, max);
    }
}
