//! Per-strategy signal state machines.
//!
//! Each strategy walks its price bars once, carrying a [`PositionState`] that
//! starts flat. The decision for a bar is a pure function of the previous and
//! current indicator readings plus that state; a bar whose readings are
//! undefined produces no transition.

use tracing::debug;

use crate::domain::combiner::combine_signals;
use crate::domain::confidence::{
    bollinger_confidence, macd_confidence, moving_average_confidence, rsi_confidence,
};
use crate::domain::error::SigtraderError;
use crate::domain::indicator::macd::DEFAULT_MACD;
use crate::domain::indicator::{IndicatorSeries, IndicatorSet, IndicatorType};
use crate::domain::ohlcv::{PriceBar, is_chronological};
use crate::domain::position::PositionState;
use crate::domain::signal::{Direction, Signal, SignalStrength, SupportingValues};
use crate::domain::strategy::{StrategyId, StrategyKind};

/// Crossing of a fast series over a slow one.
///
/// Buy when `fast` moves from `<=` to strictly above `slow`, sell when it moves
/// from `>=` to strictly below.
pub fn crossover_decision(
    prev: (f64, f64),
    curr: (f64, f64),
    position: PositionState,
) -> Option<Direction> {
    let (prev_fast, prev_slow) = prev;
    let (fast, slow) = curr;

    if prev_fast <= prev_slow && fast > slow && position.admits(Direction::Buy) {
        Some(Direction::Buy)
    } else if prev_fast >= prev_slow && fast < slow && position.admits(Direction::Sell) {
        Some(Direction::Sell)
    } else {
        None
    }
}

/// Oscillator leaving the oversold zone (buy) or entering the overbought zone (sell).
pub fn threshold_decision(
    prev: f64,
    curr: f64,
    oversold: f64,
    overbought: f64,
    position: PositionState,
) -> Option<Direction> {
    if prev <= oversold && curr > oversold && position.admits(Direction::Buy) {
        Some(Direction::Buy)
    } else if prev < overbought && curr >= overbought && position.admits(Direction::Sell) {
        Some(Direction::Sell)
    } else {
        None
    }
}

/// Price touching a band; evaluated on the current bar alone.
pub fn band_touch_decision(
    price: f64,
    lower: f64,
    upper: f64,
    position: PositionState,
) -> Option<Direction> {
    if price <= lower && position.admits(Direction::Buy) {
        Some(Direction::Buy)
    } else if price >= upper && position.admits(Direction::Sell) {
        Some(Direction::Sell)
    } else {
        None
    }
}

struct SignalMachine {
    source: StrategyId,
    position: PositionState,
    signals: Vec<Signal>,
}

impl SignalMachine {
    fn new(source: StrategyId) -> Self {
        Self {
            source,
            position: PositionState::Flat,
            signals: Vec::new(),
        }
    }

    fn emit(
        &mut self,
        bar: &PriceBar,
        direction: Direction,
        confidence: f64,
        supporting: SupportingValues,
    ) {
        self.signals.push(Signal {
            date: bar.date,
            direction,
            strength: SignalStrength::Normal,
            price: bar.close,
            confidence,
            source: self.source,
            supporting,
        });
        self.position = PositionState::after(direction);
    }

    fn finish(self) -> Vec<Signal> {
        self.signals
    }
}

/// Runs `kind` over `bars` using the pre-computed `indicators`.
pub fn generate_signals(
    kind: &StrategyKind,
    bars: &[PriceBar],
    indicators: &IndicatorSet,
) -> Result<Vec<Signal>, SigtraderError> {
    // combined defers history checks to its components
    if *kind != StrategyKind::Combined {
        check_history(kind, bars)?;
    }

    let signals = match *kind {
        StrategyKind::MovingAverageCrossover {
            short_period,
            long_period,
        } => {
            let short = lookup(kind, indicators, IndicatorType::Sma(short_period), bars)?;
            let long = lookup(kind, indicators, IndicatorType::Sma(long_period), bars)?;
            moving_average_crossover(bars, short, long)
        }
        StrategyKind::RsiThreshold {
            period,
            oversold,
            overbought,
        } => {
            let rsi = lookup(kind, indicators, IndicatorType::Rsi(period), bars)?;
            rsi_threshold(bars, rsi, oversold, overbought)
        }
        StrategyKind::MacdCrossover => {
            let macd = lookup(kind, indicators, DEFAULT_MACD, bars)?;
            macd_crossover(bars, macd)
        }
        StrategyKind::BollingerTouch { period, std_dev } => {
            let bands = lookup(kind, indicators, IndicatorType::bollinger(period, std_dev), bars)?;
            bollinger_touch(bars, bands)
        }
        StrategyKind::Combined => combine_components(&component_signals(bars, indicators)?),
    };

    debug!(strategy = %kind, bars = bars.len(), signals = signals.len(), "generated signals");
    Ok(signals)
}

/// Runs the components of the combined strategy in vote order. The first
/// failing component is reported as `SubStrategyFailed`.
pub fn component_signals(
    bars: &[PriceBar],
    indicators: &IndicatorSet,
) -> Result<Vec<(StrategyKind, Vec<Signal>)>, SigtraderError> {
    StrategyKind::combined_components()
        .into_iter()
        .map(|component| {
            generate_signals(&component, bars, indicators)
                .map(|signals| (component, signals))
                .map_err(|e| SigtraderError::SubStrategyFailed {
                    strategy: component.name(),
                    reason: e.to_string(),
                })
        })
        .collect()
}

pub fn combine_components(components: &[(StrategyKind, Vec<Signal>)]) -> Vec<Signal> {
    let streams: Vec<(StrategyId, Vec<Signal>)> = components
        .iter()
        .map(|(kind, signals)| (kind.id(), signals.clone()))
        .collect();
    combine_signals(&streams)
}

fn check_history(kind: &StrategyKind, bars: &[PriceBar]) -> Result<(), SigtraderError> {
    let minimum = kind.min_bars();
    if bars.len() < minimum {
        return Err(SigtraderError::InsufficientData {
            strategy: kind.name(),
            bars: bars.len(),
            minimum,
        });
    }
    if !is_chronological(bars) {
        return Err(SigtraderError::UnorderedBars {
            strategy: kind.name(),
        });
    }
    Ok(())
}

fn lookup<'a>(
    kind: &StrategyKind,
    indicators: &'a IndicatorSet,
    indicator_type: IndicatorType,
    bars: &[PriceBar],
) -> Result<&'a IndicatorSeries, SigtraderError> {
    let series = indicators
        .get(&indicator_type)
        .ok_or_else(|| SigtraderError::MissingIndicator {
            strategy: kind.name(),
            indicator: indicator_type.to_string(),
        })?;

    if series.len() != bars.len() {
        return Err(SigtraderError::MisalignedIndicator {
            strategy: kind.name(),
            indicator: indicator_type.to_string(),
            expected: bars.len(),
            actual: series.len(),
        });
    }
    Ok(series)
}

fn moving_average_crossover(
    bars: &[PriceBar],
    short: &IndicatorSeries,
    long: &IndicatorSeries,
) -> Vec<Signal> {
    let mut machine = SignalMachine::new(StrategyId::MovingAverage);

    for i in 1..bars.len() {
        let (Some(prev_short), Some(prev_long), Some(short_ma), Some(long_ma)) = (
            short.simple(i - 1),
            long.simple(i - 1),
            short.simple(i),
            long.simple(i),
        ) else {
            continue;
        };

        if let Some(direction) = crossover_decision(
            (prev_short, prev_long),
            (short_ma, long_ma),
            machine.position,
        ) {
            machine.emit(
                &bars[i],
                direction,
                moving_average_confidence(short_ma, long_ma, direction),
                SupportingValues::MovingAverage { short_ma, long_ma },
            );
        }
    }

    machine.finish()
}

fn rsi_threshold(
    bars: &[PriceBar],
    rsi: &IndicatorSeries,
    oversold: f64,
    overbought: f64,
) -> Vec<Signal> {
    let mut machine = SignalMachine::new(StrategyId::Rsi);

    for i in 1..bars.len() {
        let (Some(prev), Some(curr)) = (rsi.simple(i - 1), rsi.simple(i)) else {
            continue;
        };

        if let Some(direction) =
            threshold_decision(prev, curr, oversold, overbought, machine.position)
        {
            machine.emit(
                &bars[i],
                direction,
                rsi_confidence(curr, direction),
                SupportingValues::Rsi { rsi: curr },
            );
        }
    }

    machine.finish()
}

fn macd_crossover(bars: &[PriceBar], macd: &IndicatorSeries) -> Vec<Signal> {
    let mut machine = SignalMachine::new(StrategyId::Macd);

    for i in 1..bars.len() {
        let (Some((prev_line, prev_signal, _)), Some((line, signal, histogram))) =
            (macd.macd(i - 1), macd.macd(i))
        else {
            continue;
        };

        if let Some(direction) =
            crossover_decision((prev_line, prev_signal), (line, signal), machine.position)
        {
            machine.emit(
                &bars[i],
                direction,
                macd_confidence(line, signal),
                SupportingValues::Macd {
                    macd: line,
                    signal,
                    histogram,
                },
            );
        }
    }

    machine.finish()
}

fn bollinger_touch(bars: &[PriceBar], bands: &IndicatorSeries) -> Vec<Signal> {
    let mut machine = SignalMachine::new(StrategyId::BollingerBands);

    for (i, bar) in bars.iter().enumerate() {
        let Some((upper, middle, lower)) = bands.bands(i) else {
            continue;
        };

        if let Some(direction) = band_touch_decision(bar.close, lower, upper, machine.position) {
            let touched = match direction {
                Direction::Buy => lower,
                Direction::Sell => upper,
            };
            machine.emit(
                bar,
                direction,
                bollinger_confidence(bar.close, touched, middle),
                SupportingValues::Bollinger {
                    upper,
                    middle,
                    lower,
                },
            );
        }
    }

    machine.finish()
}
