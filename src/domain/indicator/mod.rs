//! Index-aligned indicator series.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: One value slot per price bar, `None` before warm-up completes
//! - `IndicatorSet`: The series computed for one price history
//!
//! Series are never shortened: entry `i` always describes bar `i`.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod bollinger;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Bollinger key for a floating-point band multiplier.
    pub fn bollinger(period: usize, std_dev: f64) -> Self {
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (std_dev * 100.0).round().max(0.0) as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<IndicatorValue>>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar reading at `index`; `None` if undefined, out of range or not scalar.
    pub fn simple(&self, index: usize) -> Option<f64> {
        match self.values.get(index).copied().flatten() {
            Some(IndicatorValue::Simple(v)) => Some(v),
            _ => None,
        }
    }

    /// (line, signal, histogram) at `index`.
    pub fn macd(&self, index: usize) -> Option<(f64, f64, f64)> {
        match self.values.get(index).copied().flatten() {
            Some(IndicatorValue::Macd {
                line,
                signal,
                histogram,
            }) => Some((line, signal, histogram)),
            _ => None,
        }
    }

    /// (upper, middle, lower) at `index`.
    pub fn bands(&self, index: usize) -> Option<(f64, f64, f64)> {
        match self.values.get(index).copied().flatten() {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => Some((upper, middle, lower)),
            _ => None,
        }
    }

    /// Number of leading undefined entries.
    pub fn warmup(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }
}

/// Indicator series keyed by identity, all aligned to the same bars.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: IndicatorSeries) {
        self.series.insert(series.indicator_type, series);
    }

    pub fn get(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(indicator_type)
    }

    pub fn contains(&self, indicator_type: &IndicatorType) -> bool {
        self.series.contains_key(indicator_type)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<IndicatorSeries> for IndicatorSet {
    fn from_iter<I: IntoIterator<Item = IndicatorSeries>>(iter: I) -> Self {
        let mut set = IndicatorSet::new();
        for series in iter {
            set.insert(series);
        }
        set
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
