//! Built-in technical indicator provider.

use crate::domain::indicator::{
    IndicatorSeries, IndicatorSet, IndicatorType, calculate_bollinger, calculate_ema,
    calculate_macd, calculate_rsi, calculate_sma,
};
use crate::domain::ohlcv::PriceBar;
use crate::ports::indicator_port::IndicatorPort;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalIndicatorAdapter;

impl TechnicalIndicatorAdapter {
    pub fn new() -> Self {
        TechnicalIndicatorAdapter
    }

    fn calculate(bars: &[PriceBar], indicator_type: IndicatorType) -> IndicatorSeries {
        match indicator_type {
            IndicatorType::Sma(period) => calculate_sma(bars, period),
            IndicatorType::Ema(period) => calculate_ema(bars, period),
            IndicatorType::Rsi(period) => calculate_rsi(bars, period),
            IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => calculate_bollinger(bars, period, stddev_mult_x100 as f64 / 100.0),
        }
    }
}

impl IndicatorPort for TechnicalIndicatorAdapter {
    fn compute(&self, bars: &[PriceBar], requests: &[IndicatorType]) -> IndicatorSet {
        let mut set = IndicatorSet::new();
        for &indicator_type in requests {
            if set.contains(&indicator_type) {
                continue;
            }
            let series = Self::calculate(bars, indicator_type);
            if series.values.iter().any(Option::is_some) {
                set.insert(series);
            } else {
                debug!(indicator = %indicator_type, bars = bars.len(), "window exceeds history");
            }
        }
        set
    }
}
