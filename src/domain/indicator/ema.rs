//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_ema(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values: ema_values(bars.iter().map(|b| b.close), period)
            .into_iter()
            .map(|v| v.map(IndicatorValue::Simple))
            .collect(),
    }
}

/// EMA over an arbitrary input stream, `None` until `period` inputs were seen.
pub(crate) fn ema_values<I>(inputs: I, period: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = f64>,
{
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    inputs
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            if period == 0 {
                None
            } else if i + 1 < period {
                sum += value;
                None
            } else if i + 1 == period {
                sum += value;
                ema = sum / period as f64;
                Some(ema)
            } else {
                ema = value * k + ema * (1.0 - k);
                Some(ema)
            }
        })
        .collect()
}
