//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_bollinger(bars: &[PriceBar], period: usize, std_dev: f64) -> IndicatorSeries {
    let indicator_type = IndicatorType::bollinger(period, std_dev);
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        if period == 0 || i + 1 < period {
            values.push(None);
            continue;
        }

        let window = &bars[i + 1 - period..=i];
        let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance: f64 = window
            .iter()
            .map(|b| {
                let diff = b.close - middle;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        values.push(Some(IndicatorValue::Bollinger {
            upper: middle + std_dev * stddev,
            middle,
            lower: middle - std_dev * stddev,
        }));
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
