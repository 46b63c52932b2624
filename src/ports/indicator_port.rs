//! Indicator computation port trait.

use crate::domain::indicator::{IndicatorSet, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub trait IndicatorPort: Send + Sync {
    /// Computes each requested series aligned to `bars`. A request whose
    /// window cannot be satisfied by the data is left out of the set.
    fn compute(&self, bars: &[PriceBar], requests: &[IndicatorType]) -> IndicatorSet;
}
