//! Price bar representation.

use chrono::{Days, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// Bar where every price field equals `close`.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// True when every bar is strictly later than its predecessor.
pub fn is_chronological(bars: &[PriceBar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}

/// First day of a `lookback_days` window ending at `end`. `None` when the
/// lookback is negative or runs past the earliest representable date.
pub fn window_start(end: NaiveDate, lookback_days: i64) -> Option<NaiveDate> {
    u64::try_from(lookback_days)
        .ok()
        .and_then(|days| end.checked_sub_days(Days::new(days)))
}
