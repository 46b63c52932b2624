//! Price history access port trait.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

/// Source of chronological daily bars per symbol.
///
/// Implementations are shared across the portfolio aggregator's worker
/// threads, hence `Send + Sync`.
pub trait PriceHistoryPort: Send + Sync {
    /// Bars with `start <= date <= end`, oldest first.
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, SigtraderError>;

    /// Date of the most recent bar, `NoData` if the symbol has none.
    fn latest_date(&self, symbol: &str) -> Result<NaiveDate, SigtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, SigtraderError>;
}
