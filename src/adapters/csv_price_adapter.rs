//! CSV price history adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::{PriceBar, is_chronological};
use crate::ports::price_history_port::PriceHistoryPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Every bar in the symbol's file, oldest first.
    fn read_all(&self, symbol: &str) -> Result<Vec<PriceBar>, SigtraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SigtraderError::UnknownSymbol {
                symbol: symbol.to_string(),
            },
            _ => SigtraderError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| SigtraderError::DataSource {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            let line = row + 2;

            let date_str = field(&record, 0, "date", line)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SigtraderError::DataSource {
                    reason: format!("line {}: invalid date '{}': {}", line, date_str, e),
                }
            })?;

            bars.push(PriceBar {
                date,
                open: number(&record, 1, "open", line)?,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?.round() as i64,
            });
        }

        bars.sort_by_key(|b| b.date);
        if !is_chronological(&bars) {
            let duplicate = bars
                .windows(2)
                .find(|w| w[0].date == w[1].date)
                .map(|w| w[0].date.to_string())
                .unwrap_or_default();
            return Err(SigtraderError::DataSource {
                reason: format!("{}: duplicate date {}", path.display(), duplicate),
            });
        }
        Ok(bars)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, SigtraderError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| SigtraderError::DataSource {
            reason: format!("line {}: missing {} column", line, name),
        })
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<f64, SigtraderError> {
    let raw = field(record, index, name, line)?;
    raw.parse().map_err(|e| SigtraderError::DataSource {
        reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
    })
}

impl PriceHistoryPort for CsvPriceAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, SigtraderError> {
        let bars: Vec<PriceBar> = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        debug!(symbol, %start, %end, bars = bars.len(), "loaded price history");
        Ok(bars)
    }

    fn latest_date(&self, symbol: &str) -> Result<NaiveDate, SigtraderError> {
        self.read_all(symbol)?
            .last()
            .map(|b| b.date)
            .ok_or_else(|| SigtraderError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigtraderError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SigtraderError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
