#![allow(dead_code)]

use chrono::NaiveDate;
use sigtrader::domain::error::SigtraderError;
pub use sigtrader::domain::ohlcv::PriceBar;
use sigtrader::ports::price_history_port::PriceHistoryPort;
use std::collections::HashMap;

pub struct MockPriceHistory {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceHistory {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn bars(&self, symbol: &str) -> Result<&Vec<PriceBar>, SigtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SigtraderError::DataSource {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .ok_or_else(|| SigtraderError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }
}

impl PriceHistoryPort for MockPriceHistory {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, SigtraderError> {
        Ok(self
            .bars(symbol)?
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect())
    }

    fn latest_date(&self, symbol: &str) -> Result<NaiveDate, SigtraderError> {
        self.bars(symbol)?
            .last()
            .map(|b| b.date)
            .ok_or_else(|| SigtraderError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, SigtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> PriceBar {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap();
    PriceBar {
        date,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000,
    }
}

/// Consecutive daily bars from 2024-01-01 with the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000,
        })
        .collect()
}

/// A slow oscillation around 100 that produces repeated crossovers.
pub fn wave_closes(n: usize, period: f64, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + amplitude * (i as f64 * std::f64::consts::TAU / period).sin())
        .collect()
}

pub fn wave_bars(n: usize) -> Vec<PriceBar> {
    bars_from_closes(&wave_closes(n, 40.0, 10.0))
}

pub fn write_price_csv(dir: &std::path::Path, symbol: &str, bars: &[PriceBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
