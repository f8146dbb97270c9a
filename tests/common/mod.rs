#![allow(dead_code)]

use chrono::NaiveDate;
pub use stockscope::domain::ohlcv::OhlcvBar;
use stockscope::domain::error::StockscopeError;
use stockscope::domain::series::PriceSeries;
use stockscope::ports::data_port::{Interval, MarketDataPort, Period, SymbolInfo};
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        _period: Period,
        _interval: Interval,
    ) -> Result<Option<PriceSeries>, StockscopeError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockscopeError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| PriceSeries::from_bars(symbol, bars)))
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockscopeError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, StockscopeError> {
        Ok(SymbolInfo::unknown(symbol))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// `count` consecutive days of bars whose close follows `price(i)`.
pub fn generate_bars(start_date: &str, count: usize, price: impl Fn(usize) -> f64) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = price(i);
            OhlcvBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000 + i as i64,
            }
        })
        .collect()
}

pub fn rising_bars(start_date: &str, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    generate_bars(start_date, count, |i| start_price + i as f64)
}

/// Write bars as `<dir>/<symbol>.csv` in the price file layout.
pub fn write_price_csv(dir: &Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for bar in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
