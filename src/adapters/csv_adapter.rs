//! CSV file market data adapter.
//!
//! Reads `<SYMBOL>.csv` files with a `date,open,high,low,close,volume`
//! header from a base directory. Empty cells are undefined values. An
//! optional `symbols.csv` in the same directory supplies descriptive
//! records for [`MarketDataPort::symbol_info`].

use crate::domain::error::StockscopeError;
use crate::domain::processor::resample;
use crate::domain::series::{Column, PriceSeries, CLOSE, HIGH, LOW, OPEN, VOLUME};
use crate::ports::data_port::{Interval, MarketDataPort, Period, SymbolInfo};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SYMBOLS_FILE: &str = "symbols.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

// Capitalized aliases accept files written by `write_series`.
#[derive(Debug, Deserialize)]
struct PriceRecord {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
    #[serde(alias = "Volume")]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SymbolRecord {
    symbol: String,
    name: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    market_cap: Option<f64>,
    pe_ratio: Option<f64>,
    dividend_yield: Option<f64>,
    beta: Option<f64>,
    week52_high: Option<f64>,
    week52_low: Option<f64>,
}

impl SymbolRecord {
    fn into_info(self) -> SymbolInfo {
        let text = |value: Option<String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| SymbolInfo::NOT_AVAILABLE.to_string())
        };
        SymbolInfo {
            name: self
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| self.symbol.clone()),
            sector: text(self.sector),
            industry: text(self.industry),
            market_cap: self.market_cap.unwrap_or(0.0),
            pe_ratio: self.pe_ratio.unwrap_or(0.0),
            dividend_yield: self.dividend_yield.unwrap_or(0.0),
            beta: self.beta.unwrap_or(0.0),
            week52_high: self.week52_high.unwrap_or(0.0),
            week52_low: self.week52_low.unwrap_or(0.0),
            symbol: self.symbol,
        }
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Every row of `<symbol>.csv`, sorted by date. `None` when the file does
    /// not exist.
    pub fn read_series(&self, symbol: &str) -> Result<Option<PriceSeries>, StockscopeError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| source_error(&path, e))?;
        let mut records = reader
            .deserialize::<PriceRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| source_error(&path, e))?;
        records.sort_by_key(|r| r.date);

        let column = |f: fn(&PriceRecord) -> Option<f64>| -> Column {
            records.iter().map(f).collect()
        };
        let columns = vec![
            (OPEN.to_string(), column(|r| r.open)),
            (HIGH.to_string(), column(|r| r.high)),
            (LOW.to_string(), column(|r| r.low)),
            (CLOSE.to_string(), column(|r| r.close)),
            (VOLUME.to_string(), column(|r| r.volume)),
        ];
        let dates = records.iter().map(|r| r.date).collect();
        PriceSeries::from_columns(symbol, dates, columns).map(Some)
    }
}

fn source_error(path: &Path, err: impl std::fmt::Display) -> StockscopeError {
    StockscopeError::DataSource {
        reason: format!("{}: {}", path.display(), err),
    }
}

/// Write `series` as CSV: a `date` column followed by every series column.
/// Undefined cells are written as empty fields.
pub fn write_series(series: &PriceSeries, path: &Path) -> Result<(), StockscopeError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| source_error(path, e))?;

    let mut header = vec!["date".to_string()];
    header.extend(series.column_names().map(String::from));
    writer
        .write_record(&header)
        .map_err(|e| source_error(path, e))?;

    for (row, date) in series.dates().iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(
            series
                .columns()
                .iter()
                .map(|(_, values)| values[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer
            .write_record(&record)
            .map_err(|e| source_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

impl MarketDataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Option<PriceSeries>, StockscopeError> {
        let Some(series) = self.read_series(symbol)? else {
            return Ok(None);
        };
        let Some(&end) = series.dates().last() else {
            return Ok(None);
        };

        let windowed = match period.start_date(end) {
            Some(start) => series.between(start, end),
            None => series,
        };

        match interval.frequency() {
            Some(frequency) => resample(&windowed, frequency, None).map(Some),
            None => Ok(Some(windowed)),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockscopeError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| source_error(&self.base_path, e))?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| source_error(&self.base_path, e))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if name_str == SYMBOLS_FILE {
                continue;
            }
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, StockscopeError> {
        let path = self.base_path.join(SYMBOLS_FILE);
        if !path.exists() {
            return Ok(SymbolInfo::unknown(symbol));
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| source_error(&path, e))?;
        for record in reader.deserialize::<SymbolRecord>() {
            let record = record.map_err(|e| source_error(&path, e))?;
            if record.symbol.eq_ignore_ascii_case(symbol) {
                return Ok(record.into_info());
            }
        }
        Ok(SymbolInfo::unknown(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,,60000\n";
        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(
            path.join(SYMBOLS_FILE),
            "symbol,name,sector,industry,market_cap,pe_ratio,dividend_yield,beta,week52_high,week52_low\n\
             AAPL,Apple Inc.,Technology,,3000000000000,30.5,0.005,1.2,200,150\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_ohlcv_returns_sorted_rows() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_ohlcv("AAPL", Period::Max, Interval::Daily)
            .unwrap()
            .unwrap();

        assert_eq!(
            series.dates(),
            &[date(2024, 1, 15), date(2024, 1, 16), date(2024, 1, 17)]
        );
        assert_eq!(series.value(OPEN, 0), Some(100.0));
        assert_eq!(series.value(HIGH, 0), Some(110.0));
        assert_eq!(series.value(LOW, 0), Some(90.0));
        assert_eq!(series.value(VOLUME, 0), Some(50000.0));
        assert_eq!(series.symbol, "AAPL");
    }

    #[test]
    fn empty_cells_are_undefined() {
        let (_dir, path) = setup_test_data();
        let series = CsvAdapter::new(path).read_series("AAPL").unwrap().unwrap();
        assert_eq!(series.column(CLOSE).unwrap(), &[Some(105.0), None, Some(115.0)]);
    }

    #[test]
    fn fetch_ohlcv_filters_by_period() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_ohlcv("AAPL", Period::Days(2), Interval::Daily)
            .unwrap()
            .unwrap();
        assert_eq!(series.dates(), &[date(2024, 1, 16), date(2024, 1, 17)]);
    }

    #[test]
    fn fetch_ohlcv_resamples_weekly() {
        let (_dir, path) = setup_test_data();
        let series = CsvAdapter::new(path)
            .fetch_ohlcv("AAPL", Period::Max, Interval::Weekly)
            .unwrap()
            .unwrap();
        assert_eq!(series.dates(), &[date(2024, 1, 21)]);
        assert_eq!(series.value(OPEN, 0), Some(100.0));
        assert_eq!(series.value(CLOSE, 0), Some(115.0));
        assert_eq!(series.value(VOLUME, 0), Some(165000.0));
    }

    #[test]
    fn fetch_ohlcv_missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let result = CsvAdapter::new(path).fetch_ohlcv("XYZ", Period::Max, Interval::Daily);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn fetch_ohlcv_header_only_is_no_data() {
        let (_dir, path) = setup_test_data();
        let result = CsvAdapter::new(path).fetch_ohlcv("EMPTY", Period::Max, Interval::Daily);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn malformed_value_is_source_error() {
        let (_dir, path) = setup_test_data();
        fs::write(
            path.join("BAD.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,1,1,1,1\n",
        )
        .unwrap();
        let result = CsvAdapter::new(path).fetch_ohlcv("BAD", Period::Max, Interval::Daily);
        assert!(matches!(result, Err(StockscopeError::DataSource { .. })));
    }

    #[test]
    fn list_symbols_skips_symbol_file() {
        let (_dir, path) = setup_test_data();
        let symbols = CsvAdapter::new(path).list_symbols().unwrap();
        assert_eq!(symbols, vec!["AAPL", "EMPTY"]);
    }

    #[test]
    fn symbol_info_reads_record() {
        let (_dir, path) = setup_test_data();
        let info = CsvAdapter::new(path).symbol_info("aapl").unwrap();
        assert_eq!(info.name, "Apple Inc.");
        assert_eq!(info.sector, "Technology");
        assert_eq!(info.industry, "N/A");
        assert_eq!(info.pe_ratio, 30.5);
        assert_eq!(info.week52_low, 150.0);
    }

    #[test]
    fn symbol_info_unknown_symbol() {
        let (_dir, path) = setup_test_data();
        let info = CsvAdapter::new(path).symbol_info("MSFT").unwrap();
        assert_eq!(info, SymbolInfo::unknown("MSFT"));
    }

    #[test]
    fn write_series_keeps_undefined_cells_empty() {
        let (dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let series = adapter.read_series("AAPL").unwrap().unwrap();

        let out = dir.path().join("out.csv");
        write_series(&series, &out).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "date,Open,High,Low,Close,Volume");
        assert_eq!(lines[2], "2024-01-16,105,115,100,,60000");
    }

    #[test]
    fn written_series_reads_back() {
        let (dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let series = adapter.read_series("AAPL").unwrap().unwrap();

        let export_dir = dir.path().join("export");
        fs::create_dir(&export_dir).unwrap();
        write_series(&series, &export_dir.join("AAPL.csv")).unwrap();

        let reread = CsvAdapter::new(export_dir).read_series("AAPL").unwrap().unwrap();
        assert_eq!(reread, series);
    }
}
