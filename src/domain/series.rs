//! Column-oriented price table keyed by trading date.
//!
//! A [`PriceSeries`] holds a date index plus an ordered list of named
//! columns. Each cell is `Option<f64>`: `None` marks an undefined value,
//! either a gap in the source data or the warm-up window of a windowed
//! computation. Indicator and processor functions append columns; they never
//! reorder or drop the existing ones.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::IndicatorSet;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub type Column = Vec<Option<f64>>;

pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";

pub const BASE_COLUMNS: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Column)>,
}

impl PriceSeries {
    /// An empty table over `dates`, with no columns yet.
    pub fn new(symbol: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self {
            symbol: symbol.into(),
            dates,
            columns: Vec::new(),
        }
    }

    pub fn from_bars(symbol: impl Into<String>, bars: &[OhlcvBar]) -> Self {
        let dates = bars.iter().map(|b| b.date).collect();
        let column = |f: fn(&OhlcvBar) -> f64| -> Column { bars.iter().map(|b| Some(f(b))).collect() };
        Self {
            symbol: symbol.into(),
            dates,
            columns: vec![
                (OPEN.to_string(), column(|b| b.open)),
                (HIGH.to_string(), column(|b| b.high)),
                (LOW.to_string(), column(|b| b.low)),
                (CLOSE.to_string(), column(|b| b.close)),
                (VOLUME.to_string(), column(|b| b.volume as f64)),
            ],
        }
    }

    /// Build a series from already-assembled columns, checking every column
    /// against the index length.
    pub fn from_columns(
        symbol: impl Into<String>,
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Column)>,
    ) -> Result<Self, StockscopeError> {
        let mut series = Self::new(symbol, dates);
        for (name, values) in columns {
            series.insert_column(&name, values)?;
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Like [`column`](Self::column), but a missing column is a caller error.
    pub fn require(&self, name: &str) -> Result<&[Option<f64>], StockscopeError> {
        self.column(name)
            .ok_or_else(|| StockscopeError::missing_column(name))
    }

    /// Value of `name` at `row`, `None` if the column, the row or the value is
    /// absent.
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name).and_then(|c| c.get(row).copied().flatten())
    }

    /// Value of `name` on the most recent row.
    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.len().checked_sub(1).and_then(|row| self.value(name, row))
    }

    /// Insert a column, replacing one with the same name in place.
    pub fn insert_column(&mut self, name: &str, values: Column) -> Result<(), StockscopeError> {
        if values.len() != self.len() {
            return Err(StockscopeError::ColumnLength {
                column: name.to_string(),
                expected: self.len(),
                actual: values.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_string(), values)),
        }
        Ok(())
    }

    pub fn with_column(mut self, name: &str, values: Column) -> Result<Self, StockscopeError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Append every column of an indicator computation.
    pub fn with_indicator(mut self, set: IndicatorSet) -> Result<Self, StockscopeError> {
        for (name, values) in set.columns {
            self.insert_column(&name, values)?;
        }
        Ok(self)
    }

    /// A new series containing only `rows`, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            symbol: self.symbol.clone(),
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), rows.iter().map(|&i| values[i]).collect()))
                .collect(),
        }
    }

    /// Rows whose date falls within `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| **d >= start && **d <= end)
            .map(|(i, _)| i)
            .collect();
        self.select_rows(&rows)
    }
}
