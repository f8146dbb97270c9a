//! Multi-symbol comparison: shared timeline, correlation, performance table.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::stddev::sample_stddev;
use crate::domain::processor::TRADING_DAYS_PER_YEAR;
use crate::domain::series::{Column, PriceSeries, CLOSE, HIGH, LOW, VOLUME};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Symbol of tables assembled from several symbols.
pub const COMBINED_SYMBOL: &str = "COMBINED";

/// Sorted union of every series' dates.
pub fn build_unified_timeline<'a>(
    series: impl IntoIterator<Item = &'a PriceSeries>,
) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .into_iter()
        .flat_map(|s| s.dates().iter().copied())
        .collect();
    unique_dates.into_iter().collect()
}

/// Re-index `column` of `series` onto `timeline`. Dates the series lacks are
/// undefined; a duplicated date resolves to its first row.
pub fn align_column(
    series: &PriceSeries,
    column: &str,
    timeline: &[NaiveDate],
) -> Result<Column, StockscopeError> {
    let values = series.require(column)?;
    let mut date_index: HashMap<NaiveDate, usize> = HashMap::with_capacity(series.len());
    for (row, date) in series.dates().iter().enumerate() {
        date_index.entry(*date).or_insert(row);
    }
    Ok(timeline
        .iter()
        .map(|date| date_index.get(date).and_then(|&row| values[row]))
        .collect())
}

/// Close of every series on the unified timeline, one column per symbol.
pub fn aligned_closes(series: &[PriceSeries]) -> Result<PriceSeries, StockscopeError> {
    let timeline = build_unified_timeline(series);
    let columns = series
        .iter()
        .map(|s| align_column(s, CLOSE, &timeline).map(|close| (s.symbol.clone(), close)))
        .collect::<Result<Vec<_>, _>>()?;
    PriceSeries::from_columns(COMBINED_SYMBOL, timeline, columns)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation of Close between every pair of symbols, over the
/// dates both have defined.
pub fn correlation_matrix(series: &[PriceSeries]) -> Result<CorrelationMatrix, StockscopeError> {
    let closes = aligned_closes(series)?;
    let columns = closes.columns();
    let values = columns
        .iter()
        .map(|(_, x)| columns.iter().map(|(_, y)| pearson(x, y)).collect())
        .collect();
    Ok(CorrelationMatrix {
        symbols: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    })
}

/// Pearson correlation over pairwise-complete observations. Undefined with
/// fewer than two pairs or when either side has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// One row of the comparison performance table.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub symbol: String,
    pub first_close: f64,
    pub last_close: f64,
    pub change: f64,
    pub change_pct: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// Annualized volatility of daily Close changes, in percent.
    pub volatility_pct: Option<f64>,
    pub avg_volume: Option<f64>,
}

impl PerformanceSummary {
    pub fn compute(series: &PriceSeries) -> Result<Self, StockscopeError> {
        let closes = series.require(CLOSE)?;
        let defined: Vec<f64> = closes.iter().flatten().copied().collect();
        let (Some(&first_close), Some(&last_close)) = (defined.first(), defined.last()) else {
            return Err(StockscopeError::NoData {
                symbol: series.symbol.clone(),
            });
        };

        let change = last_close - first_close;
        let change_pct = if first_close != 0.0 {
            change / first_close * 100.0
        } else {
            0.0
        };

        let changes: Vec<f64> = closes
            .windows(2)
            .filter_map(|w| match (w[0], w[1]) {
                (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                _ => None,
            })
            .collect();
        let volatility_pct = (changes.len() >= 2)
            .then(|| sample_stddev(&changes) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0);

        Ok(PerformanceSummary {
            symbol: series.symbol.clone(),
            first_close,
            last_close,
            change,
            change_pct,
            high: column_extreme(series, HIGH, f64::max),
            low: column_extreme(series, LOW, f64::min),
            volatility_pct,
            avg_volume: column_mean(series, VOLUME),
        })
    }
}

fn column_extreme(series: &PriceSeries, name: &str, pick: fn(f64, f64) -> f64) -> Option<f64> {
    series.column(name)?.iter().flatten().copied().reduce(pick)
}

fn column_mean(series: &PriceSeries, name: &str) -> Option<f64> {
    let values: Vec<f64> = series.column(name)?.iter().flatten().copied().collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Latest close against the one before it, as shown on overview cards.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyChange {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub change: f64,
    pub change_pct: f64,
}

impl DailyChange {
    /// `None` with fewer than two rows or an undefined close on either row.
    pub fn compute(series: &PriceSeries) -> Option<Self> {
        let last = series.len().checked_sub(1)?;
        let prev = last.checked_sub(1)?;
        let close = series.value(CLOSE, last)?;
        let previous = series.value(CLOSE, prev)?;
        let change = close - previous;
        let change_pct = if previous != 0.0 {
            change / previous * 100.0
        } else {
            0.0
        };
        Some(DailyChange {
            symbol: series.symbol.clone(),
            date: series.dates()[last],
            close,
            change,
            change_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::fixtures::{day, series_from_closes};
    use approx::assert_relative_eq;

    fn named(symbol: &str, closes: &[f64]) -> PriceSeries {
        let mut series = series_from_closes(closes);
        series.symbol = symbol.to_string();
        series
    }

    fn offset(symbol: &str, start: usize, closes: &[f64]) -> PriceSeries {
        let base = named(symbol, closes);
        let dates = (start..start + closes.len()).map(day).collect();
        PriceSeries::from_columns(symbol, dates, base.columns().to_vec()).unwrap()
    }

    #[test]
    fn unified_timeline_is_sorted_union() {
        let a = offset("A", 0, &[1.0, 2.0, 3.0]);
        let b = offset("B", 2, &[1.0, 2.0]);
        assert_eq!(
            build_unified_timeline(&[b, a]),
            vec![day(0), day(1), day(2), day(3)]
        );
    }

    #[test]
    fn unified_timeline_of_nothing_is_empty() {
        let none: Vec<PriceSeries> = Vec::new();
        assert!(build_unified_timeline(&none).is_empty());
    }

    #[test]
    fn aligned_closes_fill_missing_dates_with_none() {
        let a = offset("A", 0, &[1.0, 2.0]);
        let b = offset("B", 1, &[5.0, 6.0]);
        let aligned = aligned_closes(&[a, b]).unwrap();
        assert_eq!(aligned.column("A").unwrap(), &[Some(1.0), Some(2.0), None]);
        assert_eq!(aligned.column("B").unwrap(), &[None, Some(5.0), Some(6.0)]);
    }

    #[test]
    fn correlation_of_linear_series_is_one() {
        let a = named("A", &[1.0, 2.0, 3.0, 4.0]);
        let b = named("B", &[10.0, 20.0, 30.0, 40.0]);
        let c = named("C", &[4.0, 3.0, 2.0, 1.0]);
        let matrix = correlation_matrix(&[a, b, c]).unwrap();
        assert_relative_eq!(matrix.get("A", "B").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix.get("A", "C").unwrap(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix.get("B", "B").unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(matrix.get("A", "Z"), None);
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() {
        let x = [Some(1.0), None, Some(3.0), Some(5.0)];
        let y = [Some(2.0), Some(100.0), Some(6.0), Some(10.0)];
        assert_relative_eq!(pearson(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn correlation_degenerate_cases_are_undefined() {
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
        assert_eq!(pearson(&[Some(1.0), Some(1.0)], &[Some(2.0), Some(3.0)]), None);
    }

    #[test]
    fn performance_summary_fields() {
        let series = named("A", &[100.0, 110.0, 99.0, 120.0]);
        let summary = PerformanceSummary::compute(&series).unwrap();
        assert_eq!(summary.first_close, 100.0);
        assert_eq!(summary.last_close, 120.0);
        assert_relative_eq!(summary.change_pct, 20.0, epsilon = 1e-12);
        assert_eq!(summary.high, Some(120.0));
        assert_eq!(summary.low, Some(99.0));
        assert_eq!(summary.avg_volume, Some(1000.0));

        let changes = [0.10, -0.10, 120.0 / 99.0 - 1.0];
        let expected = sample_stddev(&changes) * 252f64.sqrt() * 100.0;
        assert_relative_eq!(summary.volatility_pct.unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn performance_summary_without_closes_is_no_data() {
        let series = PriceSeries::new("EMPTY", vec![])
            .with_column(CLOSE, vec![])
            .unwrap();
        assert!(matches!(
            PerformanceSummary::compute(&series),
            Err(StockscopeError::NoData { .. })
        ));
    }

    #[test]
    fn daily_change_compares_last_two_rows() {
        let change = DailyChange::compute(&named("^GSPC", &[100.0, 98.0])).unwrap();
        assert_eq!(change.close, 98.0);
        assert_eq!(change.change, -2.0);
        assert_relative_eq!(change.change_pct, -2.0, epsilon = 1e-12);
        assert_eq!(change.date, day(1));
    }

    #[test]
    fn daily_change_needs_two_rows() {
        assert_eq!(DailyChange::compute(&named("X", &[1.0])), None);
    }
}
