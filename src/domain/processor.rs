//! Cleaning and derived columns over raw price tables.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::rolling_stddev;
use crate::domain::series::{Column, PriceSeries, CLOSE, HIGH, LOW, OPEN, VOLUME};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub const RETURNS: &str = "Returns";
pub const CUMULATIVE_RETURNS: &str = "Cumulative_Returns";
pub const VOLATILITY: &str = "Volatility";

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;

/// Drop duplicate dates (first occurrence wins), fill gaps per column, and
/// drop rows that are still entirely undefined. Row order is preserved.
///
/// Interior gaps are interpolated linearly by row position; leading and
/// trailing gaps take the nearest observation.
pub fn clean(series: PriceSeries) -> Result<PriceSeries, StockscopeError> {
    let mut seen = HashSet::new();
    let unique: Vec<usize> = series
        .dates()
        .iter()
        .enumerate()
        .filter(|(_, date)| seen.insert(**date))
        .map(|(i, _)| i)
        .collect();
    let deduped = series.select_rows(&unique);

    let filled: Vec<(String, Column)> = deduped
        .columns()
        .iter()
        .map(|(name, values)| (name.clone(), interpolate(values)))
        .collect();

    let keep: Vec<usize> = (0..deduped.len())
        .filter(|&row| filled.iter().any(|(_, values)| values[row].is_some()))
        .collect();

    let cleaned =
        PriceSeries::from_columns(deduped.symbol.clone(), deduped.dates().to_vec(), filled)?;
    Ok(cleaned.select_rows(&keep))
}

fn interpolate(values: &[Option<f64>]) -> Column {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    let mut next = 0;
    (0..values.len())
        .map(|i| {
            while next < known.len() && known[next].0 < i {
                next += 1;
            }
            if values[i].is_some() {
                return values[i];
            }
            let before = next.checked_sub(1).map(|p| known[p]);
            let after = known.get(next).copied();
            match (before, after) {
                (Some((i0, v0)), Some((i1, v1))) => {
                    Some(v0 + (v1 - v0) * (i - i0) as f64 / (i1 - i0) as f64)
                }
                (Some((_, v)), None) | (None, Some((_, v))) => Some(v),
                (None, None) => None,
            }
        })
        .collect()
}

/// Append `Returns` (period-over-period change of `column`) and
/// `Cumulative_Returns` (compounded, undefined returns counted as zero).
pub fn calculate_returns(
    series: PriceSeries,
    column: &str,
) -> Result<PriceSeries, StockscopeError> {
    let values = series.require(column)?;

    let returns: Column = (0..values.len())
        .map(|i| {
            let prev = values[i.checked_sub(1)?]?;
            let curr = values[i]?;
            if prev == 0.0 {
                None
            } else {
                Some(curr / prev - 1.0)
            }
        })
        .collect();

    let mut growth = 1.0;
    let cumulative: Column = returns
        .iter()
        .map(|r| {
            growth *= 1.0 + r.unwrap_or(0.0);
            Some(growth - 1.0)
        })
        .collect();

    series
        .with_column(RETURNS, returns)?
        .with_column(CUMULATIVE_RETURNS, cumulative)
}

/// Append `Volatility`: trailing sample standard deviation of `column` over
/// `window`, annualized with √252.
pub fn calculate_volatility(
    series: PriceSeries,
    window: usize,
    column: &str,
) -> Result<PriceSeries, StockscopeError> {
    let values = series.require(column)?;
    let annualize = TRADING_DAYS_PER_YEAR.sqrt();
    let volatility: Column = rolling_stddev(values, window)
        .into_iter()
        .map(|sd| sd.map(|sd| sd * annualize))
        .collect();
    series.with_column(VOLATILITY, volatility)
}

/// Append `<column>_Normalized`, min-max scaled to `[0, 1]`. Undefined
/// throughout when the column is flat or has no observations.
pub fn normalize(series: PriceSeries, column: &str) -> Result<PriceSeries, StockscopeError> {
    let values = series.require(column)?;
    let defined = values.iter().flatten();
    let min = defined.clone().copied().fold(f64::INFINITY, f64::min);
    let max = defined.copied().fold(f64::NEG_INFINITY, f64::max);

    let range = max - min;
    let normalized: Column = values
        .iter()
        .map(|v| {
            if range.is_finite() && range > 0.0 {
                v.map(|v| (v - min) / range)
            } else {
                None
            }
        })
        .collect();

    let name = format!("{}_Normalized", column);
    series.with_column(&name, normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Frequency {
    /// Label of the bucket containing `date`: the last calendar day of its
    /// period. Weeks end on Sunday.
    pub fn period_end(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Day => date,
            Frequency::Week => {
                date + Duration::days(6 - date.weekday().num_days_from_monday() as i64)
            }
            Frequency::Month => last_day_of_month(date.year(), date.month()).unwrap_or(date),
            Frequency::Quarter => {
                let month = (date.month() - 1) / 3 * 3 + 3;
                last_day_of_month(date.year(), month).unwrap_or(date)
            }
            Frequency::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

impl FromStr for Frequency {
    type Err = StockscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "D" => Ok(Frequency::Day),
            "W" => Ok(Frequency::Week),
            "M" => Ok(Frequency::Month),
            "Q" => Ok(Frequency::Quarter),
            "Y" => Ok(Frequency::Year),
            other => Err(StockscopeError::InvalidArgument {
                reason: format!("unknown resample frequency '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Frequency::Day => "D",
            Frequency::Week => "W",
            Frequency::Month => "M",
            Frequency::Quarter => "Q",
            Frequency::Year => "Y",
        };
        write!(f, "{}", code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    First,
    Last,
    Max,
    Min,
    Sum,
    Mean,
}

impl Aggregation {
    /// Aggregate the defined values of one bucket; `None` when there are none.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            Aggregation::First => values[0],
            Aggregation::Last => values[values.len() - 1],
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
        })
    }
}

impl FromStr for Aggregation {
    type Err = StockscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(Aggregation::First),
            "last" => Ok(Aggregation::Last),
            "max" => Ok(Aggregation::Max),
            "min" => Ok(Aggregation::Min),
            "sum" => Ok(Aggregation::Sum),
            "mean" => Ok(Aggregation::Mean),
            other => Err(StockscopeError::InvalidArgument {
                reason: format!("unknown aggregation '{}'", other),
            }),
        }
    }
}

/// Open=first, High=max, Low=min, Close=last, Volume=sum.
pub fn default_aggregations() -> Vec<(String, Aggregation)> {
    vec![
        (OPEN.to_string(), Aggregation::First),
        (HIGH.to_string(), Aggregation::Max),
        (LOW.to_string(), Aggregation::Min),
        (CLOSE.to_string(), Aggregation::Last),
        (VOLUME.to_string(), Aggregation::Sum),
    ]
}

/// Group rows into calendar buckets and aggregate each listed column.
///
/// With `aggregations == None` the default OHLCV aggregation is applied to
/// whichever base columns the series has. Explicitly listed columns must
/// exist. Buckets whose aggregated row is entirely undefined are dropped.
pub fn resample(
    series: &PriceSeries,
    frequency: Frequency,
    aggregations: Option<&[(String, Aggregation)]>,
) -> Result<PriceSeries, StockscopeError> {
    let aggregations: Vec<(String, Aggregation)> = match aggregations {
        Some(list) => list.to_vec(),
        None => default_aggregations()
            .into_iter()
            .filter(|(name, _)| series.has_column(name))
            .collect(),
    };

    let sources: Vec<(&str, Aggregation, &[Option<f64>])> = aggregations
        .iter()
        .map(|(name, agg)| {
            series
                .require(name)
                .map(|values| (name.as_str(), *agg, values))
        })
        .collect::<Result<_, _>>()?;

    let mut buckets: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (row, date) in series.dates().iter().enumerate() {
        buckets.entry(frequency.period_end(*date)).or_default().push(row);
    }

    let mut dates = Vec::with_capacity(buckets.len());
    let mut columns: Vec<Column> = vec![Vec::with_capacity(buckets.len()); sources.len()];

    for (label, rows) in &buckets {
        let row: Vec<Option<f64>> = sources
            .iter()
            .map(|(_, agg, values)| {
                let defined: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
                agg.apply(&defined)
            })
            .collect();
        if row.iter().all(Option::is_none) {
            continue;
        }
        dates.push(*label);
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    PriceSeries::from_columns(
        series.symbol.clone(),
        dates,
        sources
            .iter()
            .map(|(name, _, _)| name.to_string())
            .zip(columns)
            .collect(),
    )
}
