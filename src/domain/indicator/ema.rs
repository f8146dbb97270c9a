//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first observation:
//! EMA[0] = C[0], EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Defined from the first row; early values carry the seed's bias.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::{IndicatorSet, IndicatorType};
use crate::domain::series::{Column, PriceSeries, CLOSE};

/// Recursive exponential smoothing of `values`.
///
/// An undefined input repeats the previous EMA; rows before the first
/// defined input stay undefined.
pub fn ema_values(values: &[Option<f64>], period: usize) -> Column {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            ema = match (ema, *value) {
                (None, Some(v)) => Some(v),
                (Some(prev), Some(v)) => Some(v * k + prev * (1.0 - k)),
                (prev, None) => prev,
            };
            ema
        })
        .collect()
}

pub fn calculate_ema(series: &PriceSeries, period: usize) -> Result<IndicatorSet, StockscopeError> {
    let close = series.require(CLOSE)?;
    Ok(IndicatorSet::single(
        IndicatorType::Ema(period),
        ema_values(close, period),
    ))
}

pub fn add_ema(series: PriceSeries, periods: &[usize]) -> Result<PriceSeries, StockscopeError> {
    periods.iter().try_fold(series, |series, &period| {
        let set = calculate_ema(&series, period)?;
        series.with_indicator(set)
    })
}
