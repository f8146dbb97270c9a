//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! All three lines follow EMA seeding, so they are defined from the first row.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::{ema_values, IndicatorSet, IndicatorType};
use crate::domain::series::{Column, PriceSeries, CLOSE};

pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_Signal";
pub const MACD_HIST: &str = "MACD_Hist";

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    series: &PriceSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<IndicatorSet, StockscopeError> {
    let close = series.require(CLOSE)?;

    let ema_fast = ema_values(close, fast);
    let ema_slow = ema_values(close, slow);

    let macd_line: Column = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_values(&macd_line, signal_period);
    let histogram: Column = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Ok(IndicatorSet {
        indicator_type: IndicatorType::Macd {
            fast,
            slow,
            signal: signal_period,
        },
        columns: vec![
            (MACD.to_string(), macd_line),
            (MACD_SIGNAL.to_string(), signal_line),
            (MACD_HIST.to_string(), histogram),
        ],
    })
}

pub fn add_macd(
    series: PriceSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<PriceSeries, StockscopeError> {
    let set = calculate_macd(&series, fast, slow, signal_period)?;
    series.with_indicator(set)
}
