//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain/loss are trailing simple means over n close-to-close changes:
//! - gain = max(change, 0), loss = max(-change, 0)
//! - RS = avg_gain / avg_loss
//!
//! Formula: RSI = 100 - (100 / (1 + RS))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! A window with no movement at all has no RSI.
//!
//! Warmup: first n rows are undefined (row 0 has no change).

use crate::domain::error::StockscopeError;
use crate::domain::indicator::{rolling_mean, IndicatorSet, IndicatorType};
use crate::domain::series::{Column, PriceSeries, CLOSE};

pub const RSI: &str = "RSI";

pub fn rsi_values(close: &[Option<f64>], period: usize) -> Column {
    let changes: Column = (0..close.len())
        .map(|i| match (i.checked_sub(1).and_then(|p| close[p]), close[i]) {
            (Some(prev), Some(curr)) => Some(curr - prev),
            _ => None,
        })
        .collect();

    let gains: Column = changes.iter().map(|c| c.map(|c| c.max(0.0))).collect();
    let losses: Column = changes.iter().map(|c| c.map(|c| (-c).max(0.0))).collect();

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(gain), Some(loss)) if *loss == 0.0 && *gain == 0.0 => None,
            (Some(_), Some(loss)) if *loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - (100.0 / (1.0 + gain / loss))),
            _ => None,
        })
        .collect()
}

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> Result<IndicatorSet, StockscopeError> {
    let close = series.require(CLOSE)?;
    Ok(IndicatorSet::single(
        IndicatorType::Rsi(period),
        rsi_values(close, period),
    ))
}

pub fn add_rsi(series: PriceSeries, period: usize) -> Result<PriceSeries, StockscopeError> {
    let set = calculate_rsi(&series, period)?;
    series.with_indicator(set)
}
