//! Volume indicators: OBV (On-Balance Volume) and the volume moving average.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::{rolling_mean, IndicatorSet, IndicatorType};
use crate::domain::series::{PriceSeries, CLOSE, VOLUME};

pub const OBV: &str = "OBV";
pub const VOLUME_SMA_PERIOD: usize = 20;

/// Calculate OBV (On-Balance Volume) indicator.
///
/// OBV[0] = 0
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// Otherwise (equal, or either close undefined): OBV[i] = OBV[i-1]
///
/// No warmup period; every row is defined.
pub fn calculate_obv(series: &PriceSeries) -> Result<IndicatorSet, StockscopeError> {
    let close = series.require(CLOSE)?;
    let volume = series.require(VOLUME)?;

    let mut obv = 0.0;
    let values = (0..series.len())
        .map(|i| {
            if i > 0 {
                let step = volume[i].unwrap_or(0.0);
                match (close[i - 1], close[i]) {
                    (Some(prev), Some(curr)) if curr > prev => obv += step,
                    (Some(prev), Some(curr)) if curr < prev => obv -= step,
                    _ => {}
                }
            }
            Some(obv)
        })
        .collect();

    Ok(IndicatorSet::single(IndicatorType::Obv, values))
}

pub fn calculate_volume_sma(
    series: &PriceSeries,
    period: usize,
) -> Result<IndicatorSet, StockscopeError> {
    let volume = series.require(VOLUME)?;
    Ok(IndicatorSet::single(
        IndicatorType::VolumeSma(period),
        rolling_mean(volume, period),
    ))
}

/// Append `Volume_SMA_20` and `OBV`.
pub fn add_volume_indicators(series: PriceSeries) -> Result<PriceSeries, StockscopeError> {
    let sma = calculate_volume_sma(&series, VOLUME_SMA_PERIOD)?;
    let obv = calculate_obv(&series)?;
    series.with_indicator(sma)?.with_indicator(obv)
}
