//! Indicator dispatch and the full default indicator pass.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::{
    add_bollinger_bands, add_ema, add_macd, add_rsi, add_sma, add_volume_indicators,
    calculate_bollinger, calculate_ema, calculate_macd, calculate_obv, calculate_rsi,
    calculate_sma, calculate_volume_sma, IndicatorSet, IndicatorType,
};
use crate::domain::indicator::bollinger::multiplier_key;
use crate::domain::indicator_config::IndicatorConfig;
use crate::domain::series::PriceSeries;

/// Compute a single indicator identified by its type and parameters.
pub fn compute_indicator(
    series: &PriceSeries,
    indicator: &IndicatorType,
) -> Result<IndicatorSet, StockscopeError> {
    match *indicator {
        IndicatorType::Sma(period) => calculate_sma(series, period),
        IndicatorType::Ema(period) => calculate_ema(series, period),
        IndicatorType::Rsi(period) => calculate_rsi(series, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(series, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(series, period, stddev_mult_x100 as f64 / 100.0),
        IndicatorType::VolumeSma(period) => calculate_volume_sma(series, period),
        IndicatorType::Obv => calculate_obv(series),
    }
}

/// Indicator types `add_all_indicators` produces for `config`, in order.
pub fn configured_indicators(
    config: &IndicatorConfig,
) -> Result<Vec<IndicatorType>, StockscopeError> {
    let mut indicators: Vec<IndicatorType> =
        config.sma_periods.iter().map(|&p| IndicatorType::Sma(p)).collect();
    indicators.extend(config.ema_periods.iter().map(|&p| IndicatorType::Ema(p)));
    indicators.push(IndicatorType::Rsi(config.rsi_period));
    indicators.push(IndicatorType::Macd {
        fast: config.macd_fast,
        slow: config.macd_slow,
        signal: config.macd_signal,
    });
    indicators.push(IndicatorType::Bollinger {
        period: config.bollinger_period,
        stddev_mult_x100: multiplier_key(config.bollinger_std)?,
    });
    indicators.push(IndicatorType::VolumeSma(
        crate::domain::indicator::obv::VOLUME_SMA_PERIOD,
    ));
    indicators.push(IndicatorType::Obv);
    Ok(indicators)
}

/// Append every configured indicator: SMA, EMA, RSI, MACD, Bollinger, Volume.
///
/// Run after cleaning and return computation.
pub fn add_all_indicators(
    series: PriceSeries,
    config: &IndicatorConfig,
) -> Result<PriceSeries, StockscopeError> {
    let series = add_sma(series, &config.sma_periods)?;
    let series = add_ema(series, &config.ema_periods)?;
    let series = add_rsi(series, config.rsi_period)?;
    let series = add_macd(series, config.macd_fast, config.macd_slow, config.macd_signal)?;
    let series = add_bollinger_bands(series, config.bollinger_period, config.bollinger_std)?;
    add_volume_indicators(series)
}
