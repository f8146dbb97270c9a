//! Indicator windows and thresholds.
//!
//! `IndicatorConfig::default()` holds the process-wide defaults; callers
//! override fields per call or load overrides from the `[indicators]`
//! configuration section.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::ports::config_port::ConfigPort;

pub const SECTION: &str = "indicators";

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub sma_periods: Vec<usize>,
    pub ema_periods: Vec<usize>,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_periods: vec![20, 50, 200],
            ema_periods: vec![12, 26],
            rsi_period: 14,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
            bollinger_period: 20,
            bollinger_std: 2.0,
        }
    }
}

impl IndicatorConfig {
    /// Defaults overlaid with whatever the `[indicators]` section sets.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockscopeError> {
        let defaults = Self::default();
        Ok(Self {
            sma_periods: match config.get_string(SECTION, "sma_periods") {
                Some(list) => parse_periods(&list, "sma_periods")?,
                None => defaults.sma_periods,
            },
            ema_periods: match config.get_string(SECTION, "ema_periods") {
                Some(list) => parse_periods(&list, "ema_periods")?,
                None => defaults.ema_periods,
            },
            rsi_period: get_period(config, "rsi_period", defaults.rsi_period)?,
            macd_fast: get_period(config, "macd_fast", defaults.macd_fast)?,
            macd_slow: get_period(config, "macd_slow", defaults.macd_slow)?,
            macd_signal: get_period(config, "macd_signal", defaults.macd_signal)?,
            bollinger_period: get_period(config, "bollinger_period", defaults.bollinger_period)?,
            bollinger_std: config
                .get_double(SECTION, "bollinger_std")?
                .unwrap_or(defaults.bollinger_std),
        })
    }
}

fn get_period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, StockscopeError> {
    match config.get_int(SECTION, key)? {
        Some(value) => {
            usize::try_from(value).map_err(|_| invalid(key, "must be a non-negative integer"))
        }
        None => Ok(default),
    }
}

/// Parse a comma-separated list of window lengths such as `20, 50, 200`.
pub fn parse_periods(list: &str, key: &str) -> Result<Vec<usize>, StockscopeError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| invalid(key, &format!("'{}' is not a window length", s)))
        })
        .collect()
}

fn invalid(key: &str, reason: &str) -> StockscopeError {
    StockscopeError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
