//! `[data]` and `[analysis]` configuration sections.

use crate::domain::error::StockscopeError;
use crate::domain::processor::DEFAULT_VOLATILITY_WINDOW;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{Interval, Period};
use std::path::PathBuf;
use std::time::Duration;

pub const DATA_SECTION: &str = "data";
pub const ANALYSIS_SECTION: &str = "analysis";

/// Longest cache lifetime accepted from configuration: one year.
pub const MAX_CACHE_EXPIRY_HOURS: u64 = 24 * 365;

const SECS_PER_HOUR: u64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub path: PathBuf,
    pub default_period: Period,
    pub default_interval: Interval,
    pub cache_enabled: bool,
    pub cache_expiry: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
            default_period: Period::DEFAULT,
            default_interval: Interval::DEFAULT,
            cache_enabled: true,
            cache_expiry: Duration::from_secs(24 * SECS_PER_HOUR),
            max_retries: 5,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl DataConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockscopeError> {
        let defaults = Self::default();

        let default_period = match config.get_string(DATA_SECTION, "default_period") {
            Some(s) => s.parse().map_err(|_| {
                invalid(DATA_SECTION, "default_period", &format!("unknown period '{}'", s))
            })?,
            None => defaults.default_period,
        };
        let default_interval = match config.get_string(DATA_SECTION, "default_interval") {
            Some(s) => s.parse().map_err(|_| {
                invalid(DATA_SECTION, "default_interval", &format!("unknown interval '{}'", s))
            })?,
            None => defaults.default_interval,
        };

        let expiry_hours = non_negative(config, DATA_SECTION, "cache_expiry_hours", 24)?;
        let expiry_secs = expiry_hours
            .checked_mul(SECS_PER_HOUR)
            .ok_or_else(|| invalid(DATA_SECTION, "cache_expiry_hours", "too large"))?;
        let retry_delay_secs = non_negative(config, DATA_SECTION, "retry_delay_secs", 2)?;
        let max_retries = non_negative(config, DATA_SECTION, "max_retries", 5)?;

        Ok(Self {
            path: config
                .get_string(DATA_SECTION, "path")
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            default_period,
            default_interval,
            cache_enabled: config
                .get_bool(DATA_SECTION, "cache_enabled")?
                .unwrap_or(defaults.cache_enabled),
            cache_expiry: Duration::from_secs(expiry_secs),
            max_retries: u32::try_from(max_retries)
                .map_err(|_| invalid(DATA_SECTION, "max_retries", "too large"))?,
            retry_delay: Duration::from_secs(retry_delay_secs),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub volatility_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
        }
    }
}

impl AnalysisConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockscopeError> {
        let window = non_negative(
            config,
            ANALYSIS_SECTION,
            "volatility_window",
            DEFAULT_VOLATILITY_WINDOW as u64,
        )?;
        Ok(Self {
            volatility_window: window as usize,
        })
    }
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u64,
) -> Result<u64, StockscopeError> {
    match config.get_int(section, key)? {
        Some(value) => {
            u64::try_from(value).map_err(|_| invalid(section, key, "must be non-negative"))
        }
        None => Ok(default),
    }
}

pub(crate) fn invalid(section: &str, key: &str, reason: &str) -> StockscopeError {
    StockscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
