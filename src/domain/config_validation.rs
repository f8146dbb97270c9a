//! Configuration validation.
//!
//! Loads every section into its typed form and checks the values the typed
//! form cannot express on its own.

use crate::domain::data_config::{
    invalid, AnalysisConfig, DataConfig, ANALYSIS_SECTION, DATA_SECTION, MAX_CACHE_EXPIRY_HOURS,
};
use crate::domain::error::StockscopeError;
use crate::domain::indicator::bollinger::multiplier_key;
use crate::domain::indicator_config::{IndicatorConfig, SECTION as INDICATOR_SECTION};
use crate::ports::config_port::ConfigPort;

/// Every section of a loaded configuration, validated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub indicators: IndicatorConfig,
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
}

pub fn load_settings(config: &dyn ConfigPort) -> Result<Settings, StockscopeError> {
    let settings = Settings {
        indicators: IndicatorConfig::from_config(config)?,
        data: DataConfig::from_config(config)?,
        analysis: AnalysisConfig::from_config(config)?,
    };
    validate_indicator_config(&settings.indicators)?;
    validate_data_config(&settings.data)?;
    validate_analysis_config(&settings.analysis)?;
    Ok(settings)
}

pub fn validate_indicator_config(config: &IndicatorConfig) -> Result<(), StockscopeError> {
    for (key, periods) in [
        ("sma_periods", &config.sma_periods),
        ("ema_periods", &config.ema_periods),
    ] {
        if periods.contains(&0) {
            return Err(invalid(INDICATOR_SECTION, key, "window lengths must be positive"));
        }
    }
    for (key, value) in [
        ("rsi_period", config.rsi_period),
        ("macd_fast", config.macd_fast),
        ("macd_slow", config.macd_slow),
        ("macd_signal", config.macd_signal),
    ] {
        if value == 0 {
            return Err(invalid(INDICATOR_SECTION, key, "must be positive"));
        }
    }
    if config.macd_fast >= config.macd_slow {
        return Err(invalid(
            INDICATOR_SECTION,
            "macd_fast",
            "macd_fast must be shorter than macd_slow",
        ));
    }
    if config.bollinger_period < 2 {
        return Err(invalid(
            INDICATOR_SECTION,
            "bollinger_period",
            "bollinger_period must be at least 2",
        ));
    }
    if !config.bollinger_std.is_finite() || config.bollinger_std <= 0.0 {
        return Err(invalid(
            INDICATOR_SECTION,
            "bollinger_std",
            "bollinger_std must be a positive finite number",
        ));
    }
    if multiplier_key(config.bollinger_std).is_err() {
        return Err(invalid(
            INDICATOR_SECTION,
            "bollinger_std",
            "bollinger_std is too large",
        ));
    }
    Ok(())
}

pub fn validate_data_config(config: &DataConfig) -> Result<(), StockscopeError> {
    if config.path.as_os_str().is_empty() {
        return Err(invalid(DATA_SECTION, "path", "path must not be empty"));
    }
    if config.max_retries == 0 {
        return Err(invalid(
            DATA_SECTION,
            "max_retries",
            "max_retries must be at least 1",
        ));
    }
    if config.cache_expiry.as_secs() > MAX_CACHE_EXPIRY_HOURS * 3600 {
        return Err(invalid(
            DATA_SECTION,
            "cache_expiry_hours",
            "cache_expiry_hours must not exceed one year",
        ));
    }
    Ok(())
}

pub fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), StockscopeError> {
    if config.volatility_window < 2 {
        return Err(invalid(
            ANALYSIS_SECTION,
            "volatility_window",
            "volatility_window must be at least 2",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(content: &str) -> String {
        match load_settings(&make_config(content)).unwrap_err() {
            StockscopeError::ConfigInvalid { key, .. } => key,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn full_config_passes() {
        let config = make_config(
            r#"
[indicators]
sma_periods = 10, 30
ema_periods = 12, 26
rsi_period = 14
macd_fast = 12
macd_slow = 26
macd_signal = 9
bollinger_period = 20
bollinger_std = 2.0

[data]
path = data
default_period = 1y
default_interval = 1d
cache_expiry_hours = 24
max_retries = 5
retry_delay_secs = 2

[analysis]
volatility_window = 20
"#,
        );
        let settings = load_settings(&config).unwrap();
        assert_eq!(settings.indicators.sma_periods, vec![10, 30]);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let settings = load_settings(&make_config("")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn zero_sma_period_fails() {
        assert_eq!(invalid_key("[indicators]\nsma_periods = 20, 0\n"), "sma_periods");
    }

    #[test]
    fn zero_rsi_period_fails() {
        assert_eq!(invalid_key("[indicators]\nrsi_period = 0\n"), "rsi_period");
    }

    #[test]
    fn macd_fast_not_shorter_than_slow_fails() {
        assert_eq!(
            invalid_key("[indicators]\nmacd_fast = 26\nmacd_slow = 12\n"),
            "macd_fast"
        );
    }

    #[test]
    fn bollinger_period_one_fails() {
        assert_eq!(
            invalid_key("[indicators]\nbollinger_period = 1\n"),
            "bollinger_period"
        );
    }

    #[test]
    fn non_positive_bollinger_std_fails() {
        assert_eq!(
            invalid_key("[indicators]\nbollinger_std = 0\n"),
            "bollinger_std"
        );
    }

    #[test]
    fn infinite_bollinger_std_fails() {
        assert_eq!(
            invalid_key("[indicators]\nbollinger_std = inf\n"),
            "bollinger_std"
        );
    }

    #[test]
    fn huge_bollinger_std_fails() {
        assert_eq!(
            invalid_key("[indicators]\nbollinger_std = 1e300\n"),
            "bollinger_std"
        );
    }

    #[test]
    fn cache_expiry_over_one_year_fails() {
        assert_eq!(
            invalid_key("[data]\ncache_expiry_hours = 8761\n"),
            "cache_expiry_hours"
        );
    }

    #[test]
    fn cache_expiry_past_instant_range_fails() {
        assert_eq!(
            invalid_key("[data]\ncache_expiry_hours = 3000000000000000\n"),
            "cache_expiry_hours"
        );
    }

    #[test]
    fn cache_expiry_of_one_year_passes() {
        let settings = load_settings(&make_config("[data]\ncache_expiry_hours = 8760\n")).unwrap();
        assert_eq!(settings.data.cache_expiry.as_secs(), 8760 * 3600);
    }

    #[test]
    fn zero_retries_fails() {
        assert_eq!(invalid_key("[data]\nmax_retries = 0\n"), "max_retries");
    }

    #[test]
    fn short_volatility_window_fails() {
        assert_eq!(
            invalid_key("[analysis]\nvolatility_window = 1\n"),
            "volatility_window"
        );
    }
}
