//! Return statistics over a processed series.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::stddev::sample_stddev;
use crate::domain::processor::{RETURNS, TRADING_DAYS_PER_YEAR};
use crate::domain::series::{PriceSeries, CLOSE};

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStats {
    pub observations: usize,
    pub mean_daily_return_pct: f64,
    pub daily_volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
}

impl ReturnStats {
    /// Statistics of the `Returns` column plus the drawdown of `Close`.
    ///
    /// Fewer than two defined returns give zero volatility and Sharpe.
    pub fn compute(series: &PriceSeries) -> Result<Self, StockscopeError> {
        let returns: Vec<f64> = series.require(RETURNS)?.iter().flatten().copied().collect();
        let closes: Vec<f64> = series.require(CLOSE)?.iter().flatten().copied().collect();

        let (mean, stddev) = mean_and_stddev(&returns);
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&closes);

        Ok(ReturnStats {
            observations: returns.len(),
            mean_daily_return_pct: mean * 100.0,
            daily_volatility_pct: stddev * 100.0,
            sharpe_ratio: sharpe(mean, stddev),
            max_drawdown,
            max_drawdown_duration,
        })
    }
}

/// Mean and sample standard deviation; the deviation is 0 below two values.
pub fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let stddev = if values.len() < 2 {
        0.0
    } else {
        sample_stddev(values)
    };
    (mean, stddev)
}

/// Annualized Sharpe ratio without a risk-free rate; 0 when `stddev` is 0.
pub fn sharpe(mean: f64, stddev: f64) -> f64 {
    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// Largest peak-to-trough decline as a fraction of the peak, and the longest
/// run of rows spent below a peak.
pub fn compute_drawdown(values: &[f64]) -> (f64, usize) {
    let Some(&first) = values.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for &value in values {
        if value >= peak {
            peak = value;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}
