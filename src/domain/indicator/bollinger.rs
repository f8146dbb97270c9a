//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1), the same
//! convention `processor::calculate_volatility` uses.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) rows are undefined.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::{rolling_mean, rolling_stddev, IndicatorSet, IndicatorType};
use crate::domain::series::{Column, PriceSeries, CLOSE};

pub const BB_MIDDLE: &str = "BB_Middle";
pub const BB_UPPER: &str = "BB_Upper";
pub const BB_LOWER: &str = "BB_Lower";

/// Multiplier in hundredths, as carried by `IndicatorType::Bollinger`.
///
/// Negative, non-finite and out-of-range multipliers are rejected rather
/// than saturated.
pub fn multiplier_key(multiplier: f64) -> Result<u32, StockscopeError> {
    let scaled = (multiplier * 100.0).round();
    if !scaled.is_finite() || scaled < 0.0 || scaled > u32::MAX as f64 {
        return Err(StockscopeError::InvalidArgument {
            reason: format!("bollinger multiplier {multiplier} is out of range"),
        });
    }
    Ok(scaled as u32)
}

pub fn calculate_bollinger(
    series: &PriceSeries,
    period: usize,
    multiplier: f64,
) -> Result<IndicatorSet, StockscopeError> {
    let stddev_mult_x100 = multiplier_key(multiplier)?;
    let close = series.require(CLOSE)?;

    let middle = rolling_mean(close, period);
    let stddev = rolling_stddev(close, period);

    let band = |sign: f64| -> Column {
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, sd)| Some((*m)? + sign * multiplier * (*sd)?))
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);
    // the middle band is undefined wherever the deviation is
    let middle: Column = middle
        .iter()
        .zip(&stddev)
        .map(|(m, sd)| sd.and(*m))
        .collect();

    Ok(IndicatorSet {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        columns: vec![
            (BB_MIDDLE.to_string(), middle),
            (BB_UPPER.to_string(), upper),
            (BB_LOWER.to_string(), lower),
        ],
    })
}

pub fn add_bollinger_bands(
    series: PriceSeries,
    period: usize,
    multiplier: f64,
) -> Result<PriceSeries, StockscopeError> {
    let set = calculate_bollinger(&series, period, multiplier)?;
    series.with_indicator(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::fixtures::series_from_closes;
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_warmup() {
        let set = calculate_bollinger(&series_from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3, 2.0)
            .unwrap();

        for (_, column) in &set.columns {
            assert!(column[0].is_none());
            assert!(column[1].is_none());
            assert!(column[2..].iter().all(|v| v.is_some()));
        }
    }

    #[test]
    fn bollinger_constant_values_collapse() {
        let set = calculate_bollinger(&series_from_closes(&[100.0; 6]), 3, 2.0).unwrap();
        let middle = set.column(BB_MIDDLE).unwrap();
        let upper = set.column(BB_UPPER).unwrap();
        let lower = set.column(BB_LOWER).unwrap();

        for i in 2..6 {
            assert_relative_eq!(middle[i].unwrap(), 100.0);
            assert_eq!(upper[i], middle[i]);
            assert_eq!(lower[i], middle[i]);
        }
    }

    #[test]
    fn bollinger_known_values() {
        // window [10, 20, 30]: mean 20, sample stddev 10
        let set = calculate_bollinger(&series_from_closes(&[10.0, 20.0, 30.0]), 3, 2.0).unwrap();
        assert_relative_eq!(set.column(BB_MIDDLE).unwrap()[2].unwrap(), 20.0);
        assert_relative_eq!(set.column(BB_UPPER).unwrap()[2].unwrap(), 40.0);
        assert_relative_eq!(set.column(BB_LOWER).unwrap()[2].unwrap(), 0.0);
    }

    #[test]
    fn bollinger_symmetric_bands() {
        let set = calculate_bollinger(
            &series_from_closes(&[12.0, 15.0, 11.0, 18.0, 16.0, 13.0]),
            4,
            1.5,
        )
        .unwrap();
        let middle = set.column(BB_MIDDLE).unwrap();
        let upper = set.column(BB_UPPER).unwrap();
        let lower = set.column(BB_LOWER).unwrap();
        for i in 3..6 {
            let up = upper[i].unwrap() - middle[i].unwrap();
            let down = middle[i].unwrap() - lower[i].unwrap();
            assert_relative_eq!(up, down, epsilon = 1e-9);
            assert!(up > 0.0);
        }
    }

    #[test]
    fn bollinger_short_series_is_undefined() {
        let set = calculate_bollinger(&series_from_closes(&[1.0, 2.0]), 20, 2.0).unwrap();
        for (_, column) in &set.columns {
            assert_eq!(column, &vec![None, None]);
        }
    }

    #[test]
    fn bollinger_indicator_type() {
        let set = calculate_bollinger(&series_from_closes(&[1.0]), 20, 2.0).unwrap();
        assert_eq!(
            set.indicator_type,
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
        );
    }

    #[test]
    fn multiplier_key_rounds_to_hundredths() {
        assert_eq!(multiplier_key(2.0).unwrap(), 200);
        assert_eq!(multiplier_key(1.555).unwrap(), 156);
        assert_eq!(multiplier_key(0.0).unwrap(), 0);
    }

    #[test]
    fn out_of_range_multiplier_is_rejected() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        for multiplier in [-1.0, f64::NAN, f64::INFINITY, 1e300] {
            let err = calculate_bollinger(&series, 3, multiplier).unwrap_err();
            assert!(matches!(err, StockscopeError::InvalidArgument { .. }));
        }
    }
}
