//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]).
//! Warmup: first (n-1) rows are undefined.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::{trailing_window, IndicatorSet, IndicatorType};
use crate::domain::series::{Column, PriceSeries, CLOSE};

/// Trailing arithmetic mean over `period` values.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Column {
    (0..values.len())
        .map(|i| {
            trailing_window(values, i, period).map(|w| w.iter().sum::<f64>() / period as f64)
        })
        .collect()
}

pub fn calculate_sma(series: &PriceSeries, period: usize) -> Result<IndicatorSet, StockscopeError> {
    let close = series.require(CLOSE)?;
    Ok(IndicatorSet::single(
        IndicatorType::Sma(period),
        rolling_mean(close, period),
    ))
}

pub fn add_sma(series: PriceSeries, periods: &[usize]) -> Result<PriceSeries, StockscopeError> {
    periods.iter().try_fold(series, |series, &period| {
        let set = calculate_sma(&series, period)?;
        series.with_indicator(set)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::fixtures::series_from_closes;
    use proptest::prelude::*;

    #[test]
    fn sma_three_over_one_to_five() {
        let series = add_sma(series_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]), &[3]).unwrap();
        assert_eq!(
            series.column("SMA_3").unwrap(),
            &[None, None, Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn sma_window_longer_than_series_is_all_undefined() {
        let series = add_sma(series_from_closes(&[1.0, 2.0]), &[20]).unwrap();
        assert_eq!(series.column("SMA_20").unwrap(), &[None, None]);
    }

    #[test]
    fn sma_multiple_periods_add_multiple_columns() {
        let series = add_sma(series_from_closes(&[1.0, 2.0, 3.0]), &[1, 2]).unwrap();
        assert_eq!(
            series.column("SMA_1").unwrap(),
            &[Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(series.column("SMA_2").unwrap(), &[None, Some(1.5), Some(2.5)]);
    }

    #[test]
    fn sma_zero_period_is_undefined() {
        let set = calculate_sma(&series_from_closes(&[1.0, 2.0]), 0).unwrap();
        assert_eq!(set.columns[0].1, vec![None, None]);
    }

    #[test]
    fn sma_undefined_input_poisons_window() {
        let values = [Some(1.0), None, Some(3.0), Some(5.0)];
        assert_eq!(rolling_mean(&values, 2), vec![None, None, None, Some(4.0)]);
    }

    #[test]
    fn sma_requires_close() {
        let series = PriceSeries::new("X", vec![]);
        assert!(matches!(
            calculate_sma(&series, 3),
            Err(StockscopeError::MissingColumn { .. })
        ));
    }

    proptest! {
        #[test]
        fn sma_length_and_warmup(
            closes in prop::collection::vec(1.0f64..500.0, 0..60),
            period in 1usize..15,
        ) {
            let series = add_sma(series_from_closes(&closes), &[period]).unwrap();
            let sma = series.column(&format!("SMA_{}", period)).unwrap();
            prop_assert_eq!(sma.len(), closes.len());
            for (i, value) in sma.iter().enumerate() {
                if i + 1 < period {
                    prop_assert!(value.is_none());
                } else {
                    let expected = closes[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
                    prop_assert!((value.unwrap() - expected).abs() < 1e-9);
                }
            }
        }
    }
}
