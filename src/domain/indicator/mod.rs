//! Technical indicator implementations.
//!
//! This module provides the shared vocabulary of the indicator engine:
//! - `IndicatorType`: indicator identity + parameters (usable as a HashMap key)
//! - `IndicatorSet`: the named columns one indicator computation produces
//! - windowed helpers shared by the individual indicators
//!
//! Every `calculate_*` function borrows a [`PriceSeries`] and returns a fresh
//! `IndicatorSet`; every `add_*` function takes the series by value and
//! returns it with the new columns appended.
//!
//! [`PriceSeries`]: crate::domain::series::PriceSeries

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{add_bollinger_bands, calculate_bollinger};
pub use ema::{add_ema, calculate_ema, ema_values};
pub use macd::{add_macd, calculate_macd};
pub use obv::{add_volume_indicators, calculate_obv, calculate_volume_sma};
pub use rsi::{add_rsi, calculate_rsi};
pub use sma::{add_sma, calculate_sma, rolling_mean};
pub use stddev::rolling_stddev;

use crate::domain::series::Column;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    VolumeSma(usize),
    Obv,
}

impl IndicatorType {
    /// Names of the columns this indicator writes.
    pub fn column_names(&self) -> Vec<String> {
        match self {
            IndicatorType::Sma(period) => vec![format!("SMA_{}", period)],
            IndicatorType::Ema(period) => vec![format!("EMA_{}", period)],
            IndicatorType::Rsi(_) => vec![rsi::RSI.to_string()],
            IndicatorType::Macd { .. } => vec![
                macd::MACD.to_string(),
                macd::MACD_SIGNAL.to_string(),
                macd::MACD_HIST.to_string(),
            ],
            IndicatorType::Bollinger { .. } => vec![
                bollinger::BB_MIDDLE.to_string(),
                bollinger::BB_UPPER.to_string(),
                bollinger::BB_LOWER.to_string(),
            ],
            IndicatorType::VolumeSma(period) => vec![format!("Volume_SMA_{}", period)],
            IndicatorType::Obv => vec![obv::OBV.to_string()],
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
        }
    }
}

/// Output of a single indicator computation, aligned to the source index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub indicator_type: IndicatorType,
    pub columns: Vec<(String, Column)>,
}

impl IndicatorSet {
    pub fn single(indicator_type: IndicatorType, values: Column) -> Self {
        let name = indicator_type
            .column_names()
            .into_iter()
            .next()
            .unwrap_or_default();
        Self {
            indicator_type,
            columns: vec![(name, values)],
        }
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }
}

/// Trailing window `[i+1-period, i]` as defined values, or `None` when the
/// window does not fit yet or holds an undefined value.
pub(crate) fn trailing_window(values: &[Option<f64>], i: usize, period: usize) -> Option<Vec<f64>> {
    if period == 0 || i + 1 < period {
        return None;
    }
    values[i + 1 - period..=i].iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        let boll = IndicatorType::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn column_names_follow_table_convention() {
        assert_eq!(IndicatorType::Sma(50).column_names(), vec!["SMA_50"]);
        assert_eq!(IndicatorType::Ema(12).column_names(), vec!["EMA_12"]);
        assert_eq!(IndicatorType::Rsi(9).column_names(), vec!["RSI"]);
        assert_eq!(
            IndicatorType::VolumeSma(20).column_names(),
            vec!["Volume_SMA_20"]
        );
        assert_eq!(
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
            .column_names(),
            vec!["MACD", "MACD_Signal", "MACD_Hist"]
        );
        assert_eq!(
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
            .column_names(),
            vec!["BB_Middle", "BB_Upper", "BB_Lower"]
        );
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(20), "sma20");
        map.insert(IndicatorType::Obv, "obv");

        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"sma20"));
        assert_eq!(map.get(&IndicatorType::Obv), Some(&"obv"));
        assert_eq!(map.get(&IndicatorType::Sma(50)), None);
    }

    #[test]
    fn trailing_window_bounds() {
        let values = [Some(1.0), Some(2.0), None, Some(4.0)];
        assert_eq!(trailing_window(&values, 0, 2), None);
        assert_eq!(trailing_window(&values, 1, 2), Some(vec![1.0, 2.0]));
        assert_eq!(trailing_window(&values, 2, 2), None);
        assert_eq!(trailing_window(&values, 3, 1), Some(vec![4.0]));
        assert_eq!(trailing_window(&values, 3, 0), None);
    }
}
