//! OHLCV bar representation.

use chrono::NaiveDate;

/// One complete trading period as delivered by a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}
