//! Market data access port.

use crate::domain::error::StockscopeError;
use crate::domain::processor::Frequency;
use crate::domain::series::PriceSeries;
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

pub trait MarketDataPort {
    /// Price history of `symbol` over `period`, sampled at `interval`.
    ///
    /// `Ok(None)` or an empty series means the source has no data for the
    /// request. `Err` is a source failure and may succeed on retry.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Option<PriceSeries>, StockscopeError>;

    fn list_symbols(&self) -> Result<Vec<String>, StockscopeError>;

    /// Descriptive record for `symbol`; unknown symbols get
    /// [`SymbolInfo::unknown`].
    fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, StockscopeError>;
}

/// Look-back window of a fetch, counted back from the last available date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Days(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Period {
    pub const DEFAULT: Period = Period::Years(1);

    /// First calendar date inside the window ending at `end` (inclusive);
    /// `None` for [`Period::Max`].
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Period::Days(n) => end.checked_sub_signed(Duration::days(n as i64 - 1)),
            Period::Months(n) => end.checked_sub_months(Months::new(n))?.succ_opt(),
            Period::Years(n) => end.checked_sub_months(Months::new(n * 12))?.succ_opt(),
            Period::YearToDate => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Period::Max => None,
        }
    }
}

impl FromStr for Period {
    type Err = StockscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Period::Days(1)),
            "5d" => Ok(Period::Days(5)),
            "1mo" => Ok(Period::Months(1)),
            "3mo" => Ok(Period::Months(3)),
            "6mo" => Ok(Period::Months(6)),
            "1y" => Ok(Period::Years(1)),
            "2y" => Ok(Period::Years(2)),
            "5y" => Ok(Period::Years(5)),
            "10y" => Ok(Period::Years(10)),
            "ytd" => Ok(Period::YearToDate),
            "max" => Ok(Period::Max),
            other => Err(StockscopeError::InvalidArgument {
                reason: format!("unknown period '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{}d", n),
            Period::Months(n) => write!(f, "{}mo", n),
            Period::Years(n) => write!(f, "{}y", n),
            Period::YearToDate => write!(f, "ytd"),
            Period::Max => write!(f, "max"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Interval {
    pub const DEFAULT: Interval = Interval::Daily;

    /// Resampling needed to turn daily rows into this interval.
    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            Interval::Daily => None,
            Interval::Weekly => Some(Frequency::Week),
            Interval::Monthly => Some(Frequency::Month),
            Interval::Quarterly => Some(Frequency::Quarter),
        }
    }
}

impl FromStr for Interval {
    type Err = StockscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            "3mo" => Ok(Interval::Quarterly),
            other => Err(StockscopeError::InvalidArgument {
                reason: format!("unknown interval '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
            Interval::Quarterly => "3mo",
        };
        write!(f, "{}", code)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub dividend_yield: f64,
    pub beta: f64,
    pub week52_high: f64,
    pub week52_low: f64,
}

impl SymbolInfo {
    pub const NOT_AVAILABLE: &'static str = "N/A";

    /// Placeholder record for a symbol the source knows nothing about.
    pub fn unknown(symbol: &str) -> Self {
        SymbolInfo {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: Self::NOT_AVAILABLE.to_string(),
            industry: Self::NOT_AVAILABLE.to_string(),
            market_cap: 0.0,
            pe_ratio: 0.0,
            dividend_yield: 0.0,
            beta: 0.0,
            week52_high: 0.0,
            week52_low: 0.0,
        }
    }
}
