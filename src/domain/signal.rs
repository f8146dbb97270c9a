//! Discrete trading signals read off the most recent row of a series.

use crate::domain::error::StockscopeError;
use crate::domain::indicator::macd::{MACD, MACD_SIGNAL};
use crate::domain::indicator::rsi::RSI;
use crate::domain::series::{PriceSeries, CLOSE};
use std::collections::BTreeMap;
use std::fmt;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

pub const MA_TREND: &str = "MA_Trend";
const SMA_FAST_TREND: &str = "SMA_50";
const SMA_SLOW_TREND: &str = "SMA_200";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Oversold,
    Overbought,
    Neutral,
    Bullish,
    Bearish,
    StrongUptrend,
    StrongDowntrend,
    MixedTrend,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Neutral,
    InsufficientData,
}

impl Signal {
    pub fn action(&self) -> Action {
        match self {
            Signal::Oversold | Signal::Bullish | Signal::StrongUptrend => Action::Buy,
            Signal::Overbought | Signal::Bearish | Signal::StrongDowntrend => Action::Sell,
            Signal::Neutral | Signal::MixedTrend => Action::Neutral,
            Signal::InsufficientData => Action::InsufficientData,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::Oversold => "oversold",
            Signal::Overbought => "overbought",
            Signal::Neutral => "neutral",
            Signal::Bullish => "bullish",
            Signal::Bearish => "bearish",
            Signal::StrongUptrend => "strong uptrend",
            Signal::StrongDowntrend => "strong downtrend",
            Signal::MixedTrend => "mixed trend",
            Signal::InsufficientData => "insufficient data",
        };
        write!(f, "{} ({})", label, self.action())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Neutral => write!(f, "NEUTRAL"),
            Action::InsufficientData => write!(f, "INSUFFICIENT_DATA"),
        }
    }
}

/// Signal per indicator name (`RSI`, `MACD`, `MA_Trend`).
pub type SignalSet = BTreeMap<String, Signal>;

/// Derive signals from the last row. Indicators whose columns are absent are
/// left out of the result.
pub fn get_signals(series: &PriceSeries) -> Result<SignalSet, StockscopeError> {
    let mut signals = SignalSet::new();

    if series.has_column(RSI) {
        signals.insert(RSI.to_string(), rsi_signal(series.last_value(RSI)));
    }

    if series.has_column(MACD) && series.has_column(MACD_SIGNAL) {
        let signal = match (series.last_value(MACD), series.last_value(MACD_SIGNAL)) {
            (Some(macd), Some(signal)) if macd > signal => Signal::Bullish,
            (Some(_), Some(_)) => Signal::Bearish,
            _ => Signal::InsufficientData,
        };
        signals.insert(MACD.to_string(), signal);
    }

    if series.has_column(SMA_FAST_TREND) && series.has_column(SMA_SLOW_TREND) {
        series.require(CLOSE)?;
        let signal = match (
            series.last_value(CLOSE),
            series.last_value(SMA_FAST_TREND),
            series.last_value(SMA_SLOW_TREND),
        ) {
            (Some(close), Some(fast), Some(slow)) if close > fast && fast > slow => {
                Signal::StrongUptrend
            }
            (Some(close), Some(fast), Some(slow)) if close < fast && fast < slow => {
                Signal::StrongDowntrend
            }
            (Some(_), Some(_), Some(_)) => Signal::MixedTrend,
            _ => Signal::InsufficientData,
        };
        signals.insert(MA_TREND.to_string(), signal);
    }

    Ok(signals)
}

fn rsi_signal(rsi: Option<f64>) -> Signal {
    match rsi {
        Some(v) if v < RSI_OVERSOLD => Signal::Oversold,
        Some(v) if v > RSI_OVERBOUGHT => Signal::Overbought,
        Some(_) => Signal::Neutral,
        None => Signal::InsufficientData,
    }
}
