//! Symbol selection: parsing user lists, selection limits, built-in lists.

use crate::domain::error::StockscopeError;
use std::collections::HashSet;

pub const MAX_COMPARE_SYMBOLS: usize = 10;

/// Large index constituents, used when the data source cannot list symbols.
pub const FALLBACK_SYMBOLS: [&str; 57] = [
    "AAPL", "ABBV", "ABT", "ADBE", "AMD", "AMZN", "AVGO", "AXP", "BA", "BAC", "C", "CAT", "COP",
    "COST", "CRM", "CSCO", "CVX", "DIS", "GE", "GOOGL", "GS", "HD", "HON", "IBM", "INTC", "JNJ",
    "JPM", "KO", "LLY", "MA", "MCD", "META", "MMM", "MRK", "MS", "MSFT", "NFLX", "NKE", "NVDA",
    "ORCL", "PEP", "PFE", "PG", "PYPL", "QCOM", "SLB", "T", "TMO", "TMUS", "TSLA", "TXN", "UNH",
    "UPS", "V", "VZ", "WFC", "WMT",
];

/// Indices shown on the market overview, as `(symbol, display name)`.
pub const MARKET_INDICES: [(&str, &str); 4] = [
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones"),
    ("^IXIC", "NASDAQ"),
    ("^RUT", "Russell 2000"),
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("no symbols selected")]
    NoSymbols,

    #[error("{count} symbols selected, at most {max} allowed")]
    TooManySymbols { count: usize, max: usize },
}

impl From<UniverseError> for StockscopeError {
    fn from(err: UniverseError) -> Self {
        StockscopeError::InvalidArgument {
            reason: err.to_string(),
        }
    }
}

/// Parse `aapl, msft,BRK.B` into `["AAPL", "MSFT", "BRK-B"]`.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = normalize_symbol(trimmed);
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Upper-case and swap share-class dots for dashes (`brk.b` -> `BRK-B`).
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

pub fn validate_selection(symbols: &[String], max: usize) -> Result<(), UniverseError> {
    if symbols.is_empty() {
        return Err(UniverseError::NoSymbols);
    }
    if symbols.len() > max {
        return Err(UniverseError::TooManySymbols {
            count: symbols.len(),
            max,
        });
    }
    Ok(())
}

pub fn fallback_symbols() -> Vec<String> {
    FALLBACK_SYMBOLS.iter().map(|s| s.to_string()).collect()
}
