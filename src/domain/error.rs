//! Domain error types.

/// Top-level error type for stockscope.
///
/// Short input and degenerate arithmetic are not errors: indicator and
/// processor functions answer those with undefined values. Only caller
/// contract violations, configuration problems and data source failures
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum StockscopeError {
    #[error("missing required column {column}")]
    MissingColumn { column: String },

    #[error("column {column} has {actual} rows, series has {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockscopeError {
    pub fn missing_column(column: &str) -> Self {
        StockscopeError::MissingColumn {
            column: column.to_string(),
        }
    }
}

impl From<&StockscopeError> for std::process::ExitCode {
    fn from(err: &StockscopeError) -> Self {
        let code: u8 = match err {
            StockscopeError::Io(_) => 1,
            StockscopeError::ConfigParse { .. } | StockscopeError::ConfigInvalid { .. } => 2,
            StockscopeError::DataSource { .. } => 3,
            StockscopeError::MissingColumn { .. }
            | StockscopeError::ColumnLength { .. }
            | StockscopeError::InvalidArgument { .. } => 4,
            StockscopeError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
