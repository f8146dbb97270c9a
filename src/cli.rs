//! Command-line interface: argument parsing and command orchestration.

use crate::adapters::cached_data_adapter::{CachedDataAdapter, RetryPolicy};
use crate::adapters::csv_adapter::{write_series, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::comparison::{correlation_matrix, DailyChange, PerformanceSummary};
use crate::domain::config_validation::{load_settings, Settings};
use crate::domain::error::StockscopeError;
use crate::domain::indicator_helpers::{add_all_indicators, configured_indicators};
use crate::domain::metrics::ReturnStats;
use crate::domain::portfolio::{
    equal_weights, parse_weights, portfolio_stats, portfolio_value, total_weight,
    weights_are_valid, TOTAL,
};
use crate::domain::processor::{calculate_returns, calculate_volatility, clean, RETURNS};
use crate::domain::series::{PriceSeries, CLOSE};
use crate::domain::signal::get_signals;
use crate::domain::universe::{
    fallback_symbols, normalize_symbol, parse_symbols, validate_selection, MARKET_INDICES,
    MAX_COMPARE_SYMBOLS,
};
use crate::ports::data_port::{Interval, MarketDataPort, Period};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info, warn};

const NOT_AVAILABLE: &str = "N/A";
const OVERVIEW_PERIOD: Period = Period::Days(5);

#[derive(Parser)]
#[command(name = "stockscope", about = "Stock analysis: indicators, signals, comparison and portfolios")]
pub struct Cli {
    /// Path to INI config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of <SYMBOL>.csv price files (overrides [data] path)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Indicators, signals and return statistics for one symbol
    Analyze {
        #[arg(short, long)]
        symbol: String,

        /// Look-back period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
        #[arg(short, long)]
        period: Option<Period>,

        /// Sampling interval (1d, 1wk, 1mo, 3mo)
        #[arg(short, long)]
        interval: Option<Interval>,

        /// Write the augmented series to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Performance table and Close correlation for several symbols
    Compare {
        /// Comma-separated symbols
        #[arg(short, long)]
        symbols: String,

        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Weighted portfolio statistics and value
    Portfolio {
        /// Comma-separated symbols
        #[arg(short, long)]
        symbols: String,

        /// Comma-separated weights, one per symbol (default: equal)
        #[arg(short, long)]
        weights: Option<String>,

        #[arg(short, long)]
        period: Option<Period>,
    },
    /// Daily change of the major market indices
    Overview {
        #[arg(short, long)]
        period: Option<Period>,
    },
    /// List symbols available from the data source
    ListSymbols,
    /// Descriptive record for a symbol
    Info {
        #[arg(short, long)]
        symbol: String,
    },
    /// Validate the config file without fetching data
    Validate,
}

pub fn run(cli: Cli) -> ExitCode {
    if let Command::Validate = cli.command {
        return run_validate(cli.config.as_deref());
    }

    let settings = match resolve_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let port = build_data_port(&settings, cli.data_dir.as_deref());

    let result = match cli.command {
        Command::Analyze {
            symbol,
            period,
            interval,
            output,
        } => run_analyze(
            port.as_ref(),
            &settings,
            &symbol,
            period,
            interval,
            output.as_deref(),
        ),
        Command::Compare { symbols, period } => {
            run_compare(port.as_ref(), &settings, &symbols, period)
        }
        Command::Portfolio {
            symbols,
            weights,
            period,
        } => run_portfolio(port.as_ref(), &settings, &symbols, weights.as_deref(), period),
        Command::Overview { period } => run_overview(port.as_ref(), &settings, period),
        Command::ListSymbols => {
            run_list_symbols(port.as_ref());
            Ok(())
        }
        Command::Info { symbol } => run_info(port.as_ref(), &symbol),
        Command::Validate => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Settings from `config` when given, built-in defaults otherwise.
pub fn resolve_settings(config: Option<&Path>) -> Result<Settings, StockscopeError> {
    match config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_settings(&FileConfigAdapter::from_file(path)?)
        }
        None => Ok(Settings::default()),
    }
}

/// CSV source behind the retry/cache decorator. A disabled cache keeps the
/// retry policy with entries that expire immediately.
pub fn build_data_port(settings: &Settings, data_dir: Option<&Path>) -> Box<dyn MarketDataPort> {
    let path = data_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.data.path.clone());
    let retry = RetryPolicy::new(settings.data.max_retries, settings.data.retry_delay);
    let ttl = if settings.data.cache_enabled {
        settings.data.cache_expiry
    } else {
        Duration::ZERO
    };
    info!(path = %path.display(), cache = settings.data.cache_enabled, "opening data source");
    Box::new(CachedDataAdapter::new(CsvAdapter::new(path), retry, ttl))
}

/// Fetch and clean one symbol. Missing or empty data is [`StockscopeError::NoData`].
pub fn load_series(
    port: &dyn MarketDataPort,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<PriceSeries, StockscopeError> {
    info!(%symbol, %period, %interval, "fetching");
    let no_data = || StockscopeError::NoData {
        symbol: symbol.to_string(),
    };
    let series = port.fetch_ohlcv(symbol, period, interval)?.ok_or_else(no_data)?;
    let series = clean(series)?;
    if series.is_empty() {
        return Err(no_data());
    }
    Ok(series)
}

/// Load each symbol, skipping those with no data or a failing source.
fn load_many(
    port: &dyn MarketDataPort,
    symbols: &[String],
    period: Period,
    interval: Interval,
) -> Vec<PriceSeries> {
    symbols
        .iter()
        .filter_map(|symbol| match load_series(port, symbol, period, interval) {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(%symbol, error = %e, "skipping symbol");
                None
            }
        })
        .collect()
}

/// Full single-symbol pipeline: clean, returns, volatility, indicators.
pub fn analyze_series(series: PriceSeries, settings: &Settings) -> Result<PriceSeries, StockscopeError> {
    let series = calculate_returns(series, CLOSE)?;
    let series = calculate_volatility(series, settings.analysis.volatility_window, RETURNS)?;
    add_all_indicators(series, &settings.indicators)
}

fn run_analyze(
    port: &dyn MarketDataPort,
    settings: &Settings,
    symbol: &str,
    period: Option<Period>,
    interval: Option<Interval>,
    output: Option<&Path>,
) -> Result<(), StockscopeError> {
    let symbol = normalize_symbol(symbol);
    let period = period.unwrap_or(settings.data.default_period);
    let interval = interval.unwrap_or(settings.data.default_interval);

    let series = load_series(port, &symbol, period, interval)?;
    let series = analyze_series(series, settings)?;
    let summary = PerformanceSummary::compute(&series)?;
    let stats = ReturnStats::compute(&series)?;
    let signals = get_signals(&series)?;

    println!("=== {} ({}, {}) ===", symbol, period, interval);
    println!("Rows:             {}", series.len());
    print_summary(&summary);

    println!("\n=== Return Statistics ===");
    println!("Mean Daily:       {:.3}%", stats.mean_daily_return_pct);
    println!("Daily Volatility: {:.3}%", stats.daily_volatility_pct);
    println!("Sharpe Ratio:     {:.2}", stats.sharpe_ratio);
    println!("Max Drawdown:     -{:.1}%", stats.max_drawdown * 100.0);
    println!("Drawdown Length:  {} rows", stats.max_drawdown_duration);

    println!("\n=== Signals ===");
    if signals.is_empty() {
        println!("  none");
    }
    for (indicator, signal) in &signals {
        println!("  {:<10} {}", indicator, signal);
    }

    if let Some(path) = output {
        write_series(&series, path)?;
        info!(path = %path.display(), rows = series.len(), "wrote series");
        println!("\nSeries written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(summary: &PerformanceSummary) {
    println!("First Close:      {:.2}", summary.first_close);
    println!("Last Close:       {:.2}", summary.last_close);
    println!(
        "Change:           {:+.2} ({:+.2}%)",
        summary.change, summary.change_pct
    );
    println!("High / Low:       {} / {}", fmt_opt(summary.high, 2), fmt_opt(summary.low, 2));
    println!("Volatility:       {}%", fmt_opt(summary.volatility_pct, 2));
    println!("Avg Volume:       {}", fmt_opt(summary.avg_volume, 0));
}

fn run_compare(
    port: &dyn MarketDataPort,
    settings: &Settings,
    symbols: &str,
    period: Option<Period>,
) -> Result<(), StockscopeError> {
    let symbols = parse_symbols(symbols)?;
    validate_selection(&symbols, MAX_COMPARE_SYMBOLS)?;
    let period = period.unwrap_or(settings.data.default_period);

    let loaded = load_many(port, &symbols, period, Interval::Daily);
    if loaded.is_empty() {
        return Err(StockscopeError::NoData {
            symbol: symbols.join(","),
        });
    }

    println!("=== Performance ({}) ===", period);
    println!(
        "{:<8} {:>10} {:>10} {:>9} {:>10} {:>10}",
        "Symbol", "First", "Last", "Change%", "High", "Vol%"
    );
    for series in &loaded {
        let summary = PerformanceSummary::compute(series)?;
        println!(
            "{:<8} {:>10.2} {:>10.2} {:>+9.2} {:>10} {:>10}",
            summary.symbol,
            summary.first_close,
            summary.last_close,
            summary.change_pct,
            fmt_opt(summary.high, 2),
            fmt_opt(summary.volatility_pct, 2),
        );
    }

    if loaded.len() < 2 {
        return Ok(());
    }
    let matrix = correlation_matrix(&loaded)?;
    println!("\n=== Correlation (Close) ===");
    print!("{:<8}", "");
    for symbol in &matrix.symbols {
        print!(" {:>8}", symbol);
    }
    println!();
    for (symbol, row) in matrix.symbols.iter().zip(&matrix.values) {
        print!("{:<8}", symbol);
        for value in row {
            print!(" {:>8}", fmt_opt(*value, 3));
        }
        println!();
    }
    Ok(())
}

fn run_portfolio(
    port: &dyn MarketDataPort,
    settings: &Settings,
    symbols: &str,
    weights: Option<&str>,
    period: Option<Period>,
) -> Result<(), StockscopeError> {
    let symbols = parse_symbols(symbols)?;
    validate_selection(&symbols, MAX_COMPARE_SYMBOLS)?;
    let weights = match weights {
        Some(input) => parse_weights(&symbols, input)?,
        None => equal_weights(&symbols),
    };
    if !weights_are_valid(&weights) {
        warn!(total = total_weight(&weights), "weights do not sum to 1");
    }
    let period = period.unwrap_or(settings.data.default_period);

    let loaded = load_many(port, &symbols, period, Interval::Daily)
        .into_iter()
        .map(|series| calculate_returns(series, CLOSE))
        .collect::<Result<Vec<_>, _>>()?;

    let stats = portfolio_stats(&loaded, &weights).ok_or_else(|| StockscopeError::NoData {
        symbol: symbols.join(","),
    })?;
    let value = portfolio_value(&loaded, &weights)?;

    println!("=== Portfolio ({}) ===", period);
    for (symbol, weight) in &weights {
        println!("  {:<8} {:>6.1}%", symbol, weight * 100.0);
    }
    println!("Total Return:     {:.2}%", stats.total_return_pct);
    println!("Avg Daily Return: {:.3}%", stats.avg_daily_return_pct);
    println!("Annual Vol:       {:.2}%", stats.annual_volatility_pct);
    println!("Sharpe Ratio:     {:.2}", stats.sharpe_ratio);
    println!("Observations:     {}", stats.observations);

    if let Some(date) = value.dates().last() {
        println!("\n=== Value per unit invested ({}) ===", date);
        for name in value.column_names() {
            if name != TOTAL {
                println!("  {:<8} {}", name, fmt_opt(value.last_value(name), 4));
            }
        }
        println!("  {:<8} {}", TOTAL, fmt_opt(value.last_value(TOTAL), 4));
    }
    Ok(())
}

fn run_overview(
    port: &dyn MarketDataPort,
    settings: &Settings,
    period: Option<Period>,
) -> Result<(), StockscopeError> {
    let period = period.unwrap_or(OVERVIEW_PERIOD);
    let mut shown = 0;
    println!("=== Market Overview ===");
    for (symbol, name) in MARKET_INDICES {
        let change = load_series(port, symbol, period, settings.data.default_interval)
            .map(|series| DailyChange::compute(&series));
        match change {
            Ok(Some(change)) => {
                println!(
                    "{:<14} {:>10.2} {:>+9.2} ({:+.2}%)  {}",
                    name, change.close, change.change, change.change_pct, change.date
                );
                shown += 1;
            }
            Ok(None) => warn!(%symbol, "fewer than two rows, skipping index"),
            Err(e) => warn!(%symbol, error = %e, "skipping index"),
        }
    }
    if shown == 0 {
        return Err(StockscopeError::NoData {
            symbol: "market indices".to_string(),
        });
    }
    Ok(())
}

fn run_list_symbols(port: &dyn MarketDataPort) {
    let symbols = match port.list_symbols() {
        Ok(symbols) if !symbols.is_empty() => symbols,
        Ok(_) => {
            warn!("data source lists no symbols, using built-in list");
            fallback_symbols()
        }
        Err(e) => {
            warn!(error = %e, "listing symbols failed, using built-in list");
            fallback_symbols()
        }
    };
    for symbol in &symbols {
        println!("{}", symbol);
    }
    eprintln!("{} symbols", symbols.len());
}

fn run_info(port: &dyn MarketDataPort, symbol: &str) -> Result<(), StockscopeError> {
    let info = port.symbol_info(&normalize_symbol(symbol))?;
    println!("Symbol:           {}", info.symbol);
    println!("Name:             {}", info.name);
    println!("Sector:           {}", info.sector);
    println!("Industry:         {}", info.industry);
    println!("Market Cap:       {:.0}", info.market_cap);
    println!("P/E Ratio:        {:.2}", info.pe_ratio);
    println!("Dividend Yield:   {:.2}%", info.dividend_yield * 100.0);
    println!("Beta:             {:.2}", info.beta);
    println!("52w High / Low:   {:.2} / {:.2}", info.week52_high, info.week52_low);
    Ok(())
}

fn run_validate(config: Option<&Path>) -> ExitCode {
    let Some(path) = config else {
        eprintln!("error: --config is required for validate");
        return ExitCode::from(2);
    };
    eprintln!("Validating config: {}", path.display());
    let adapter = match load_config(path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match load_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let indicators = match configured_indicators(&settings.indicators) {
        Ok(indicators) => indicators,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    println!("Indicators to compute:");
    for indicator in indicators {
        println!("  {}", indicator);
    }
    println!("Data directory:   {}", settings.data.path.display());
    println!(
        "Defaults:         period {}, interval {}",
        settings.data.default_period, settings.data.default_interval
    );
    println!(
        "Volatility window: {}",
        settings.analysis.volatility_window
    );
    println!("Config validated successfully");
    ExitCode::SUCCESS
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => NOT_AVAILABLE.to_string(),
    }
}
