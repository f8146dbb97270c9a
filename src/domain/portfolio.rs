//! Weighted portfolio built from several processed series.
//!
//! Weights are `(symbol, weight)` pairs in selection order. A valid set sums
//! to 1 within [`WEIGHT_TOLERANCE`]; invalid sets are still usable for the
//! computations below, callers decide whether to warn.

use crate::domain::comparison::{align_column, build_unified_timeline, COMBINED_SYMBOL};
use crate::domain::error::StockscopeError;
use crate::domain::metrics::{mean_and_stddev, sharpe};
use crate::domain::processor::{RETURNS, TRADING_DAYS_PER_YEAR};
use crate::domain::series::{Column, PriceSeries, CLOSE};

pub const WEIGHT_TOLERANCE: f64 = 0.01;
pub const TOTAL: &str = "Total";

pub type Weights = Vec<(String, f64)>;

pub fn equal_weights(symbols: &[String]) -> Weights {
    let weight = 1.0 / symbols.len().max(1) as f64;
    symbols.iter().map(|s| (s.clone(), weight)).collect()
}

/// Pair a comma-separated weight list with `symbols`, position by position.
pub fn parse_weights(symbols: &[String], input: &str) -> Result<Weights, StockscopeError> {
    let values = input
        .split(',')
        .map(str::trim)
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w >= 0.0)
                .ok_or_else(|| StockscopeError::InvalidArgument {
                    reason: format!("invalid weight '{}'", token),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    if values.len() != symbols.len() {
        return Err(StockscopeError::InvalidArgument {
            reason: format!(
                "{} weights given for {} symbols",
                values.len(),
                symbols.len()
            ),
        });
    }
    Ok(symbols.iter().cloned().zip(values).collect())
}

pub fn total_weight(weights: &[(String, f64)]) -> f64 {
    weights.iter().map(|(_, w)| w).sum()
}

pub fn weights_are_valid(weights: &[(String, f64)]) -> bool {
    (total_weight(weights) - 1.0).abs() <= WEIGHT_TOLERANCE
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioStats {
    pub total_return_pct: f64,
    pub avg_daily_return_pct: f64,
    pub annual_volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub observations: usize,
}

/// Statistics of the weighted daily return series.
///
/// Each row sums `weight × Returns` over the symbols that have a defined
/// return on that date; a row with none sums to 0. `None` when no weighted
/// symbol carries a `Returns` column.
pub fn portfolio_stats(series: &[PriceSeries], weights: &[(String, f64)]) -> Option<PortfolioStats> {
    let members: Vec<(&PriceSeries, f64)> = weights
        .iter()
        .filter_map(|(symbol, weight)| {
            let s = series.iter().find(|s| &s.symbol == symbol)?;
            s.has_column(RETURNS).then_some((s, *weight))
        })
        .collect();
    if members.is_empty() {
        return None;
    }

    let timeline = build_unified_timeline(members.iter().map(|(s, _)| *s));

    let mut daily = vec![0.0; timeline.len()];
    for (s, weight) in &members {
        let returns = align_column(s, RETURNS, &timeline).ok()?;
        for (total, r) in daily.iter_mut().zip(returns) {
            if let Some(r) = r {
                *total += r * weight;
            }
        }
    }

    let growth: f64 = daily.iter().map(|r| 1.0 + r).product();
    let (mean, stddev) = mean_and_stddev(&daily);

    Some(PortfolioStats {
        total_return_pct: (growth - 1.0) * 100.0,
        avg_daily_return_pct: mean * 100.0,
        annual_volatility_pct: stddev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0,
        sharpe_ratio: sharpe(mean, stddev),
        observations: daily.len(),
    })
}

/// Growth of each positively weighted holding, `Close / first Close × weight`,
/// on a shared timeline plus a `Total` column summing the defined holdings.
pub fn portfolio_value(
    series: &[PriceSeries],
    weights: &[(String, f64)],
) -> Result<PriceSeries, StockscopeError> {
    let members: Vec<(&PriceSeries, f64)> = weights
        .iter()
        .filter(|(_, weight)| *weight > 0.0)
        .filter_map(|(symbol, weight)| {
            series
                .iter()
                .find(|s| &s.symbol == symbol)
                .map(|s| (s, *weight))
        })
        .collect();

    let timeline = build_unified_timeline(members.iter().map(|(s, _)| *s));

    let mut columns: Vec<(String, Column)> = Vec::with_capacity(members.len() + 1);
    for (s, weight) in &members {
        let base = s.value(CLOSE, 0).filter(|c| *c != 0.0);
        let closes = align_column(s, CLOSE, &timeline)?;
        let values = closes
            .into_iter()
            .map(|c| Some(c? / base? * weight))
            .collect();
        columns.push((s.symbol.clone(), values));
    }

    let total: Column = (0..timeline.len())
        .map(|row| Some(columns.iter().filter_map(|(_, c)| c[row]).sum()))
        .collect();
    columns.push((TOTAL.to_string(), total));

    PriceSeries::from_columns(COMBINED_SYMBOL, timeline, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::processor::calculate_returns;
    use crate::domain::series::fixtures::series_from_closes;
    use approx::assert_relative_eq;

    fn processed(symbol: &str, closes: &[f64]) -> PriceSeries {
        let mut series = calculate_returns(series_from_closes(closes), CLOSE).unwrap();
        series.symbol = symbol.to_string();
        series
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn equal_weights_sum_to_one() {
        let weights = equal_weights(&symbols(&["A", "B", "C"]));
        assert_eq!(weights.len(), 3);
        assert_relative_eq!(weights[0].1, 1.0 / 3.0);
        assert!(weights_are_valid(&weights));
    }

    #[test]
    fn weights_tolerance() {
        let ok = vec![("A".to_string(), 0.5), ("B".to_string(), 0.505)];
        let bad = vec![("A".to_string(), 0.5), ("B".to_string(), 0.6)];
        assert!(weights_are_valid(&ok));
        assert!(!weights_are_valid(&bad));
    }

    #[test]
    fn parse_weights_pairs_with_symbols() {
        let weights = parse_weights(&symbols(&["A", "B"]), "0.7, 0.3").unwrap();
        assert_eq!(weights, vec![("A".to_string(), 0.7), ("B".to_string(), 0.3)]);
    }

    #[test]
    fn parse_weights_rejects_bad_input() {
        let list = symbols(&["A", "B"]);
        assert!(parse_weights(&list, "0.5").is_err());
        assert!(parse_weights(&list, "0.5,abc").is_err());
        assert!(parse_weights(&list, "1.5,-0.5").is_err());
    }

    #[test]
    fn equal_weight_stats_of_identical_series() {
        let closes = [100.0, 110.0, 121.0];
        let series = vec![processed("A", &closes), processed("B", &closes)];
        let weights = equal_weights(&symbols(&["A", "B"]));

        let stats = portfolio_stats(&series, &weights).unwrap();
        assert_eq!(stats.observations, 3);
        assert_relative_eq!(stats.total_return_pct, 21.0, epsilon = 1e-9);
        // the undefined first row contributes a zero return
        let daily = [0.0, 0.1, 0.1];
        let (mean, sd) = mean_and_stddev(&daily);
        assert_relative_eq!(stats.avg_daily_return_pct, mean * 100.0, epsilon = 1e-9);
        assert_relative_eq!(
            stats.annual_volatility_pct,
            sd * 252f64.sqrt() * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(stats.sharpe_ratio, mean / sd * 252f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn stats_absent_without_returns() {
        let series = vec![series_from_closes(&[1.0, 2.0])];
        let weights = vec![("TEST".to_string(), 1.0)];
        assert_eq!(portfolio_stats(&series, &weights), None);
    }

    #[test]
    fn flat_portfolio_has_zero_sharpe() {
        let series = vec![processed("A", &[5.0, 5.0, 5.0])];
        let stats = portfolio_stats(&series, &[("A".to_string(), 1.0)]).unwrap();
        assert_eq!(stats.sharpe_ratio, 0.0);
        assert_eq!(stats.total_return_pct, 0.0);
    }

    #[test]
    fn value_normalizes_to_first_close() {
        let series = vec![processed("A", &[10.0, 20.0]), processed("B", &[50.0, 25.0])];
        let weights = vec![
            ("A".to_string(), 0.5),
            ("B".to_string(), 0.5),
            ("C".to_string(), 0.0),
        ];
        let value = portfolio_value(&series, &weights).unwrap();
        assert_eq!(value.column("A").unwrap(), &[Some(0.5), Some(1.0)]);
        assert_eq!(value.column("B").unwrap(), &[Some(0.5), Some(0.25)]);
        assert_eq!(value.column(TOTAL).unwrap(), &[Some(1.0), Some(1.25)]);
        assert!(!value.has_column("C"));
    }

    #[test]
    fn value_skips_zero_weights() {
        let series = vec![processed("A", &[10.0, 20.0]), processed("B", &[50.0, 25.0])];
        let weights = vec![("A".to_string(), 1.0), ("B".to_string(), 0.0)];
        let value = portfolio_value(&series, &weights).unwrap();
        assert_eq!(value.column_names().collect::<Vec<_>>(), vec!["A", TOTAL]);
    }
}
