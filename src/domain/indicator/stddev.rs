//! Rolling standard deviation.
//!
//! Sample standard deviation (divides by N-1) over a trailing window.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n-1))
//! Warmup: first (n-1) rows are undefined. A window of one value has no
//! sample deviation and is undefined too.

use crate::domain::indicator::trailing_window;
use crate::domain::series::Column;

pub fn rolling_stddev(values: &[Option<f64>], period: usize) -> Column {
    (0..values.len())
        .map(|i| {
            if period < 2 {
                return None;
            }
            trailing_window(values, i, period).map(|window| sample_stddev(&window))
        })
        .collect()
}

/// Sample standard deviation of a slice. Callers pass at least two values.
pub fn sample_stddev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    variance.sqrt()
}
