//! Stateless numeric primitives behind the return calculator and its
//! summary statistics.
//!
//! None of these filter their input. A non-finite value anywhere in a slice
//! shows up in the result, so bad prices stay visible downstream.

/// Simple (arithmetic) return from `lagged` to `current`: `current / lagged - 1`.
///
/// A zero `lagged` price yields `inf`, `-inf` or `NaN` per IEEE-754.
pub fn simple_return(current: f64, lagged: f64) -> f64 {
    current / lagged - 1.0
}

/// Arithmetic mean, or `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divides by `n - 1`).
///
/// Returns `NaN` when fewer than two values are available, matching the
/// usual statistical-library convention.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }

    let mean = mean(values);
    let sum_squared_diff: f64 = values.iter().map(|&value| (value - mean).powi(2)).sum();

    (sum_squared_diff / (values.len() - 1) as f64).sqrt()
}

/// Smallest value. `NaN` if the slice is empty or contains a `NaN`.
pub fn min(values: &[f64]) -> f64 {
    extreme(values, f64::min)
}

/// Largest value. `NaN` if the slice is empty or contains a `NaN`.
pub fn max(values: &[f64]) -> f64 {
    extreme(values, f64::max)
}

// f64::min/max return the non-NaN operand, which would hide bad data
fn extreme(values: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    let mut iter = values.iter().copied();
    let Some(first) = iter.next() else {
        return f64::NAN;
    };

    iter.fold(first, |acc, value| {
        if acc.is_nan() || value.is_nan() {
            f64::NAN
        } else {
            pick(acc, value)
        }
    })
}
