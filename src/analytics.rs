//! Return Calculator
//!
//! Turns a validated `PriceSeries` into daily simple returns, summary
//! statistics and a short verification trace. Everything here is a pure
//! function of its input.

pub mod primitives;
pub mod summary;
pub mod verification;

pub use summary::SummaryStats;
pub use verification::{verification_trace, VerificationStep, DEFAULT_TRACE_LEN};

use crate::time_series::PriceSeries;
use chrono::NaiveDate;
use primitives::simple_return;
use serde::Serialize;

/// Formula applied to every adjacent pair of closes.
pub const RETURN_FORMULA: &str = "Return = (price_t / price_t-1) - 1";

/// Calculates simple returns from a price slice.
///
/// Uses the formula: P_t / P_{t-1} - 1
///
/// # Behavior
/// - Output has one fewer element than the input; the first price has no
///   predecessor and produces nothing
/// - Empty or single-price input returns an empty vector
/// - Zero, negative or NaN prices are not special-cased; the result is
///   whatever IEEE-754 division gives, so bad data stays visible
///
/// # Examples
/// ```
/// use daily_returns::analytics::calculate_returns;
///
/// let returns = calculate_returns(&[100.0, 110.0, 99.0]);
/// assert_eq!(returns.len(), 2);
/// assert!((returns[0] - 0.10).abs() < 1e-12);
/// assert!((returns[1] + 0.10).abs() < 1e-12);
/// ```
pub fn calculate_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| simple_return(pair[1], pair[0]))
        .collect()
}

/// A return attributed to the later of its two dates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub date: NaiveDate,
    pub value: f64,
}

impl ReturnRecord {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        ReturnRecord { date, value }
    }
}

/// Daily returns in the same date order as the prices they came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReturnSeries {
    records: Vec<ReturnRecord>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReturnRecord] {
        &self.records
    }

    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.value).collect()
    }

    /// The last `n` returns (or all of them if there are fewer).
    pub fn tail(&self, n: usize) -> &[ReturnRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Number of `inf`/`NaN` returns, i.e. returns computed from bad prices.
    pub fn non_finite_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| !record.value.is_finite())
            .count()
    }

    pub fn summary(&self) -> SummaryStats {
        SummaryStats::from_values(&self.values())
    }
}

/// Computes the daily return series for `prices`.
///
/// Element `i` of the output is dated `prices[i + 1].date` and equals
/// `close[i + 1] / close[i] - 1`. The series order is never changed.
pub fn calculate_daily_returns(prices: &PriceSeries) -> ReturnSeries {
    let closes = prices.closes();
    let records = prices
        .records()
        .iter()
        .skip(1)
        .zip(calculate_returns(&closes))
        .map(|(record, value)| ReturnRecord::new(record.date, value))
        .collect();

    ReturnSeries { records }
}
