use crate::analytics::primitives;
use serde::Serialize;

/// Descriptive statistics over a return series.
///
/// Undefined figures are `NaN`: all of them for an empty series, and
/// `std_dev` when there is only one return. Non-finite returns are
/// included, so they show up in the aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    pub fn from_values(values: &[f64]) -> Self {
        SummaryStats {
            count: values.len(),
            mean: primitives::mean(values),
            std_dev: primitives::sample_std_dev(values),
            min: primitives::min(values),
            max: primitives::max(values),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
