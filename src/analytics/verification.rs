use crate::analytics::primitives::simple_return;
use crate::time_series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Number of steps shown in the audit trace.
pub const DEFAULT_TRACE_LEN: usize = 5;

/// One hand-checkable return computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerificationStep {
    pub date: NaiveDate,
    pub price_t: f64,
    pub price_t_minus_1: f64,
    pub value: f64,
}

/// Lists the inputs and result of the first `limit` return computations.
pub fn verification_trace(prices: &PriceSeries, limit: usize) -> Vec<VerificationStep> {
    prices
        .records()
        .windows(2)
        .take(limit)
        .map(|pair| VerificationStep {
            date: pair[1].date,
            price_t: pair[1].close,
            price_t_minus_1: pair[0].close,
            value: simple_return(pair[1].close, pair[0].close),
        })
        .collect()
}
