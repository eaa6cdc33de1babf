//! One run: fetch prices, then derive returns, statistics and the
//! verification trace.

use crate::analytics::{
    calculate_daily_returns, verification_trace, ReturnSeries, SummaryStats, VerificationStep,
    DEFAULT_TRACE_LEN,
};
use crate::symbol::Symbol;
use crate::time_series::{DataUnavailableError, DateRange, PriceSeries, PriceSource, SeriesError};
use std::fmt;
use tracing::{debug, warn};

/// Everything a successful run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub symbol: Symbol,
    /// Requested range; the series may cover less of it (weekends, holidays)
    pub range: DateRange,
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub summary: SummaryStats,
    pub trace: Vec<VerificationStep>,
}

/// Why a run produced no report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// Price history could not be obtained
    DataUnavailable(DataUnavailableError),
    /// The provider's rows break the chronological-order invariant
    InvalidSeries(SeriesError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::DataUnavailable(e) => write!(f, "{}", e),
            RunError::InvalidSeries(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::DataUnavailable(e) => Some(e),
            RunError::InvalidSeries(e) => Some(e),
        }
    }
}

impl From<DataUnavailableError> for RunError {
    fn from(e: DataUnavailableError) -> Self {
        RunError::DataUnavailable(e)
    }
}

impl From<SeriesError> for RunError {
    fn from(e: SeriesError) -> Self {
        RunError::InvalidSeries(e)
    }
}

/// Fetches rows from `source` and validates them into a `PriceSeries`.
pub async fn fetch_price_series<S: PriceSource>(
    source: &S,
    symbol: &Symbol,
    range: &DateRange,
) -> Result<PriceSeries, RunError> {
    debug!(source = source.name(), %symbol, %range, "fetching price series");
    let records = source.fetch_records(symbol, range).await?;
    Ok(PriceSeries::new(records)?)
}

/// Derives returns, summary and trace from an already-fetched series.
pub fn analyze(symbol: Symbol, range: DateRange, prices: PriceSeries) -> RunReport {
    let returns = calculate_daily_returns(&prices);

    let non_finite = returns.non_finite_count();
    if non_finite > 0 {
        warn!(%symbol, non_finite, "non-finite returns; check for zero or missing prices");
    }

    let summary = returns.summary();
    let trace = verification_trace(&prices, DEFAULT_TRACE_LEN);

    RunReport {
        symbol,
        range,
        prices,
        returns,
        summary,
        trace,
    }
}

/// Runs fetch → compute for one instrument.
///
/// # Errors
/// Returns `RunError::DataUnavailable` if the source fails and
/// `RunError::InvalidSeries` if its rows are out of order. Bad price values
/// are not errors; they surface as non-finite returns.
pub async fn run<S: PriceSource>(
    source: &S,
    symbol: &Symbol,
    range: &DateRange,
) -> Result<RunReport, RunError> {
    let prices = fetch_price_series(source, symbol, range).await?;
    Ok(analyze(symbol.clone(), *range, prices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_series::{InMemoryPriceSource, PriceRecord};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn source_with(records: Vec<PriceRecord>) -> InMemoryPriceSource {
        let mut source = InMemoryPriceSource::new();
        source.add_data(Symbol::default(), records);
        source
    }

    #[tokio::test]
    async fn test_run_produces_report() {
        let source = source_with(vec![
            PriceRecord::new(date(2024, 1, 2), 100.0),
            PriceRecord::new(date(2024, 1, 3), 110.0),
            PriceRecord::new(date(2024, 1, 4), 99.0),
        ]);
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));

        let report = run(&source, &Symbol::default(), &range).await.unwrap();
        assert_eq!(report.prices.len(), 3);
        assert_eq!(report.returns.len(), 2);
        assert_eq!(report.summary.count, 2);
        assert_eq!(report.trace.len(), 2);
        assert_eq!(report.range, range);
    }

    #[tokio::test]
    async fn test_run_rejects_out_of_order_rows() {
        let source = source_with(vec![
            PriceRecord::new(date(2024, 1, 3), 100.0),
            PriceRecord::new(date(2024, 1, 2), 110.0),
        ]);
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));

        let err = run(&source, &Symbol::default(), &range).await.unwrap_err();
        assert!(matches!(err, RunError::InvalidSeries(_)));
    }

    #[tokio::test]
    async fn test_run_surfaces_source_errors_unchanged() {
        let source = InMemoryPriceSource::new();
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));

        let err = run(&source, &Symbol::default(), &range).await.unwrap_err();
        assert_eq!(
            err,
            RunError::DataUnavailable(DataUnavailableError::InvalidSymbol("SPY".to_string()))
        );
        assert_eq!(err.to_string(), "Invalid symbol: SPY");
    }

    #[test]
    fn test_analyze_keeps_non_finite_returns() {
        let prices = PriceSeries::new(vec![
            PriceRecord::new(date(2024, 1, 2), 100.0),
            PriceRecord::new(date(2024, 1, 3), 0.0),
            PriceRecord::new(date(2024, 1, 4), 50.0),
        ])
        .unwrap();
        let range = DateRange::new(date(2024, 1, 2), date(2024, 1, 4));

        let report = analyze(Symbol::default(), range, prices);
        assert_eq!(report.returns.non_finite_count(), 1);
        assert_eq!(report.summary.count, 2);
        assert!(!report.trace[1].value.is_finite());
    }
}
