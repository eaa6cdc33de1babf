use crate::symbol::Symbol;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of calendar days covered when no start date is given.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// A single daily price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Trading date in the exchange's local calendar
    pub date: NaiveDate,
    /// Closing price on that date
    pub close: f64,
}

impl PriceRecord {
    /// Creates a new PriceRecord.
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PriceRecord { date, close }
    }
}

/// Chronologically ordered daily prices for one instrument.
///
/// Dates are strictly increasing. The series is validated once on
/// construction and never reordered afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Wraps provider records after checking their order.
    ///
    /// # Arguments
    /// * `records` - Provider rows in delivery order
    ///
    /// # Returns
    /// Returns `Ok(PriceSeries)` if every date is after the one before it.
    ///
    /// # Errors
    /// Returns `SeriesError::NotChronological` at the first record whose date
    /// is not strictly after its predecessor's. Records are never sorted.
    pub fn new(records: Vec<PriceRecord>) -> Result<Self, SeriesError> {
        if let Some(index) = records.windows(2).position(|pair| pair[1].date <= pair[0].date) {
            return Err(SeriesError::NotChronological {
                index: index + 1,
                previous: records[index].date,
                current: records[index + 1].date,
            });
        }
        Ok(PriceSeries { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.close).collect()
    }

    pub fn first(&self) -> Option<&PriceRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    /// First and last dates actually present, if any.
    pub fn date_span(&self) -> Option<DateRange> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(DateRange::new(first.date, last.date)),
            _ => None,
        }
    }
}

/// Errors raised when provider data violates the series invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// A record's date is not after the previous record's date
    NotChronological {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::NotChronological {
                index,
                previous,
                current,
            } => write!(
                f,
                "Price series out of order at row {}: {} does not follow {}",
                index, current, previous
            ),
        }
    }
}

impl std::error::Error for SeriesError {}

/// Date range for querying price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive)
    pub start: NaiveDate,
    /// End date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new DateRange.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The `DEFAULT_LOOKBACK_DAYS` calendar days ending on `end`.
    ///
    /// Returns `None` if the start would fall before the earliest
    /// representable date.
    pub fn trailing(end: NaiveDate) -> Option<Self> {
        end.checked_sub_signed(Duration::days(DEFAULT_LOOKBACK_DAYS))
            .map(|start| DateRange { start, end })
    }

    /// Fills in missing bounds.
    ///
    /// `end` defaults to `today` and `start` defaults to one lookback period
    /// before the resolved end. `today` is passed in by the caller so the
    /// default is fixed at call time.
    ///
    /// # Arguments
    /// * `start` - Requested first date, if any
    /// * `end` - Requested last date, if any
    /// * `today` - Date used when `end` is not given
    ///
    /// # Returns
    /// Returns `Ok(DateRange)` with both bounds filled in.
    ///
    /// # Errors
    /// Returns `DataUnavailableError::InvalidDateRange` if the resolved start
    /// falls after the resolved end, or if the default start cannot be
    /// represented.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, DataUnavailableError> {
        let end = end.unwrap_or(today);
        let range = match start {
            Some(start) => DateRange::new(start, end),
            None => DateRange::trailing(end).ok_or(DataUnavailableError::InvalidDateRange(
                DateRange::new(NaiveDate::MIN, end),
            ))?,
        };

        if range.start > range.end {
            return Err(DataUnavailableError::InvalidDateRange(range));
        }
        Ok(range)
    }

    /// Returns true if `date` falls inside the range, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Source of daily price history.
///
/// Implementations return the raw provider rows for the requested range in
/// the order the provider delivered them. Ordering is checked by
/// `PriceSeries::new`, not here.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    /// Human-readable provider name used in the run report.
    fn name(&self) -> &str;

    /// Retrieves daily closes for `symbol` within `range` (inclusive).
    ///
    /// # Errors
    /// Returns `DataUnavailableError` if the provider is unreachable, the
    /// symbol is unknown, or no rows fall inside the range.
    async fn fetch_records(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Vec<PriceRecord>, DataUnavailableError>;
}

/// Errors that prevent a price history from being obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataUnavailableError {
    /// HTTP client creation failed
    ClientCreation(String),
    /// Provider could not be reached
    Network(String),
    /// Provider does not know the symbol
    InvalidSymbol(String),
    /// Provider answered but had no rows for the range
    Empty { symbol: String, range: DateRange },
    /// Provider returned an error response
    Api(String),
    /// Response body could not be decoded
    Parse(String),
    /// Local price file could not be read
    Io(String),
    /// Start date falls after end date
    InvalidDateRange(DateRange),
}

impl fmt::Display for DataUnavailableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataUnavailableError::ClientCreation(msg) => write!(f, "Client creation error: {}", msg),
            DataUnavailableError::Network(msg) => write!(f, "Network error: {}", msg),
            DataUnavailableError::InvalidSymbol(symbol) => write!(f, "Invalid symbol: {}", symbol),
            DataUnavailableError::Empty { symbol, range } => {
                write!(f, "No price data for {} between {}", symbol, range)
            }
            DataUnavailableError::Api(msg) => write!(f, "API error: {}", msg),
            DataUnavailableError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DataUnavailableError::Io(msg) => write!(f, "I/O error: {}", msg),
            DataUnavailableError::InvalidDateRange(range) => {
                write!(f, "Invalid date range: {}", range)
            }
        }
    }
}

impl std::error::Error for DataUnavailableError {}

/// Keeps the rows inside `range`, failing with `Empty` when none remain.
pub(crate) fn select_range(
    symbol: &Symbol,
    records: impl IntoIterator<Item = PriceRecord>,
    range: &DateRange,
) -> Result<Vec<PriceRecord>, DataUnavailableError> {
    let selected: Vec<PriceRecord> = records
        .into_iter()
        .filter(|record| range.contains(record.date))
        .collect();

    if selected.is_empty() {
        return Err(DataUnavailableError::Empty {
            symbol: symbol.to_string(),
            range: *range,
        });
    }
    Ok(selected)
}

/// In-memory price source for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    data: HashMap<Symbol, Vec<PriceRecord>>,
}

impl InMemoryPriceSource {
    /// Creates a new empty in-memory source.
    pub fn new() -> Self {
        InMemoryPriceSource {
            data: HashMap::new(),
        }
    }

    /// Sets the price history for a symbol, replacing any previous rows.
    pub fn add_data(&mut self, symbol: Symbol, records: Vec<PriceRecord>) {
        self.data.insert(symbol, records);
    }
}

impl PriceSource for InMemoryPriceSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_records(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Vec<PriceRecord>, DataUnavailableError> {
        if range.start > range.end {
            return Err(DataUnavailableError::InvalidDateRange(*range));
        }

        let records = self
            .data
            .get(symbol)
            .ok_or_else(|| DataUnavailableError::InvalidSymbol(symbol.to_string()))?;

        select_range(symbol, records.iter().copied(), range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_price_series_accepts_increasing_dates() {
        let series = PriceSeries::new(vec![
            PriceRecord::new(date(2024, 1, 2), 100.0),
            PriceRecord::new(date(2024, 1, 3), 101.0),
            PriceRecord::new(date(2024, 1, 5), 99.0),
        ])
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![100.0, 101.0, 99.0]);
        assert_eq!(
            series.date_span(),
            Some(DateRange::new(date(2024, 1, 2), date(2024, 1, 5)))
        );
    }

    #[test]
    fn test_price_series_rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![
            PriceRecord::new(date(2024, 1, 2), 100.0),
            PriceRecord::new(date(2024, 1, 2), 101.0),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            SeriesError::NotChronological {
                index: 1,
                previous: date(2024, 1, 2),
                current: date(2024, 1, 2),
            }
        );
    }

    #[test]
    fn test_price_series_rejects_reordering() {
        let result = PriceSeries::new(vec![
            PriceRecord::new(date(2024, 1, 2), 100.0),
            PriceRecord::new(date(2024, 1, 4), 101.0),
            PriceRecord::new(date(2024, 1, 3), 102.0),
        ]);
        assert!(matches!(
            result,
            Err(SeriesError::NotChronological { index: 2, .. })
        ));
    }

    #[test]
    fn test_empty_price_series() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.date_span(), None);
    }

    #[test]
    fn test_resolve_defaults_to_trailing_year() {
        let today = date(2024, 6, 30);
        let range = DateRange::resolve(None, None, today).unwrap();
        assert_eq!(range.end, today);
        assert_eq!(range.start, date(2023, 7, 1));
    }

    #[test]
    fn test_resolve_start_defaults_relative_to_explicit_end() {
        let range = DateRange::resolve(None, Some(date(2020, 12, 31)), date(2024, 6, 30)).unwrap();
        // 2020 is a leap year
        assert_eq!(range.start, date(2020, 1, 1));
        assert_eq!(range.end, date(2020, 12, 31));
    }

    #[test]
    fn test_resolve_rejects_inverted_range() {
        let err = DateRange::resolve(Some(date(2024, 2, 1)), Some(date(2024, 1, 1)), date(2024, 6, 30))
            .unwrap_err();
        assert!(matches!(err, DataUnavailableError::InvalidDateRange(_)));
    }

    #[test]
    fn test_resolve_rejects_end_near_earliest_date() {
        let end = NaiveDate::MIN + Duration::days(4);
        let err = DateRange::resolve(None, Some(end), date(2024, 1, 1)).unwrap_err();
        assert_eq!(
            err,
            DataUnavailableError::InvalidDateRange(DateRange::new(NaiveDate::MIN, end))
        );
        assert!(DateRange::trailing(end).is_none());
    }

    #[test]
    fn test_invalid_date_range_display() {
        let err = DataUnavailableError::InvalidDateRange(DateRange::new(date(2024, 2, 1), date(2024, 1, 1)));
        assert_eq!(err.to_string(), "Invalid date range: 2024-02-01 to 2024-01-01");
    }

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let range = DateRange::new(date(2024, 1, 15), date(2024, 1, 16));
        assert!(range.contains(date(2024, 1, 15)));
        assert!(range.contains(date(2024, 1, 16)));
        assert!(!range.contains(date(2024, 1, 17)));
    }

    #[tokio::test]
    async fn test_in_memory_source_filters_range() {
        let mut source = InMemoryPriceSource::new();
        let symbol = Symbol::new("SPY").unwrap();
        source.add_data(
            symbol.clone(),
            vec![
                PriceRecord::new(date(2024, 1, 14), 100.0),
                PriceRecord::new(date(2024, 1, 15), 101.0),
                PriceRecord::new(date(2024, 1, 16), 102.0),
                PriceRecord::new(date(2024, 1, 17), 103.0),
            ],
        );

        let range = DateRange::new(date(2024, 1, 15), date(2024, 1, 16));
        let records = source.fetch_records(&symbol, &range).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].close, 101.0);
        assert_eq!(records[1].close, 102.0);
    }

    #[tokio::test]
    async fn test_in_memory_source_unknown_symbol() {
        let source = InMemoryPriceSource::new();
        let symbol = Symbol::new("NOPE").unwrap();
        let range = DateRange::new(date(2024, 1, 15), date(2024, 1, 16));

        let err = source.fetch_records(&symbol, &range).await.unwrap_err();
        assert_eq!(err, DataUnavailableError::InvalidSymbol("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_in_memory_source_empty_range() {
        let mut source = InMemoryPriceSource::new();
        let symbol = Symbol::default();
        source.add_data(symbol.clone(), vec![PriceRecord::new(date(2024, 1, 14), 100.0)]);

        let range = DateRange::new(date(2024, 2, 1), date(2024, 2, 2));
        let err = source.fetch_records(&symbol, &range).await.unwrap_err();
        assert!(matches!(err, DataUnavailableError::Empty { .. }));
        assert!(err.to_string().contains("SPY"));
    }
}
