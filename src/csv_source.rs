//! Offline price source backed by a Yahoo-style CSV export.

use crate::symbol::Symbol;
use crate::time_series::{select_range, DataUnavailableError, DateRange, PriceRecord, PriceSource};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: NaiveDate,
    #[serde(rename = "Close", alias = "close")]
    close: String,
}

/// Reads daily closes from a CSV file with `Date` and `Close` columns.
///
/// Extra columns (Open, High, Adj Close, ...) are ignored. The file is
/// assumed to hold a single instrument, so the requested symbol is only used
/// for error messages.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvPriceSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for CsvPriceSource {
    fn name(&self) -> &str {
        "CSV file"
    }

    async fn fetch_records(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Vec<PriceRecord>, DataUnavailableError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DataUnavailableError::Io(format!("{}: {}", self.path.display(), e)))?;

        let records = parse_price_csv(bytes.as_slice())?;
        let records = select_range(symbol, records, range)?;
        info!(path = %self.path.display(), rows = records.len(), "loaded daily prices");
        Ok(records)
    }
}

/// Parses CSV rows into records in file order.
///
/// A `Close` of `null` or an empty cell marks a provider gap and the row is
/// skipped. Any other unparseable value is an error.
pub fn parse_price_csv<R: Read>(reader: R) -> Result<Vec<PriceRecord>, DataUnavailableError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| DataUnavailableError::Parse(e.to_string()))?;
        let close = row.close.trim();

        if close.is_empty() || close.eq_ignore_ascii_case("null") {
            skipped += 1;
            continue;
        }

        let close = close.parse::<f64>().map_err(|e| {
            DataUnavailableError::Parse(format!("row {}: close '{}': {}", line + 1, close, e))
        })?;
        records.push(PriceRecord::new(row.date, close));
    }

    if skipped > 0 {
        warn!(skipped, "skipped rows without a close price");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EXPORT: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,472.16,473.67,470.49,472.65,466.10,123623700
2024-01-03,470.43,471.19,468.17,468.79,462.30,103585900
2024-01-04,null,null,null,null,null,null
2024-01-05,467.49,470.44,466.43,467.92,461.40,86118900
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_yahoo_export() {
        let records = parse_price_csv(EXPORT.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], PriceRecord::new(date(2024, 1, 2), 472.65));
        assert_eq!(records[2], PriceRecord::new(date(2024, 1, 5), 467.92));
    }

    #[test]
    fn test_parse_lowercase_headers() {
        let data = "date,close\n2024-01-02,100.5\n2024-01-03,101.25\n";
        let records = parse_price_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].close, 101.25);
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let data = "Date,Close\n2024-01-03,2.0\n2024-01-02,1.0\n";
        let records = parse_price_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].date, date(2024, 1, 3));
        assert_eq!(records[1].date, date(2024, 1, 2));
    }

    #[test]
    fn test_parse_rejects_bad_close() {
        let data = "Date,Close\n2024-01-02,abc\n";
        let err = parse_price_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DataUnavailableError::Parse(msg) if msg.contains("abc")));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let data = "Date,Close\n01/02/2024,100.0\n";
        assert!(matches!(
            parse_price_csv(data.as_bytes()),
            Err(DataUnavailableError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_from_file_filters_range() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", EXPORT).unwrap();

        let source = CsvPriceSource::new(file.path());
        let range = DateRange::new(date(2024, 1, 3), date(2024, 1, 31));
        let records = source.fetch_records(&Symbol::default(), &range).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2024, 1, 3));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = CsvPriceSource::new("/nonexistent/prices.csv");
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        let err = source.fetch_records(&Symbol::default(), &range).await.unwrap_err();
        assert!(matches!(err, DataUnavailableError::Io(msg) if msg.contains("prices.csv")));
    }
}
