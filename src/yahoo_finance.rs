use crate::symbol::Symbol;
use crate::time_series::{select_range, DataUnavailableError, DateRange, PriceRecord, PriceSource};
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the Yahoo Finance client
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// API root, without trailing slash (default: "https://query1.finance.yahoo.com")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        DownloaderConfig {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_seconds: 30,
            user_agent: concat!("Mozilla/5.0 (compatible; daily-returns/", env!("CARGO_PKG_VERSION"), ")")
                .to_string(),
        }
    }
}

/// Yahoo Finance daily price client.
///
/// Talks to the v8 chart endpoint and turns its JSON into `PriceRecord`s.
/// A failed request is reported as-is; there is no retry.
#[derive(Debug)]
pub struct YahooFinanceClient {
    client: Client,
    config: DownloaderConfig,
}

impl YahooFinanceClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Result<Self, DataUnavailableError> {
        Self::with_config(DownloaderConfig::default())
    }

    /// Creates a new client with custom configuration.
    ///
    /// # Arguments
    /// * `config` - Base URL, timeout and User-Agent for the HTTP client
    ///
    /// # Returns
    /// Returns `Ok(YahooFinanceClient)` if successful.
    ///
    /// # Errors
    /// Returns `DataUnavailableError::ClientCreation` if the HTTP client cannot be built.
    pub fn with_config(config: DownloaderConfig) -> Result<Self, DataUnavailableError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DataUnavailableError::ClientCreation(e.to_string()))?;

        Ok(YahooFinanceClient { client, config })
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Fetches the raw chart JSON for `symbol` over `range`.
    ///
    /// # Arguments
    /// * `symbol` - Yahoo Finance symbol (e.g., "SPY", "ES=F")
    /// * `range` - Inclusive date range to request
    ///
    /// # Returns
    /// Returns the response body as a string.
    ///
    /// # Errors
    /// Returns `Network` on transport failure, `InvalidSymbol` on HTTP 404 and
    /// `Api` for any other non-success status.
    pub async fn fetch_chart(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<String, DataUnavailableError> {
        let (period1, period2) = request_window(range)?;
        let url = format!("{}/v8/finance/chart/{}", self.config.base_url, symbol);
        debug!(%url, period1, period2, "requesting chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(|e| DataUnavailableError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DataUnavailableError::InvalidSymbol(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(DataUnavailableError::Api(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        response
            .text()
            .await
            .map_err(|e| DataUnavailableError::Network(e.to_string()))
    }
}

impl PriceSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_records(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Vec<PriceRecord>, DataUnavailableError> {
        let body = self.fetch_chart(symbol, range).await?;
        let records = parse_chart_response(symbol, &body)?;
        let records = select_range(symbol, records, range)?;
        info!(%symbol, rows = records.len(), "fetched daily prices");
        Ok(records)
    }
}

/// Converts an inclusive date range into the `period1`/`period2` epoch
/// seconds the chart endpoint expects. `period2` is exclusive upstream, so it
/// points at midnight UTC after `range.end`.
///
/// # Arguments
/// * `range` - Inclusive date range to request
///
/// # Returns
/// Returns `(period1, period2)` in seconds since the Unix epoch.
///
/// # Errors
/// Returns `InvalidDateRange` if either bound cannot be represented.
pub fn request_window(range: &DateRange) -> Result<(i64, i64), DataUnavailableError> {
    let invalid = || DataUnavailableError::InvalidDateRange(*range);
    let day_after_end = range.end.succ_opt().ok_or_else(invalid)?;
    let period1 = midnight_utc(range.start).ok_or_else(invalid)?;
    let period2 = midnight_utc(day_after_end).ok_or_else(invalid)?;
    Ok((period1, period2))
}

fn midnight_utc(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0).map(|start| start.and_utc().timestamp())
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Decodes a chart response body into daily records in provider order.
///
/// Timestamps are shifted by the exchange GMT offset before taking the
/// calendar date, so a 09:30 New York open maps to the New York trading day.
/// Rows with a `null` close are skipped.
///
/// # Arguments
/// * `symbol` - Symbol the body was requested for, used in errors
/// * `body` - Raw chart JSON
///
/// # Errors
/// `InvalidSymbol` for a "Not Found" chart error, `Api` for any other chart
/// error and `Parse` for malformed JSON. A response without rows decodes to
/// an empty vector; the caller decides whether that is an error.
pub fn parse_chart_response(
    symbol: &Symbol,
    body: &str,
) -> Result<Vec<PriceRecord>, DataUnavailableError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| DataUnavailableError::Parse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(DataUnavailableError::InvalidSymbol(symbol.to_string()));
        }
        return Err(DataUnavailableError::Api(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DataUnavailableError::Parse("chart response has no result".to_string()))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        return Err(DataUnavailableError::Parse(format!(
            "{} timestamps but {} closes",
            result.timestamp.len(),
            closes.len()
        )));
    }

    let offset = result.meta.gmtoffset;
    let mut records = Vec::with_capacity(closes.len());
    let mut skipped = 0usize;

    for (&timestamp, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close else {
            skipped += 1;
            continue;
        };
        let date = timestamp
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| DataUnavailableError::Parse(format!("timestamp {} out of range", timestamp)))?
            .date_naive();
        records.push(PriceRecord::new(date, close));
    }

    if skipped > 0 {
        warn!(%symbol, skipped, "skipped rows without a close price");
    }

    Ok(records)
}
