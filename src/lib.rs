pub mod symbol;
pub mod time_series;
pub mod yahoo_finance;
pub mod csv_source;
pub mod analytics;
pub mod pipeline;
pub mod report;
pub mod config;

pub use symbol::{Symbol, SymbolError, DEFAULT_SYMBOL};
pub use time_series::{
    DataUnavailableError, DateRange, InMemoryPriceSource, PriceRecord, PriceSeries, PriceSource,
    SeriesError,
};
pub use yahoo_finance::{DownloaderConfig, YahooFinanceClient};
pub use csv_source::CsvPriceSource;
pub use analytics::{
    calculate_daily_returns,
    calculate_returns,
    verification_trace,
    ReturnRecord,
    ReturnSeries,
    SummaryStats,
    VerificationStep,
};
pub use pipeline::{analyze, fetch_price_series, run, RunError, RunReport};
pub use config::{Command, ConfigError, RunConfig};
