//! Run configuration parsed from command-line arguments.

use crate::symbol::{Symbol, SymbolError};
use crate::time_series::{DataUnavailableError, DateRange};
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: daily-returns [OPTIONS]

Options:
  --symbol <SYMBOL>    Instrument to fetch (default: SPY)
  --start <YYYY-MM-DD> First date, inclusive (default: 365 days before end)
  --end <YYYY-MM-DD>   Last date, inclusive (default: today)
  --csv <PATH>         Read prices from a CSV file instead of Yahoo Finance
  -h, --help           Print this help
";

/// Settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunConfig {
    pub symbol: Symbol,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Offline price file; `None` means fetch from Yahoo Finance
    pub csv_path: Option<PathBuf>,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunConfig),
    Help,
}

impl RunConfig {
    /// Parses arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Command, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = RunConfig::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            // Accept both `--flag value` and `--flag=value`
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };

            match flag.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--symbol" | "--start" | "--end" | "--csv" => {
                    let value = match inline {
                        Some(value) => value,
                        None => args.next().ok_or_else(|| ConfigError::MissingValue(flag.clone()))?,
                    };
                    match flag.as_str() {
                        "--symbol" => config.symbol = Symbol::new(value)?,
                        "--start" => config.start = Some(parse_date(&flag, &value)?),
                        "--end" => config.end = Some(parse_date(&flag, &value)?),
                        _ => config.csv_path = Some(PathBuf::from(value)),
                    }
                }
                _ => return Err(ConfigError::UnknownArgument(flag)),
            }
        }

        Ok(Command::Run(config))
    }

    /// Resolves the requested range against `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange, DataUnavailableError> {
        DateRange::resolve(self.start, self.end, today)
    }
}

fn parse_date(flag: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

/// Errors in command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownArgument(String),
    MissingValue(String),
    InvalidDate { flag: String, value: String },
    InvalidSymbol(SymbolError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownArgument(arg) => write!(f, "Unknown argument: {}", arg),
            ConfigError::MissingValue(flag) => write!(f, "Missing value for {}", flag),
            ConfigError::InvalidDate { flag, value } => {
                write!(f, "Invalid date for {}: '{}' (expected YYYY-MM-DD)", flag, value)
            }
            ConfigError::InvalidSymbol(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<SymbolError> for ConfigError {
    fn from(e: SymbolError) -> Self {
        ConfigError::InvalidSymbol(e)
    }
}
