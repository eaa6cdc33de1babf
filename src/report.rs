//! Console rendering of run results.
//!
//! Functions here only build strings; the binary decides where they go.

use crate::analytics::RETURN_FORMULA;
use crate::config::ConfigError;
use crate::pipeline::{RunError, RunReport};
use crate::symbol::Symbol;
use crate::time_series::DataUnavailableError;
use std::fmt;

/// Rows shown in the "Recent Daily Returns" table.
pub const RECENT_ROWS: usize = 10;

const RULE_WIDTH: usize = 60;

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

/// Formats a fraction as a percentage with four decimals (`0.1` → `10.0000%`).
pub fn format_percent(value: f64) -> String {
    format!("{:.4}%", value * 100.0)
}

/// Banner printed before the fetch starts.
pub fn render_fetch_banner(symbol: &Symbol, provider: &str) -> String {
    format!("Fetching {} data from {}...\n{}\n", symbol, provider, rule('-'))
}

/// Full report for a successful run.
pub fn render_report(report: &RunReport) -> String {
    report.to_string()
}

impl fmt::Display for RunReport {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self;
        writeln!(
            out,
            "Successfully fetched {} days of {} data",
            report.prices.len(),
            report.symbol
        )?;
        if let Some(span) = report.prices.date_span() {
            writeln!(out, "Date range: {}", span)?;
        }
        writeln!(out)?;

        writeln!(out, "Daily Returns Calculation:")?;
        writeln!(out, "{}", rule('='))?;
        writeln!(out, "Formula: {}", RETURN_FORMULA)?;
        writeln!(out)?;

        writeln!(out, "Recent Daily Returns:")?;
        writeln!(out, "{}", rule('-'))?;
        if report.returns.is_empty() {
            writeln!(out, "(no returns: fewer than two prices)")?;
        } else {
            writeln!(out, "Date")?;
            for record in report.returns.tail(RECENT_ROWS) {
                writeln!(out, "{}    {:>10.6}", record.date, record.value)?;
            }
        }
        writeln!(out)?;

        let stats = &report.summary;
        writeln!(out, "Summary Statistics:")?;
        writeln!(out, "{}", rule('-'))?;
        writeln!(out, "Total trading days: {}", stats.count)?;
        writeln!(out, "Average daily return: {}", format_percent(stats.mean))?;
        writeln!(out, "Standard deviation: {}", format_percent(stats.std_dev))?;
        writeln!(out, "Minimum daily return: {}", format_percent(stats.min))?;
        writeln!(out, "Maximum daily return: {}", format_percent(stats.max))?;
        writeln!(out)?;

        writeln!(out, "First {} Days Calculation (for verification):", report.trace.len())?;
        writeln!(out, "{}", rule('-'))?;
        for step in &report.trace {
            writeln!(out, "Date: {}", step.date)?;
            writeln!(out, "  Price_t: ${:.2}", step.price_t)?;
            writeln!(out, "  Price_t-1: ${:.2}", step.price_t_minus_1)?;
            writeln!(
                out,
                "  Return = ({:.2} / {:.2}) - 1 = {}",
                step.price_t,
                step.price_t_minus_1,
                format_percent(step.value)
            )?;
            writeln!(out)?;
        }

        Ok(())
    }
}

/// Suggested fix for a failed run, by error kind.
pub fn remediation_hint(error: &RunError) -> &'static str {
    match error {
        RunError::DataUnavailable(
            DataUnavailableError::Network(_)
            | DataUnavailableError::Api(_)
            | DataUnavailableError::ClientCreation(_),
        ) => "Check your network connection; the data provider may be unreachable or rate limiting requests.",
        RunError::DataUnavailable(
            DataUnavailableError::InvalidSymbol(_)
            | DataUnavailableError::Empty { .. }
            | DataUnavailableError::InvalidDateRange(_),
        ) => "Check the symbol and date range (--symbol, --start, --end).",
        RunError::DataUnavailable(DataUnavailableError::Parse(_) | DataUnavailableError::Io(_)) => {
            "Check that the price data has Date and Close columns (or retry the provider later)."
        }
        RunError::InvalidSeries(_) => {
            "The price data is not in strictly increasing date order; check the source data."
        }
    }
}

/// Error message plus remediation hint.
pub fn render_error(error: &RunError) -> String {
    format!("Error: {}\n\n{}\n", error, remediation_hint(error))
}

/// Error message plus usage text for bad command-line arguments.
pub fn render_config_error(error: &ConfigError, usage: &str) -> String {
    format!("Error: {}\n\n{}", error, usage)
}
