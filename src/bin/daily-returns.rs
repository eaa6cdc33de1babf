//! Daily returns report
//!
//! Run with: `cargo run --bin daily-returns -- [--symbol SPY] [--start YYYY-MM-DD] [--end YYYY-MM-DD]`
//!
//! Diagnostics go to stderr. Set RUST_LOG to control them:
//!   RUST_LOG=debug cargo run --bin daily-returns
//!
//! Every outcome, failures included, exits with status 0.

use chrono::{Local, NaiveDate};
use daily_returns::config::{Command, RunConfig, USAGE};
use daily_returns::report::{render_config_error, render_error, render_fetch_banner, render_report};
use daily_returns::{run, CsvPriceSource, PriceSource, RunError, YahooFinanceClient};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = match RunConfig::parse(std::env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            print!("{}", USAGE);
            return;
        }
        Err(e) => {
            print!("{}", render_config_error(&e, USAGE));
            return;
        }
    };

    // Default end date is resolved here, once per run
    let today = Local::now().date_naive();

    match &config.csv_path {
        Some(path) => execute(&CsvPriceSource::new(path.clone()), &config, today).await,
        None => match YahooFinanceClient::new() {
            Ok(client) => execute(&client, &config, today).await,
            Err(e) => print!("{}", render_error(&RunError::from(e))),
        },
    }
}

async fn execute<S: PriceSource>(source: &S, config: &RunConfig, today: NaiveDate) {
    print!("{}", render_fetch_banner(&config.symbol, source.name()));

    let result = match config.date_range(today) {
        Ok(range) => run(source, &config.symbol, &range).await,
        Err(e) => Err(RunError::from(e)),
    };

    match result {
        Ok(report) => print!("{}", render_report(&report)),
        Err(e) => {
            debug!(error = ?e, "run failed");
            print!("{}", render_error(&e));
        }
    }
}
