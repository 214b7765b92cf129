//! CLI argument definitions for tickwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `watchlist` | Show, add or remove watched symbols |
//! | `portfolio` | Show, open or close positions with profit/loss |
//! | `alerts` | Show, set or clear price alerts |
//! | `series` | Latest daily closes for one symbol |
//! | `quote` | Resolve ad-hoc tickers |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--store` | `tickwatch.json` | Ownership document path |
//! | `--user` | `default` | Whose records to read and change |
//! | `--concurrency` | provider policy | Max provider calls in flight |
//! | `--timeout-ms` | `5000` | Per provider call timeout |
//! | `--request-timeout-ms` | none | Deadline for a whole batch |
//! | `--fixtures` | none | Answer from a fixture file instead of Alpha Vantage |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-format` | `text` | Log format on stderr |
//!
//! # Examples
//!
//! ```bash
//! tickwatch watchlist add AAPL
//! tickwatch portfolio open AAPL --quantity 10 --price 100
//! tickwatch alerts set TSLA --target 150
//! tickwatch portfolio --pretty
//! tickwatch series IBM --limit 5
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

/// Watchlist, portfolio and price alerts enriched with latest daily closes.
#[derive(Debug, Parser)]
#[command(
    name = "tickwatch",
    author,
    version,
    about = "Watchlist, portfolio and price alerts with latest daily closes"
)]
pub struct Cli {
    /// Path of the JSON ownership document.
    #[arg(long, global = true, default_value = "tickwatch.json")]
    pub store: PathBuf,

    /// User whose records are read and changed.
    #[arg(long, global = true, default_value = "default")]
    pub user: String,

    /// Maximum number of provider calls in flight.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Timeout for each provider call in milliseconds.
    #[arg(long, global = true, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Deadline for a whole batch in milliseconds.
    #[arg(long, global = true)]
    pub request_timeout_ms: Option<u64>,

    /// Serve prices from a fixture file instead of Alpha Vantage.
    #[arg(long, global = true)]
    pub fixtures: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log format on stderr. Verbosity follows `RUST_LOG`.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watched symbols with their latest price.
    Watchlist(WatchlistArgs),
    /// Positions with current price and profit/loss.
    Portfolio(PortfolioArgs),
    /// Price alerts and whether they fired.
    Alerts(AlertsArgs),
    /// Latest daily closes for one symbol.
    Series(SeriesArgs),
    /// Resolve tickers without touching the store.
    Quote(QuoteArgs),
}

#[derive(Debug, Args)]
pub struct WatchlistArgs {
    #[command(subcommand)]
    pub command: Option<WatchlistCommand>,
}

#[derive(Debug, Subcommand)]
pub enum WatchlistCommand {
    Show,
    Add { symbol: String },
    Remove { symbol: String },
}

#[derive(Debug, Args)]
pub struct PortfolioArgs {
    #[command(subcommand)]
    pub command: Option<PortfolioCommand>,
}

#[derive(Debug, Subcommand)]
pub enum PortfolioCommand {
    Show,
    Open {
        symbol: String,
        /// Number of shares; must be positive.
        #[arg(long)]
        quantity: Decimal,
        /// Purchase price per share.
        #[arg(long)]
        price: Decimal,
    },
    Close { symbol: String },
}

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: Option<AlertsCommand>,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    Show,
    Set {
        symbol: String,
        /// Fire once the price is at or above this value.
        #[arg(long)]
        target: Decimal,
    },
    Clear { symbol: String },
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    pub symbol: String,

    /// Number of most recent closes to return.
    #[arg(long, default_value_t = 30)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    #[arg(required = true)]
    pub symbols: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_portfolio_open_with_decimals() {
        let cli = Cli::try_parse_from([
            "tickwatch",
            "--user",
            "alice",
            "portfolio",
            "open",
            "AAPL",
            "--quantity",
            "10",
            "--price",
            "100.25",
        ])
        .expect("valid arguments");

        assert_eq!(cli.user, "alice");
        match cli.command {
            Command::Portfolio(PortfolioArgs {
                command: Some(PortfolioCommand::Open { symbol, quantity, price }),
            }) => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(quantity, dec!(10));
                assert_eq!(price, dec!(100.25));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn bare_collection_command_means_show() {
        let cli = Cli::try_parse_from(["tickwatch", "alerts", "--pretty"]).expect("valid arguments");
        assert!(cli.pretty);
        assert!(matches!(cli.command, Command::Alerts(AlertsArgs { command: None })));
    }

    #[test]
    fn quote_requires_a_symbol() {
        assert!(Cli::try_parse_from(["tickwatch", "quote"]).is_err());
    }
}
