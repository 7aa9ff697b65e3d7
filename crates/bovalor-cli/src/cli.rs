//! CLI argument definitions for Bovalor.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `universe` | Load and list the ticker universe |
//! | `indicators` | Run all five valuation fetchers over the universe |
//! | `graham` | Graham intrinsic-value series for one ticker |
//! | `dashboard` | Assembled chart rows and rated cards for one ticker |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--mock` | `false` | Serve deterministic offline data |
//! | `--cache-ttl-secs` | `900` | Response-cache TTL, 0 disables |
//! | `--universe-file` | `data/ibov.csv` | Reference file with company codes |
//!
//! # Examples
//!
//! ```bash
//! # List the loaded universe
//! bovalor universe
//!
//! # All indicators for the whole universe, offline
//! bovalor indicators --mock --pretty
//!
//! # One ticker's Graham chart over a date range
//! bovalor graham PETR4.SA --start 2024-01-01 --end 2024-03-31
//!
//! # Rated cards for one ticker
//! bovalor dashboard VALE3.SA --format table
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Bovalor - B3 fundamentals dashboard CLI
///
/// Fetches per-ticker fundamentals from Yahoo Finance, derives valuation
/// ratios (Graham number, P/E, dividend yield, EBITDA, P/B), and rates each
/// one against qualitative tier tables.
#[derive(Debug, Parser)]
#[command(
    name = "bovalor",
    author,
    version,
    about = "B3 fundamentals dashboard CLI"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Serve deterministic offline data instead of calling the provider.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Response-cache TTL in seconds; 0 disables caching.
    #[arg(long, global = true, default_value_t = 900)]
    pub cache_ttl_secs: u64,

    /// Reference file with the semicolon-delimited company-code column.
    #[arg(long, global = true, default_value = "data/ibov.csv")]
    pub universe_file: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the reference file and list the suffixed tickers.
    Universe,

    /// Run all five indicator fetchers and report values plus tiers.
    Indicators(IndicatorsArgs),

    /// Graham intrinsic-value series for one ticker.
    Graham(SeriesArgs),

    /// Assembled dashboard view (chart rows + rated cards) for one ticker.
    Dashboard(SeriesArgs),
}

#[derive(Debug, Args)]
pub struct IndicatorsArgs {
    /// Restrict the run to these tickers instead of the whole universe.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Ticker to select; bare codes get the `.SA` suffix appended.
    pub ticker: String,

    /// Range start (YYYY-MM-DD, inclusive). Defaults with --end absent to
    /// the series' latest trading day.
    #[arg(long)]
    pub start: Option<String>,

    /// Range end (YYYY-MM-DD, inclusive).
    #[arg(long)]
    pub end: Option<String>,
}
