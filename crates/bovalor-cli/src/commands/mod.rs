mod dashboard;
mod graham;
mod indicators;
mod universe;

use std::sync::Arc;
use std::time::{Duration, Instant};

use bovalor_core::adapters::YahooAdapter;
use bovalor_core::selection::DateRange;
use bovalor_core::{
    CacheMode, CacheStore, Envelope, EnvelopeError, EnvelopeMeta, HttpClient, MarketDataSource,
    NoopHttpClient, ReqwestHttpClient, Ticker, TradeDate,
};
use serde_json::Value;

use crate::cli::{Cli, Command, SeriesArgs};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Option<Value>,
    pub warnings: Vec<String>,
    pub error: Option<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn fail(error: EnvelopeError) -> Self {
        Self {
            data: None,
            warnings: Vec::new(),
            error: Some(error),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let http_client: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };

    let cache = if cli.cache_ttl_secs == 0 {
        CacheStore::disabled()
    } else {
        CacheStore::new(Duration::from_secs(cli.cache_ttl_secs))
    };

    let adapter =
        YahooAdapter::with_http_client(http_client).with_cache(cache.clone(), CacheMode::Use);
    let source_id = adapter.id();

    let started = Instant::now();
    let result = match &cli.command {
        Command::Universe => universe::run(cli)?,
        Command::Indicators(args) => indicators::run(cli, args, &adapter).await?,
        Command::Graham(args) => graham::run(args, &adapter).await?,
        Command::Dashboard(args) => dashboard::run(args, &adapter).await?,
    };
    let latency_ms = started.elapsed().as_millis() as u64;
    let cache_hit = cache.hit_count() > 0;

    let meta =
        EnvelopeMeta::new(source_id, latency_ms, cache_hit).with_warnings(result.warnings.clone());

    let envelope = match (result.data, result.error) {
        (_, Some(error)) => Envelope::failure(meta, error),
        (Some(data), None) => Envelope::success(meta, data),
        (None, None) => Envelope::success(meta, Value::Null),
    };

    Ok(envelope)
}

/// Parse one command-line ticker, suffixing bare codes.
pub(crate) fn parse_ticker(raw: &str) -> Result<Ticker, CliError> {
    Ticker::with_exchange_suffix(raw).map_err(CliError::from)
}

/// Parse an optional `--start`/`--end` pair into an inclusive range.
///
/// A lone bound extends to the history epoch (start) or today (end); both
/// absent means "let the series pick its default range".
pub(crate) fn parse_range(args: &SeriesArgs) -> Result<Option<DateRange>, CliError> {
    if args.start.is_none() && args.end.is_none() {
        return Ok(None);
    }

    let start = match &args.start {
        Some(raw) => TradeDate::parse(raw)?,
        None => TradeDate::parse(bovalor_core::HISTORY_EPOCH)?,
    };
    let end = match &args.end {
        Some(raw) => TradeDate::parse(raw)?,
        None => TradeDate::today(),
    };

    Ok(Some(DateRange::new(start, end)))
}
