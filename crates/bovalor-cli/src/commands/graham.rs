use bovalor_core::indicators::graham;
use bovalor_core::selection;
use bovalor_core::{EnvelopeError, FetchError, MarketDataSource, Ticker, TradeDate};
use serde::Serialize;

use crate::cli::SeriesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct GrahamRow {
    date: TradeDate,
    close: f64,
}

#[derive(Debug, Serialize)]
struct GrahamResponseData {
    ticker: Ticker,
    intrinsic_value: f64,
    rows: Vec<GrahamRow>,
}

pub async fn run(
    args: &SeriesArgs,
    source: &dyn MarketDataSource,
) -> Result<CommandResult, CliError> {
    let ticker = super::parse_ticker(&args.ticker)?;
    let range = super::parse_range(args)?;

    let batch = graham::fetch(source, std::slice::from_ref(&ticker)).await;
    let warnings = batch.warnings.clone();

    let Some(series) = batch.values.get(&ticker) else {
        let error = FetchError::invalid_request(format!(
            "{ticker} has no Graham series: earnings or book value missing or non-positive"
        ));
        return Ok(CommandResult::fail(EnvelopeError::from(&error)).with_warnings(warnings));
    };

    let range = range.or_else(|| selection::default_range(series));
    let filtered = match range {
        Some(range) => selection::filter_series(series, range),
        None => series.clone(),
    };

    let data = serde_json::to_value(GrahamResponseData {
        ticker: ticker.clone(),
        intrinsic_value: filtered.intrinsic_value,
        rows: filtered
            .series
            .points()
            .iter()
            .map(|point| GrahamRow {
                date: point.date,
                close: point.close,
            })
            .collect(),
    })?;

    Ok(CommandResult::ok(data).with_warnings(warnings))
}
