//! Price/Earnings ratio per ticker.

use crate::data_source::{HistoryRequest, HistoryWindow, MarketDataSource, SnapshotRequest};
use crate::Ticker;

use super::{truthy, IndicatorBatch};

/// Fetch `last_close / trailing_eps` for every ticker.
///
/// The price is the last available close over the most recent month; an
/// empty history or a close of exactly zero reads as "price absent" and the
/// ratio degrades to null. Provider failures null the affected ticker and
/// leave the rest of the batch intact.
pub async fn fetch(
    source: &dyn MarketDataSource,
    tickers: &[Ticker],
) -> IndicatorBatch<Option<f64>> {
    let mut batch = IndicatorBatch::new();

    for ticker in tickers {
        let value = compute(source, ticker, &mut batch).await;
        batch.values.insert(ticker.clone(), value);
    }

    batch
}

async fn compute(
    source: &dyn MarketDataSource,
    ticker: &Ticker,
    batch: &mut IndicatorBatch<Option<f64>>,
) -> Option<f64> {
    let snapshot = match source.snapshot(SnapshotRequest::new(ticker.clone())).await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            batch.warn_fetch(ticker, &error);
            return None;
        }
    };

    let eps = truthy(snapshot.trailing_eps)?;

    let series = match source
        .history(HistoryRequest::new(ticker.clone(), HistoryWindow::LastMonth))
        .await
    {
        Ok(series) => series,
        Err(error) => {
            batch.warn_fetch(ticker, &error);
            return None;
        }
    };

    let last_close = series.last_close()?;
    Some(last_close / eps)
}
