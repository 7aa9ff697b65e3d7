//! Price/Book ratio per ticker.

use crate::data_source::{MarketDataSource, SnapshotRequest};
use crate::Ticker;

use super::{truthy, IndicatorBatch};

/// Fetch `regular_market_price / book_value` for every ticker, null when
/// either side is absent or zero.
pub async fn fetch(
    source: &dyn MarketDataSource,
    tickers: &[Ticker],
) -> IndicatorBatch<Option<f64>> {
    let mut batch = IndicatorBatch::new();

    for ticker in tickers {
        let value = match source.snapshot(SnapshotRequest::new(ticker.clone())).await {
            Ok(snapshot) => match (
                truthy(snapshot.regular_market_price),
                truthy(snapshot.book_value),
            ) {
                (Some(price), Some(book_value)) => Some(price / book_value),
                _ => None,
            },
            Err(error) => {
                batch.warn_fetch(ticker, &error);
                None
            }
        };

        batch.values.insert(ticker.clone(), value);
    }

    batch
}
