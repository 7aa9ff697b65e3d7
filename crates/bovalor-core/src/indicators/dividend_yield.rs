//! Dividend yield per ticker, as a percentage of current price.

use crate::data_source::{MarketDataSource, SnapshotRequest};
use crate::Ticker;

use super::IndicatorBatch;

/// Fetch `(dividend_rate / current_price) * 100` for every ticker.
///
/// Absent fields default to zero, and a zero price yields null rather than a
/// division. Provider failures null the affected ticker and continue, the
/// same containment the other ratio fetchers apply.
pub async fn fetch(
    source: &dyn MarketDataSource,
    tickers: &[Ticker],
) -> IndicatorBatch<Option<f64>> {
    let mut batch = IndicatorBatch::new();

    for ticker in tickers {
        let value = match source.snapshot(SnapshotRequest::new(ticker.clone())).await {
            Ok(snapshot) => {
                let rate = snapshot.dividend_rate.unwrap_or(0.0);
                let price = snapshot.current_price.unwrap_or(0.0);

                if price > 0.0 {
                    Some((rate / price) * 100.0)
                } else {
                    None
                }
            }
            Err(error) => {
                batch.warn_fetch(ticker, &error);
                None
            }
        };

        batch.values.insert(ticker.clone(), value);
    }

    batch
}
