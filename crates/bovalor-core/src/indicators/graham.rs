//! Graham intrinsic-value series per ticker.
//!
//! For each ticker the full daily close history is paired with
//! `sqrt(22.5 * eps * book_value)`. Tickers whose earnings or book value are
//! absent or non-positive, or whose history is empty, are omitted from the
//! batch rather than mapped to null: a Graham chart with no intrinsic value
//! line has nothing to show.

use crate::data_source::{HistoryRequest, HistoryWindow, MarketDataSource, SnapshotRequest};
use crate::{GrahamSeries, Ticker};

use super::IndicatorBatch;

/// Fetch Graham series for every ticker in `tickers`.
///
/// Per-ticker provider failures become batch warnings; the failing ticker is
/// skipped and the rest of the batch proceeds.
pub async fn fetch(
    source: &dyn MarketDataSource,
    tickers: &[Ticker],
) -> IndicatorBatch<GrahamSeries> {
    let mut batch = IndicatorBatch::new();

    for ticker in tickers {
        let snapshot = match source.snapshot(SnapshotRequest::new(ticker.clone())).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                batch.warn_fetch(ticker, &error);
                continue;
            }
        };

        let series = match source
            .history(HistoryRequest::new(ticker.clone(), HistoryWindow::FullDaily))
            .await
        {
            Ok(series) => series,
            Err(error) => {
                batch.warn_fetch(ticker, &error);
                continue;
            }
        };

        if series.is_empty() {
            continue;
        }

        let (Some(eps), Some(book_value)) = (snapshot.trailing_eps, snapshot.book_value) else {
            continue;
        };

        // Non-positive inputs fail GrahamSeries validation; that is the
        // omission path, not a batch error.
        if let Ok(graham) = GrahamSeries::new(series, eps, book_value) {
            batch.values.insert(ticker.clone(), graham);
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::YahooAdapter;

    fn tickers(raw: &[&str]) -> Vec<Ticker> {
        raw.iter()
            .map(|t| Ticker::parse(t).expect("valid ticker"))
            .collect()
    }

    #[tokio::test]
    async fn result_keys_are_a_subset_of_the_input() {
        let adapter = YahooAdapter::default();
        let input = tickers(&["PETR4.SA", "VALE3.SA", "ITUB4.SA"]);

        let batch = fetch(&adapter, &input).await;

        for ticker in batch.values.keys() {
            assert!(input.contains(ticker));
        }
    }

    #[tokio::test]
    async fn intrinsic_value_is_constant_and_positive() {
        let adapter = YahooAdapter::default();
        let input = tickers(&["VALE3.SA"]);

        let batch = fetch(&adapter, &input).await;
        let graham = batch.values.get(&input[0]).expect("offline data has eps");

        assert!(graham.intrinsic_value > 0.0);
        assert!(!graham.series.is_empty());
    }

    #[tokio::test]
    async fn fetching_twice_is_idempotent() {
        let adapter = YahooAdapter::default();
        let input = tickers(&["PETR4.SA", "VALE3.SA"]);

        let first = fetch(&adapter, &input).await;
        let second = fetch(&adapter, &input).await;

        assert_eq!(first, second);
    }
}
