//! EBITDA value and raw EBITDA margin per ticker.

use serde::{Deserialize, Serialize};

use crate::data_source::{MarketDataSource, SnapshotRequest};
use crate::Ticker;

use super::{truthy, IndicatorBatch};

/// Derived EBITDA paired with the raw margin it came from.
///
/// The margin is recorded even when the derived value is null, so the
/// margin card can render independently of the revenue field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EbitdaEntry {
    pub ebitda: Option<f64>,
    pub margin: Option<f64>,
}

/// Fetch `(total_revenue / 100) * ebitda_margins` for every ticker.
///
/// The `/ 100` scaling matches the reference derivation this dashboard
/// reproduces; the value is comparative, not an accounting figure.
pub async fn fetch(
    source: &dyn MarketDataSource,
    tickers: &[Ticker],
) -> IndicatorBatch<EbitdaEntry> {
    let mut batch = IndicatorBatch::new();

    for ticker in tickers {
        let entry = match source.snapshot(SnapshotRequest::new(ticker.clone())).await {
            Ok(snapshot) => {
                let ebitda = match (
                    truthy(snapshot.total_revenue),
                    truthy(snapshot.ebitda_margins),
                ) {
                    (Some(revenue), Some(margin)) => Some((revenue / 100.0) * margin),
                    _ => None,
                };

                EbitdaEntry {
                    ebitda,
                    margin: snapshot.ebitda_margins,
                }
            }
            Err(error) => {
                batch.warn_fetch(ticker, &error);
                EbitdaEntry::default()
            }
        };

        batch.values.insert(ticker.clone(), entry);
    }

    batch
}
