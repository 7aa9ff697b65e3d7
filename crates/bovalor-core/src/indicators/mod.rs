//! Valuation-indicator fetchers.
//!
//! Five independent per-ticker derivations over the provider surface:
//!
//! | Module | Output per ticker | On missing inputs |
//! |--------|-------------------|-------------------|
//! | [`graham`] | [`GrahamSeries`](crate::GrahamSeries) | entry omitted |
//! | [`price_earnings`] | `Option<f64>` | `null` |
//! | [`dividend_yield`] | `Option<f64>` | `null` |
//! | [`ebitda`] | [`EbitdaEntry`](ebitda::EbitdaEntry) | `null` pair members |
//! | [`price_book`] | `Option<f64>` | `null` |
//!
//! All five share one failure policy: a provider error for ticker A is
//! captured as a batch warning and degrades only A's entry, never the batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data_source::FetchError;
use crate::Ticker;

pub mod dividend_yield;
pub mod ebitda;
pub mod graham;
pub mod price_book;
pub mod price_earnings;

/// Result of one bulk indicator run: per-ticker values plus the non-fatal
/// warnings accumulated along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBatch<T> {
    pub values: BTreeMap<Ticker, T>,
    pub warnings: Vec<String>,
}

impl<T> IndicatorBatch<T> {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn warn_fetch(&mut self, ticker: &Ticker, error: &FetchError) {
        self.warnings
            .push(format!("{ticker}: {} ({})", error.message(), error.code()));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> Default for IndicatorBatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Field presence test shared by the ratio fetchers: a value participates in
/// a ratio only when present, finite, and non-zero. Zero prices and zero
/// earnings both read as "no data" upstream, so both degrade to null here.
pub(crate) fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_rejects_zero_and_non_finite() {
        assert_eq!(truthy(Some(2.5)), Some(2.5));
        assert_eq!(truthy(Some(-1.0)), Some(-1.0));
        assert_eq!(truthy(Some(0.0)), None);
        assert_eq!(truthy(Some(f64::NAN)), None);
        assert_eq!(truthy(Some(f64::INFINITY)), None);
        assert_eq!(truthy(None), None);
    }
}
