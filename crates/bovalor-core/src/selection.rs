//! Ticker selection and date-range filtering.
//!
//! Selectable tickers are the keys of the Graham batch: a ticker with no
//! intrinsic value has no chart to show, so it never appears in the picker.

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorBatch;
use crate::{GrahamSeries, Ticker, TradeDate};

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: TradeDate,
    pub end: TradeDate,
}

impl DateRange {
    pub fn new(start: TradeDate, end: TradeDate) -> Self {
        Self { start, end }
    }

    /// Single-day range anchored at `date`, the default the dashboard opens
    /// with at the series' latest trading day.
    pub fn single_day(date: TradeDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: TradeDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Ordered list of tickers eligible for selection.
pub fn selectable_tickers(graham: &IndicatorBatch<GrahamSeries>) -> Vec<Ticker> {
    graham.values.keys().cloned().collect()
}

/// Default range for a freshly selected ticker: its latest trading day.
///
/// Empty series have no anchor, so there is no default range.
pub fn default_range(graham: &GrahamSeries) -> Option<DateRange> {
    graham
        .series
        .latest()
        .map(|point| DateRange::single_day(point.date))
}

/// Slice the selected ticker's series to `range`.
///
/// A range that excludes every point, inverted ranges included, yields an
/// empty series rather than an error.
pub fn filter_series(graham: &GrahamSeries, range: DateRange) -> GrahamSeries {
    graham.restrict(range.start, range.end)
}
