//! Canonical domain types for bovalor market data.
//!
//! All models validate their invariants at construction time and carry full
//! serde support:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated exchange symbol with `.SA` suffix handling |
//! | [`TradeDate`] | Calendar date of a trading day |
//! | [`PricePoint`] | One daily close observation |
//! | [`PriceSeries`] | Date-ascending close series per ticker |
//! | [`FundamentalSnapshot`] | Provider metadata fields, all optional |
//! | [`GrahamSeries`] | Price series plus constant Graham intrinsic value |

mod date;
mod models;
mod ticker;

pub use date::TradeDate;
pub use models::{
    FundamentalSnapshot, GrahamSeries, PricePoint, PriceSeries, GRAHAM_MULTIPLIER,
};
pub use ticker::{Ticker, EXCHANGE_SUFFIX};
