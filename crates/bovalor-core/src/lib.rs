//! # Bovalor Core
//!
//! Core contracts and valuation logic for the Bovalor fundamentals dashboard.
//!
//! ## Overview
//!
//! This crate provides the foundational components for Bovalor:
//!
//! - **Canonical domain models** for tickers, price series, fundamentals, and
//!   Graham intrinsic-value series
//! - **Universe loading** from the semicolon-delimited B3 reference file
//! - **Market-data source trait** with a Yahoo Finance adapter and a
//!   deterministic offline mode
//! - **TTL response cache** keyed by the full request URL
//! - **Indicator fetchers** for P/E, dividend yield, EBITDA, and P/B, with
//!   per-ticker failure isolation
//! - **Tiering** of every ratio into color-coded qualitative bands
//! - **Dashboard assembly** producing chart rows and rated cards
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance) |
//! | [`cache`] | TTL response cache |
//! | [`dashboard`] | View assembly: chart rows plus rated cards |
//! | [`data_source`] | Market-data trait and request/error types |
//! | [`domain`] | Domain models (Ticker, TradeDate, series, snapshot) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`indicators`] | The five valuation fetchers |
//! | [`selection`] | Ticker selection and date-range filtering |
//! | [`source`] | Provider identifiers |
//! | [`tiering`] | Ratio-to-tier classification |
//! | [`universe`] | Reference-file ticker loading |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bovalor_core::adapters::YahooAdapter;
//! use bovalor_core::dashboard::DashboardData;
//! use bovalor_core::Ticker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = YahooAdapter::default();
//!     let universe = vec![Ticker::parse("PETR4.SA")?];
//!
//!     let data = DashboardData::load(&adapter, &universe).await;
//!     let picked = data.selectable_tickers().first().cloned().unwrap();
//!     let view = data.view(&picked, None)?;
//!
//!     for card in &view.cards {
//!         println!("{}: {} ({})", card.title, card.display, card.tier);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod selection;
pub mod source;
pub mod tiering;
pub mod universe;

pub use cache::{CacheMode, CacheStore, DEFAULT_TTL};
pub use data_source::{
    FetchError, FetchErrorKind, HistoryRequest, HistoryWindow, MarketDataSource, SnapshotRequest,
    HISTORY_EPOCH,
};
pub use domain::{
    FundamentalSnapshot, GrahamSeries, PricePoint, PriceSeries, Ticker, TradeDate,
    EXCHANGE_SUFFIX, GRAHAM_MULTIPLIER,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CoreError, UniverseError, ValidationError};
pub use http_client::{HttpClient, NoopHttpClient, ReqwestHttpClient};
pub use source::ProviderId;
