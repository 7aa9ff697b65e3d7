//! Market-data source trait and request types.
//!
//! The provider seam for the indicator engine: one synchronous-looking query
//! surface per ticker, implemented by adapters over boxed futures.
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | Snapshot | [`SnapshotRequest`] | [`FundamentalSnapshot`] |
//! | History | [`HistoryRequest`] | [`PriceSeries`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{FundamentalSnapshot, PriceSeries, ProviderId, Ticker};

/// Earliest date requested for full daily history.
pub const HISTORY_EPOCH: &str = "2000-01-01";

/// Classification of per-ticker provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured per-ticker fetch error.
///
/// These are never fatal for a batch: the indicator layer records them as
/// warnings and degrades the affected ticker's entry to null/omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Unavailable => "fetch.unavailable",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::InvalidRequest => "fetch.invalid_request",
            FetchErrorKind::Internal => "fetch.internal",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Request payload for the per-ticker fundamentals snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub ticker: Ticker,
}

impl SnapshotRequest {
    pub fn new(ticker: Ticker) -> Self {
        Self { ticker }
    }
}

/// Price-history window per ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryWindow {
    /// Daily closes from [`HISTORY_EPOCH`] to the present.
    FullDaily,
    /// Daily closes over the most recent month.
    LastMonth,
}

impl HistoryWindow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullDaily => "full_daily",
            Self::LastMonth => "last_month",
        }
    }
}

/// Request payload for the per-ticker close history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub ticker: Ticker,
    pub window: HistoryWindow,
}

impl HistoryRequest {
    pub fn new(ticker: Ticker, window: HistoryWindow) -> Self {
        Self { ticker, window }
    }
}

/// Provider adapter contract.
///
/// Implementations must be `Send + Sync`; both queries are idempotent per
/// argument tuple, which is what lets the response cache stand in for the
/// original program's memoization.
pub trait MarketDataSource: Send + Sync {
    /// Unique provider identifier for envelopes and warnings.
    fn id(&self) -> ProviderId;

    /// Fetch the fundamentals metadata snapshot for one ticker.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the provider is unreachable, rate limits
    /// the call, or responds with an unparsable payload. A snapshot with all
    /// fields `None` is a valid success, not an error.
    fn snapshot<'a>(
        &'a self,
        req: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FundamentalSnapshot, FetchError>> + Send + 'a>>;

    /// Fetch the daily closing-price history for one ticker.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport or payload failures. An empty
    /// series is a valid success: thin listings simply have no data in the
    /// window.
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>>;
}
