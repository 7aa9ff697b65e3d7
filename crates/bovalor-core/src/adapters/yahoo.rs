use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use time::Duration;

use crate::cache::{CacheMode, CacheStore};
use crate::data_source::{
    FetchError, HistoryRequest, HistoryWindow, MarketDataSource, SnapshotRequest,
};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::{
    FundamentalSnapshot, PricePoint, PriceSeries, ProviderId, Ticker, TradeDate, ValidationError,
};

/// Unix timestamp of [`crate::HISTORY_EPOCH`] (2000-01-01T00:00:00Z).
const HISTORY_EPOCH_UNIX: i64 = 946_684_800;

/// quoteSummary modules covering every snapshot field we extract.
const SNAPSHOT_MODULES: &str = "defaultKeyStatistics,financialData,summaryDetail,price";

// ============================================================================
// Yahoo auth manager - cookie/crumb session handling
// ============================================================================

/// Manages Yahoo Finance cookie/crumb authentication.
///
/// Yahoo's unofficial API requires a session cookie from fc.yahoo.com plus a
/// crumb token from the getcrumb endpoint; both are cached with a TTL.
#[derive(Clone)]
pub struct YahooAuthManager {
    crumb: Arc<std::sync::Mutex<Option<String>>>,
    last_refresh: Arc<std::sync::Mutex<Option<Instant>>>,
    refreshing: Arc<AtomicBool>,
    auth_ttl_secs: u64,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: Arc::new(std::sync::Mutex::new(None)),
            last_refresh: Arc::new(std::sync::Mutex::new(None)),
            refreshing: Arc::new(AtomicBool::new(false)),
            auth_ttl_secs: 3600,
        }
    }
}

impl YahooAuthManager {
    fn is_auth_valid(&self) -> bool {
        let crumb = self.crumb.lock().expect("crumb lock");
        let last_refresh = self.last_refresh.lock().expect("refresh lock");

        if crumb.is_none() {
            return false;
        }

        last_refresh
            .map(|last| last.elapsed().as_secs() < self.auth_ttl_secs)
            .unwrap_or(false)
    }

    /// Current crumb for use in query parameters, refreshing if needed.
    pub async fn get_crumb(
        &self,
        http_client: &Arc<dyn HttpClient>,
    ) -> Result<String, FetchError> {
        if self.is_auth_valid() {
            if let Some(crumb) = self.crumb.lock().expect("crumb lock").clone() {
                return Ok(crumb);
            }
        }

        self.refresh_auth(http_client).await?;

        let crumb = self.crumb.lock().expect("crumb lock").clone();
        crumb.ok_or_else(|| FetchError::unavailable("failed to obtain Yahoo crumb"))
    }

    async fn refresh_auth(&self, http_client: &Arc<dyn HttpClient>) -> Result<(), FetchError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            // Another task is refreshing; give it a moment.
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            if self.is_auth_valid() {
                return Ok(());
            }
        }

        let result = self.do_refresh(http_client).await;
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    async fn do_refresh(&self, http_client: &Arc<dyn HttpClient>) -> Result<(), FetchError> {
        // Step 1: visit fc.yahoo.com so the cookie jar picks up a session.
        let cookie_request = HttpRequest::get("https://fc.yahoo.com")
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(10_000);

        let _ = http_client.execute(cookie_request).await.map_err(|e| {
            FetchError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
        })?;

        // Step 2: fetch a crumb token.
        let crumb_endpoints = [
            "https://query1.finance.yahoo.com/v1/test/getcrumb",
            "https://query2.finance.yahoo.com/v1/test/getcrumb",
        ];

        for endpoint in &crumb_endpoints {
            let crumb_request = HttpRequest::get(*endpoint)
                .with_header("referer", "https://finance.yahoo.com/")
                .with_timeout_ms(10_000);

            match http_client.execute(crumb_request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    let body = response.body.trim();

                    if body.contains("<html") || body.contains("<!DOCTYPE") {
                        continue;
                    }

                    if body.to_lowercase().contains("too many requests") {
                        return Err(FetchError::rate_limited(
                            "Yahoo rate limited while fetching crumb",
                        ));
                    }

                    if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                        *self.crumb.lock().expect("crumb lock") = Some(body.to_string());
                        *self.last_refresh.lock().expect("refresh lock") = Some(Instant::now());
                        return Ok(());
                    }
                }
                _ => continue,
            }
        }

        Err(FetchError::unavailable(
            "failed to fetch Yahoo crumb from all endpoints",
        ))
    }

    /// Invalidate cached auth (triggers refresh on next call).
    pub fn invalidate(&self) {
        *self.crumb.lock().expect("crumb lock") = None;
        *self.last_refresh.lock().expect("refresh lock") = None;
    }
}

// ============================================================================
// Yahoo adapter
// ============================================================================

/// Yahoo Finance adapter with a deterministic offline mode.
///
/// With a real transport it queries the quoteSummary and chart endpoints;
/// with a mock transport it serves data seeded by the ticker bytes so tests
/// and `--mock` runs are reproducible.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    cache: CacheStore,
    cache_mode: CacheMode,
    auth_manager: Arc<YahooAuthManager>,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            cache: CacheStore::with_default_ttl(),
            cache_mode: CacheMode::Use,
            auth_manager: Arc::new(YahooAuthManager::default()),
            use_real_api: false,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, cache: CacheStore, cache_mode: CacheMode) -> Self {
        self.cache = cache;
        self.cache_mode = cache_mode;
        self
    }

    fn is_real_client(&self) -> bool {
        self.use_real_api
    }

    /// Fetch `endpoint` through the response cache.
    ///
    /// The cache key is the endpoint without the crumb, so entries survive
    /// session refreshes; the crumb is appended only on the wire.
    async fn fetch_body(&self, cache_key: &str) -> Result<String, FetchError> {
        if self.cache_mode == CacheMode::Use {
            if let Some(body) = self.cache.get(cache_key).await {
                return Ok(body);
            }
        }

        let crumb = self.auth_manager.get_crumb(&self.http_client).await?;
        let body = self.fetch_with_auth_retry(cache_key, &crumb).await?;

        if self.cache_mode != CacheMode::Bypass {
            self.cache.put(cache_key.to_string(), body.clone()).await;
        }

        Ok(body)
    }

    /// Execute one GET, refreshing the crumb and retrying once on 401/429.
    async fn fetch_with_auth_retry(
        &self,
        endpoint: &str,
        crumb: &str,
    ) -> Result<String, FetchError> {
        let url = append_crumb(endpoint, crumb);
        let request = HttpRequest::get(url)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(10_000);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| FetchError::unavailable(format!("yahoo transport error: {}", e.message())))?;

        if response.status == 401 || response.status == 429 {
            self.auth_manager.invalidate();
            let fresh_crumb = self.auth_manager.get_crumb(&self.http_client).await?;

            let retry_request = HttpRequest::get(append_crumb(endpoint, &fresh_crumb))
                .with_header("referer", "https://finance.yahoo.com/")
                .with_timeout_ms(10_000);

            let retry_response = self.http_client.execute(retry_request).await.map_err(|e| {
                FetchError::unavailable(format!("yahoo transport error on retry: {}", e.message()))
            })?;

            if retry_response.status == 429 {
                return Err(FetchError::rate_limited(
                    "yahoo rate limited after auth refresh",
                ));
            }
            if !retry_response.is_success() {
                return Err(FetchError::unavailable(format!(
                    "yahoo returned status {} after auth refresh",
                    retry_response.status
                )));
            }

            return Ok(retry_response.body);
        }

        if !response.is_success() {
            return Err(FetchError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

impl MarketDataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        if self.is_real_client() {
            ProviderId::Yahoo
        } else {
            ProviderId::Offline
        }
    }

    fn snapshot<'a>(
        &'a self,
        req: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FundamentalSnapshot, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_snapshot(&req.ticker).await
            } else {
                fake_snapshot(&req.ticker)
            }
        })
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_history(&req.ticker, req.window).await
            } else {
                fake_history(&req.ticker, req.window)
            }
        })
    }
}

// Real API implementation
impl YahooAdapter {
    async fn fetch_real_snapshot(&self, ticker: &Ticker) -> Result<FundamentalSnapshot, FetchError> {
        let endpoint = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}",
            urlencoding::encode(ticker.as_str()),
            SNAPSHOT_MODULES,
        );

        let body = self.fetch_body(&endpoint).await?;
        parse_snapshot_response(ticker, &body)
    }

    async fn fetch_real_history(
        &self,
        ticker: &Ticker,
        window: HistoryWindow,
    ) -> Result<PriceSeries, FetchError> {
        let range_params = match window {
            HistoryWindow::FullDaily => format!("period1={HISTORY_EPOCH_UNIX}&period2=9999999999"),
            HistoryWindow::LastMonth => String::from("range=1mo"),
        };

        let endpoint = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?{}&interval=1d",
            urlencoding::encode(ticker.as_str()),
            range_params,
        );

        let body = self.fetch_body(&endpoint).await?;
        parse_chart_response(ticker, &body)
    }
}

fn append_crumb(endpoint: &str, crumb: &str) -> String {
    format!("{endpoint}&crumb={}", urlencoding::encode(crumb))
}

fn parse_snapshot_response(ticker: &Ticker, body: &str) -> Result<FundamentalSnapshot, FetchError> {
    let parsed: YahooQuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::internal(format!("failed to parse yahoo quoteSummary: {e}")))?;

    if let Some(error) = &parsed.quote_summary.error {
        if !error.is_null() {
            return Err(FetchError::unavailable(format!("yahoo API error: {error}")));
        }
    }

    let result = parsed
        .quote_summary
        .result
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::unavailable("yahoo returned no quoteSummary result"))?;

    let key_stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let summary = result.summary_detail.unwrap_or_default();
    let price = result.price.unwrap_or_default();

    FundamentalSnapshot::new(
        ticker.clone(),
        TradeDate::today(),
        raw(key_stats.trailing_eps),
        raw(key_stats.book_value),
        raw(summary.dividend_rate),
        raw(financial.current_price),
        raw(financial.total_revenue),
        raw(financial.ebitda_margins),
        raw(price.regular_market_price),
    )
    .map_err(validation_to_error)
}

fn parse_chart_response(ticker: &Ticker, body: &str) -> Result<PriceSeries, FetchError> {
    let parsed: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = &parsed.chart.error {
        if !error.is_null() {
            return Err(FetchError::unavailable(format!(
                "yahoo chart API error: {error}"
            )));
        }
    }

    let result = match parsed.chart.result.first() {
        Some(result) => result,
        // Thin listings come back with an empty result array.
        None => return Ok(PriceSeries::empty(ticker.clone())),
    };

    let timestamps = result.timestamp.as_deref().unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or_default();

    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
    for (index, &ts) in timestamps.iter().enumerate() {
        let Some(Some(close)) = closes.get(index) else {
            continue;
        };

        let date = TradeDate::from_unix_timestamp(ts).map_err(validation_to_error)?;

        // Daily bars can repeat a date when the last bar is the live session;
        // keep the most recent close for that day.
        match points.last_mut() {
            Some(last) if last.date == date => last.close = *close,
            _ => points.push(PricePoint::new(date, *close).map_err(validation_to_error)?),
        }
    }

    PriceSeries::new(ticker.clone(), points).map_err(validation_to_error)
}

fn raw(value: Option<YahooRawValue>) -> Option<f64> {
    value.and_then(|v| v.to_option())
}

fn validation_to_error(error: ValidationError) -> FetchError {
    FetchError::internal(error.to_string())
}

// ============================================================================
// Deterministic offline data
// ============================================================================

fn fake_snapshot(ticker: &Ticker) -> Result<FundamentalSnapshot, FetchError> {
    let seed = ticker_seed(ticker);
    let price = 18.0 + (seed % 420) as f64 / 10.0;

    // Every third ticker has no earnings on file, every fifth pays no
    // dividend; this keeps the null paths exercised end to end.
    let trailing_eps = if seed % 3 == 0 {
        None
    } else {
        Some(0.8 + (seed % 70) as f64 / 10.0)
    };
    let dividend_rate = if seed % 5 == 0 {
        None
    } else {
        Some((seed % 35) as f64 / 10.0)
    };

    FundamentalSnapshot::new(
        ticker.clone(),
        TradeDate::today(),
        trailing_eps,
        Some(6.0 + (seed % 240) as f64 / 10.0),
        dividend_rate,
        Some(price),
        Some(2_000_000_000.0 + (seed % 900) as f64 * 10_000_000.0),
        Some(0.06 + (seed % 32) as f64 / 100.0),
        Some(price),
    )
    .map_err(validation_to_error)
}

fn fake_history(ticker: &Ticker, window: HistoryWindow) -> Result<PriceSeries, FetchError> {
    let seed = ticker_seed(ticker);
    let days = match window {
        HistoryWindow::FullDaily => 240,
        HistoryWindow::LastMonth => 22,
    };

    let today = TradeDate::today().into_inner();
    let base = 15.0 + (seed % 250) as f64 / 10.0;
    let mut points = Vec::with_capacity(days);

    for index in 0..days {
        let offset = Duration::days((days - 1 - index) as i64);
        let date = TradeDate::from(today - offset);
        let wiggle = ((seed + index as u64) % 90) as f64 / 30.0;
        points.push(PricePoint::new(date, base + wiggle).map_err(validation_to_error)?);
    }

    PriceSeries::new(ticker.clone(), points).map_err(validation_to_error)
}

fn ticker_seed(ticker: &Ticker) -> u64 {
    // The multiplier must be coprime to the residue moduli used in
    // fake_snapshot (3 and 5), or the shared ".SA" suffix would pin every
    // ticker to the same residue class.
    ticker.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(31).wrapping_add(byte as u64)
    })
}

// ============================================================================
// Yahoo API response structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Vec<YahooQuoteSummaryResult>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResult {
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<YahooKeyStatistics>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<YahooFinancialData>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<YahooSummaryDetail>,
    #[serde(default)]
    price: Option<YahooPriceModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooKeyStatistics {
    #[serde(rename = "trailingEps", default)]
    trailing_eps: Option<YahooRawValue>,
    #[serde(rename = "bookValue", default)]
    book_value: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooFinancialData {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<YahooRawValue>,
    #[serde(rename = "totalRevenue", default)]
    total_revenue: Option<YahooRawValue>,
    #[serde(rename = "ebitdaMargins", default)]
    ebitda_margins: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooSummaryDetail {
    #[serde(rename = "dividendRate", default)]
    dividend_rate: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooPriceModule {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<YahooRawValue>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Vec<YahooChartResult>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    close: Vec<Option<f64>>,
}

/// Yahoo wraps numeric values in `{raw, fmt}` objects; only `raw` matters,
/// and NaN counts as absent.
#[derive(Debug, Clone, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl YahooRawValue {
    fn to_option(&self) -> Option<f64> {
        self.raw.filter(|v| !v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(raw: &str) -> Ticker {
        Ticker::parse(raw).expect("valid ticker")
    }

    #[tokio::test]
    async fn offline_snapshot_is_deterministic() {
        let adapter = YahooAdapter::default();
        let first = adapter
            .snapshot(SnapshotRequest::new(ticker("PETR4.SA")))
            .await
            .expect("snapshot");
        let second = adapter
            .snapshot(SnapshotRequest::new(ticker("PETR4.SA")))
            .await
            .expect("snapshot");

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn offline_data_spreads_absent_eps_and_dividends_across_tickers() {
        let adapter = YahooAdapter::default();
        let symbols = ["AAAA.SA", "AAAB.SA", "AAAC.SA", "AAAD.SA", "AAAE.SA", "AAAF.SA"];

        let mut eps = Vec::new();
        let mut dividends = Vec::new();
        for symbol in symbols {
            let snapshot = adapter
                .snapshot(SnapshotRequest::new(ticker(symbol)))
                .await
                .expect("snapshot");
            eps.push(snapshot.trailing_eps);
            dividends.push(snapshot.dividend_rate);
        }

        // The suffix all tickers share must not collapse the residue
        // classes: a small universe has to contain both branches.
        assert!(eps.iter().any(Option::is_none));
        assert!(eps.iter().any(Option::is_some));
        assert!(dividends.iter().any(Option::is_none));
        assert!(dividends.iter().any(Option::is_some));
    }

    #[tokio::test]
    async fn offline_history_is_date_ascending() {
        let adapter = YahooAdapter::default();
        let series = adapter
            .history(HistoryRequest::new(ticker("VALE3.SA"), HistoryWindow::LastMonth))
            .await
            .expect("history");

        assert_eq!(series.len(), 22);
        for pair in series.points().windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn parses_quote_summary_payload() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "defaultKeyStatistics": {
                        "trailingEps": {"raw": 2.0, "fmt": "2.00"},
                        "bookValue": {"raw": 18.0, "fmt": "18.00"}
                    },
                    "financialData": {
                        "currentPrice": {"raw": 31.4},
                        "totalRevenue": {"raw": 500000000.0},
                        "ebitdaMargins": {"raw": 0.32}
                    },
                    "summaryDetail": {
                        "dividendRate": {"raw": 1.5}
                    },
                    "price": {
                        "regularMarketPrice": {"raw": 31.4}
                    }
                }],
                "error": null
            }
        }"#;

        let snapshot = parse_snapshot_response(&ticker("PETR4.SA"), body).expect("must parse");
        assert_eq!(snapshot.trailing_eps, Some(2.0));
        assert_eq!(snapshot.book_value, Some(18.0));
        assert_eq!(snapshot.ebitda_margins, Some(0.32));
        assert_eq!(snapshot.regular_market_price, Some(31.4));
    }

    #[test]
    fn missing_modules_become_absent_fields() {
        let body = r#"{"quoteSummary": {"result": [{}], "error": null}}"#;
        let snapshot = parse_snapshot_response(&ticker("PETR4.SA"), body).expect("must parse");

        assert_eq!(snapshot.trailing_eps, None);
        assert_eq!(snapshot.total_revenue, None);
    }

    #[test]
    fn chart_payload_skips_null_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {"quote": [{"close": [30.0, null, 31.5]}]}
                }],
                "error": null
            }
        }"#;

        let series = parse_chart_response(&ticker("PETR4.SA"), body).expect("must parse");
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_close(), Some(31.5));
    }

    #[test]
    fn empty_chart_result_is_empty_series_not_error() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        let series = parse_chart_response(&ticker("XPTO3.SA"), body).expect("must parse");
        assert!(series.is_empty());
    }

    #[test]
    fn chart_api_error_surfaces_as_unavailable() {
        let body = r#"{"chart": {"result": [], "error": "No data found"}}"#;
        let err = parse_chart_response(&ticker("XPTO3.SA"), body).expect_err("must fail");
        assert_eq!(err.kind(), crate::data_source::FetchErrorKind::Unavailable);
    }
}
