use serde::{Deserialize, Serialize};

use crate::{Ticker, TradeDate, ValidationError};

/// Multiplier from Benjamin Graham's intrinsic-value formula:
/// a ceiling P/E of 15 times a ceiling P/B of 1.5.
pub const GRAHAM_MULTIPLIER: f64 = 22.5;

/// One daily closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradeDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: TradeDate, close: f64) -> Result<Self, ValidationError> {
        validate_non_negative("close", close)?;
        Ok(Self { date, close })
    }
}

/// Per-ticker closing-price series, ordered by date ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: Ticker,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from date-ascending points.
    pub fn new(ticker: Ticker, points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        for pair in points.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(ValidationError::UnorderedSeries);
            }
        }
        Ok(Self { ticker, points })
    }

    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Last available close, with a close of exactly zero treated as absent.
    pub fn last_close(&self) -> Option<f64> {
        self.latest().map(|p| p.close).filter(|c| *c != 0.0)
    }

    /// Restrict to the inclusive date range `[start, end]`.
    ///
    /// An inverted range or a range outside the series span yields an empty,
    /// valid series rather than an error.
    pub fn restrict(&self, start: TradeDate, end: TradeDate) -> Self {
        let points = self
            .points
            .iter()
            .filter(|point| point.date >= start && point.date <= end)
            .copied()
            .collect();

        Self {
            ticker: self.ticker.clone(),
            points,
        }
    }
}

/// Per-ticker fundamentals snapshot as returned by the provider.
///
/// Fields the provider omits or returns as non-numeric are `None`; the
/// indicator layer decides what absence means for each ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub ticker: Ticker,
    pub as_of: TradeDate,
    pub trailing_eps: Option<f64>,
    pub book_value: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub current_price: Option<f64>,
    pub total_revenue: Option<f64>,
    pub ebitda_margins: Option<f64>,
    pub regular_market_price: Option<f64>,
}

impl FundamentalSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: Ticker,
        as_of: TradeDate,
        trailing_eps: Option<f64>,
        book_value: Option<f64>,
        dividend_rate: Option<f64>,
        current_price: Option<f64>,
        total_revenue: Option<f64>,
        ebitda_margins: Option<f64>,
        regular_market_price: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_finite("trailing_eps", trailing_eps)?;
        validate_optional_finite("book_value", book_value)?;
        validate_optional_non_negative("dividend_rate", dividend_rate)?;
        validate_optional_non_negative("current_price", current_price)?;
        validate_optional_finite("total_revenue", total_revenue)?;
        validate_optional_finite("ebitda_margins", ebitda_margins)?;
        validate_optional_non_negative("regular_market_price", regular_market_price)?;

        Ok(Self {
            ticker,
            as_of,
            trailing_eps,
            book_value,
            dividend_rate,
            current_price,
            total_revenue,
            ebitda_margins,
            regular_market_price,
        })
    }
}

/// Closing-price series annotated with a constant Graham intrinsic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrahamSeries {
    pub series: PriceSeries,
    pub intrinsic_value: f64,
}

impl GrahamSeries {
    /// Compute `sqrt(22.5 * eps * book_value)` and attach it to the series.
    ///
    /// Valid only for strictly positive eps and book value.
    pub fn new(series: PriceSeries, eps: f64, book_value: f64) -> Result<Self, ValidationError> {
        if !eps.is_finite() || !book_value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "eps" });
        }
        if eps <= 0.0 || book_value <= 0.0 {
            return Err(ValidationError::NonPositiveGrahamInputs);
        }

        Ok(Self {
            series,
            intrinsic_value: (GRAHAM_MULTIPLIER * eps * book_value).sqrt(),
        })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.series.ticker
    }

    /// Restrict the underlying series, keeping the intrinsic value.
    pub fn restrict(&self, start: TradeDate, end: TradeDate) -> Self {
        Self {
            series: self.series.restrict(start, end),
            intrinsic_value: self.intrinsic_value,
        }
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}
