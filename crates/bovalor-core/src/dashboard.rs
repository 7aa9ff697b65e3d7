//! Dashboard assembly: one ticker's chart rows plus its rated cards.

use serde::{Deserialize, Serialize};

use crate::data_source::{FetchError, MarketDataSource};
use crate::indicators::ebitda::EbitdaEntry;
use crate::indicators::{self, IndicatorBatch};
use crate::selection::{self, DateRange};
use crate::tiering::{
    dividend_yield_tier, ebitda_margin_tier, ebitda_tier, price_book_tier, price_earnings_tier,
    ColorClass, Tier,
};
use crate::{GrahamSeries, Ticker, TradeDate};

/// One plotted observation: the close and the constant intrinsic-value line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub date: TradeDate,
    pub close: f64,
    pub intrinsic_value: f64,
}

/// One color-coded summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub title: &'static str,
    pub value: Option<f64>,
    /// Rendered value, `"N/A"` when null.
    pub display: String,
    pub tier: Tier,
    pub color: ColorClass,
}

impl Card {
    fn new(title: &'static str, value: Option<f64>, tier: Tier) -> Self {
        let display = match value {
            Some(v) => format!("{v:.2}"),
            None => String::from("N/A"),
        };
        Self {
            title,
            value,
            display,
            tier,
            color: tier.color(),
        }
    }
}

/// Fully assembled view for one selected ticker and date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub ticker: Ticker,
    pub range: DateRange,
    pub intrinsic_value: f64,
    pub chart: Vec<ChartRow>,
    pub cards: Vec<Card>,
}

/// All indicator batches for one universe, loaded in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub graham: IndicatorBatch<GrahamSeries>,
    pub price_earnings: IndicatorBatch<Option<f64>>,
    pub dividend_yield: IndicatorBatch<Option<f64>>,
    pub ebitda: IndicatorBatch<EbitdaEntry>,
    pub price_book: IndicatorBatch<Option<f64>>,
}

impl DashboardData {
    /// Run all five indicator fetchers over `tickers`.
    ///
    /// The fetchers are independent; behind a shared cache the snapshot call
    /// for each ticker goes to the provider once.
    pub async fn load(source: &dyn MarketDataSource, tickers: &[Ticker]) -> Self {
        Self {
            graham: indicators::graham::fetch(source, tickers).await,
            price_earnings: indicators::price_earnings::fetch(source, tickers).await,
            dividend_yield: indicators::dividend_yield::fetch(source, tickers).await,
            ebitda: indicators::ebitda::fetch(source, tickers).await,
            price_book: indicators::price_book::fetch(source, tickers).await,
        }
    }

    /// Tickers eligible for selection.
    pub fn selectable_tickers(&self) -> Vec<Ticker> {
        selection::selectable_tickers(&self.graham)
    }

    /// Warnings from every batch, in fetcher order.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        warnings.extend(self.graham.warnings.iter().cloned());
        warnings.extend(self.price_earnings.warnings.iter().cloned());
        warnings.extend(self.dividend_yield.warnings.iter().cloned());
        warnings.extend(self.ebitda.warnings.iter().cloned());
        warnings.extend(self.price_book.warnings.iter().cloned());
        warnings
    }

    /// Assemble the view for `ticker`, restricted to `range` (or the default
    /// single-day range at the latest trading day).
    ///
    /// # Errors
    ///
    /// Fails when `ticker` is not selectable, which means it produced no
    /// Graham series in this batch.
    pub fn view(&self, ticker: &Ticker, range: Option<DateRange>) -> Result<DashboardView, FetchError> {
        let graham = self.graham.values.get(ticker).ok_or_else(|| {
            FetchError::invalid_request(format!("{ticker} is not selectable: no Graham series"))
        })?;

        let range = range
            .or_else(|| selection::default_range(graham))
            .unwrap_or_else(|| DateRange::single_day(TradeDate::today()));

        let filtered = selection::filter_series(graham, range);
        let chart = filtered
            .series
            .points()
            .iter()
            .map(|point| ChartRow {
                date: point.date,
                close: point.close,
                intrinsic_value: filtered.intrinsic_value,
            })
            .collect();

        let ebitda_entry = self.ebitda.values.get(ticker).copied().unwrap_or_default();

        let pe = self.price_earnings.values.get(ticker).copied().flatten();
        let dy = self.dividend_yield.values.get(ticker).copied().flatten();
        let pvp = self.price_book.values.get(ticker).copied().flatten();
        let margin_pct = ebitda_entry.margin.map(|m| m * 100.0);

        let cards = vec![
            Card::new("P/E", pe, price_earnings_tier(pe)),
            Card::new("Dividend Yield %", dy, dividend_yield_tier(dy)),
            Card::new("EBITDA", ebitda_entry.ebitda, ebitda_tier(ebitda_entry.ebitda)),
            Card::new(
                "EBITDA Margin %",
                margin_pct,
                ebitda_margin_tier(ebitda_entry.margin),
            ),
            Card::new("P/B", pvp, price_book_tier(pvp)),
        ];

        Ok(DashboardView {
            ticker: ticker.clone(),
            range,
            intrinsic_value: filtered.intrinsic_value,
            chart,
            cards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::YahooAdapter;
    use crate::data_source::FetchErrorKind;

    fn tickers(raw: &[&str]) -> Vec<Ticker> {
        raw.iter()
            .map(|t| Ticker::parse(t).expect("valid ticker"))
            .collect()
    }

    #[tokio::test]
    async fn assembles_chart_and_five_cards() {
        let adapter = YahooAdapter::default();
        let universe = tickers(&["PETR4.SA", "VALE3.SA"]);
        let data = DashboardData::load(&adapter, &universe).await;

        let selectable = data.selectable_tickers();
        let picked = selectable.first().expect("offline data yields selectables");

        let view = data.view(picked, None).expect("selectable ticker");

        assert_eq!(view.cards.len(), 5);
        // Default range is the latest trading day only.
        assert_eq!(view.chart.len(), 1);
        assert!(view.intrinsic_value > 0.0);
        for row in &view.chart {
            assert_eq!(row.intrinsic_value, view.intrinsic_value);
        }
    }

    #[tokio::test]
    async fn unselectable_ticker_is_an_invalid_request() {
        let adapter = YahooAdapter::default();
        let universe = tickers(&["PETR4.SA"]);
        let data = DashboardData::load(&adapter, &universe).await;

        let absent = Ticker::parse("ZZZZ99.SA").expect("valid ticker");
        let err = data.view(&absent, None).expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::InvalidRequest);
    }

    #[test]
    fn null_ratios_render_as_na_cards() {
        let card = Card::new("P/E", None, price_earnings_tier(None));

        assert_eq!(card.display, "N/A");
        assert_eq!(card.tier, Tier::Unavailable);
        assert_eq!(card.color, ColorClass::Neutral);
    }
}
