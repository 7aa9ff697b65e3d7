use std::collections::BTreeMap;

use bovalor_core::dashboard::DashboardData;
use bovalor_core::tiering::{
    dividend_yield_tier, ebitda_margin_tier, ebitda_tier, price_book_tier, price_earnings_tier,
    Tier,
};
use bovalor_core::{universe, MarketDataSource, Ticker};
use serde::Serialize;

use crate::cli::{Cli, IndicatorsArgs};
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct RatedValue {
    value: Option<f64>,
    tier: Tier,
}

#[derive(Debug, Serialize)]
struct TickerIndicators {
    graham_number: Option<f64>,
    price_earnings: RatedValue,
    dividend_yield: RatedValue,
    ebitda: RatedValue,
    ebitda_margin: RatedValue,
    price_book: RatedValue,
}

#[derive(Debug, Serialize)]
struct IndicatorsResponseData {
    tickers: BTreeMap<Ticker, TickerIndicators>,
    selectable: Vec<Ticker>,
}

pub async fn run(
    cli: &Cli,
    args: &IndicatorsArgs,
    source: &dyn MarketDataSource,
) -> Result<CommandResult, CliError> {
    let tickers = if args.tickers.is_empty() {
        universe::load(&cli.universe_file)?
    } else {
        args.tickers
            .iter()
            .map(|raw| super::parse_ticker(raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    let data = DashboardData::load(source, &tickers).await;
    let warnings = data.warnings();

    let mut rated = BTreeMap::new();
    for ticker in &tickers {
        let pe = data.price_earnings.values.get(ticker).copied().flatten();
        let dy = data.dividend_yield.values.get(ticker).copied().flatten();
        let pvp = data.price_book.values.get(ticker).copied().flatten();
        let ebitda = data.ebitda.values.get(ticker).copied().unwrap_or_default();

        rated.insert(
            ticker.clone(),
            TickerIndicators {
                graham_number: data
                    .graham
                    .values
                    .get(ticker)
                    .map(|graham| graham.intrinsic_value),
                price_earnings: RatedValue {
                    value: pe,
                    tier: price_earnings_tier(pe),
                },
                dividend_yield: RatedValue {
                    value: dy,
                    tier: dividend_yield_tier(dy),
                },
                ebitda: RatedValue {
                    value: ebitda.ebitda,
                    tier: ebitda_tier(ebitda.ebitda),
                },
                ebitda_margin: RatedValue {
                    value: ebitda.margin.map(|m| m * 100.0),
                    tier: ebitda_margin_tier(ebitda.margin),
                },
                price_book: RatedValue {
                    value: pvp,
                    tier: price_book_tier(pvp),
                },
            },
        );
    }

    let response = IndicatorsResponseData {
        tickers: rated,
        selectable: data.selectable_tickers(),
    };

    Ok(CommandResult::ok(serde_json::to_value(response)?).with_warnings(warnings))
}
