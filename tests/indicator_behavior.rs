//! Behavior-driven tests for the five valuation fetchers.
//!
//! These tests verify HOW the indicator layer derives ratios from provider
//! data: null propagation, per-ticker failure isolation, and the exact
//! arithmetic of each derivation.

use bovalor_core::data_source::{FetchError, HistoryWindow};
use bovalor_core::indicators::{dividend_yield, ebitda, graham, price_book, price_earnings};
use bovalor_core::Ticker;

use bovalor_tests::{series, ticker, SnapshotFields, StaticSource};

fn universe(symbols: &[&str]) -> Vec<Ticker> {
    symbols.iter().map(|s| ticker(s)).collect()
}

// =============================================================================
// Graham fetcher
// =============================================================================

#[tokio::test]
async fn when_eps_and_book_value_are_positive_graham_number_matches_the_formula() {
    // Given: a ticker with eps 2.0 and book value 18.0
    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(2.0),
                book_value: Some(18.0),
                ..Default::default()
            }
            .build("PETR4.SA"),
        )
        .with_history_all(series("PETR4.SA", &[("2024-01-02", 30.0), ("2024-01-03", 31.0)]));

    // When: the Graham fetcher runs
    let batch = graham::fetch(&source, &universe(&["PETR4.SA"])).await;

    // Then: the intrinsic value is sqrt(22.5 * 2 * 18) = sqrt(810)
    let graham = batch.values.get(&ticker("PETR4.SA")).expect("present");
    assert!((graham.intrinsic_value - 810.0_f64.sqrt()).abs() < 1e-9);
    assert!((graham.intrinsic_value - 28.46).abs() < 0.01);
}

#[tokio::test]
async fn when_eps_is_non_positive_the_ticker_is_omitted_not_nulled() {
    // Given: one healthy ticker and one with negative earnings
    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(2.0),
                book_value: Some(18.0),
                ..Default::default()
            }
            .build("PETR4.SA"),
        )
        .with_history_all(series("PETR4.SA", &[("2024-01-02", 30.0)]))
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(-1.5),
                book_value: Some(18.0),
                ..Default::default()
            }
            .build("VALE3.SA"),
        )
        .with_history_all(series("VALE3.SA", &[("2024-01-02", 60.0)]));

    // When: the Graham fetcher runs over both
    let batch = graham::fetch(&source, &universe(&["PETR4.SA", "VALE3.SA"])).await;

    // Then: the loss-maker is absent, the other is untouched
    assert!(batch.values.contains_key(&ticker("PETR4.SA")));
    assert!(!batch.values.contains_key(&ticker("VALE3.SA")));
}

#[tokio::test]
async fn when_history_is_empty_the_ticker_is_omitted() {
    use bovalor_core::PriceSeries;

    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(2.0),
                book_value: Some(18.0),
                ..Default::default()
            }
            .build("XPTO3.SA"),
        )
        .with_history(HistoryWindow::FullDaily, PriceSeries::empty(ticker("XPTO3.SA")));

    let batch = graham::fetch(&source, &universe(&["XPTO3.SA"])).await;

    assert!(batch.values.is_empty());
    assert!(batch.warnings.is_empty());
}

// =============================================================================
// P/E fetcher
// =============================================================================

#[tokio::test]
async fn when_eps_and_close_are_present_pe_is_last_close_over_eps() {
    // Given: eps 2.0 and a month of closes ending at 25.0
    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(2.0),
                ..Default::default()
            }
            .build("PETR4.SA"),
        )
        .with_history(
            HistoryWindow::LastMonth,
            series("PETR4.SA", &[("2024-01-02", 24.0), ("2024-01-03", 25.0)]),
        );

    // When
    let batch = price_earnings::fetch(&source, &universe(&["PETR4.SA"])).await;

    // Then: pe = 25.0 / 2.0
    assert_eq!(batch.values[&ticker("PETR4.SA")], Some(12.5));
}

#[tokio::test]
async fn when_last_close_is_zero_pe_is_null_not_a_division() {
    // Given: a suspended listing whose last close is exactly zero
    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(2.0),
                ..Default::default()
            }
            .build("PETR4.SA"),
        )
        .with_history(
            HistoryWindow::LastMonth,
            series("PETR4.SA", &[("2024-01-02", 0.0)]),
        );

    let batch = price_earnings::fetch(&source, &universe(&["PETR4.SA"])).await;

    assert_eq!(batch.values[&ticker("PETR4.SA")], None);
}

#[tokio::test]
async fn when_history_is_empty_pe_is_null_not_an_error() {
    use bovalor_core::PriceSeries;

    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(2.0),
                ..Default::default()
            }
            .build("PETR4.SA"),
        )
        .with_history(HistoryWindow::LastMonth, PriceSeries::empty(ticker("PETR4.SA")));

    let batch = price_earnings::fetch(&source, &universe(&["PETR4.SA"])).await;

    assert_eq!(batch.values[&ticker("PETR4.SA")], None);
    assert!(batch.warnings.is_empty());
}

// =============================================================================
// Dividend yield fetcher
// =============================================================================

#[tokio::test]
async fn when_price_is_positive_yield_is_rate_over_price_as_percentage() {
    let source = StaticSource::new().with_snapshot(
        SnapshotFields {
            dividend_rate: Some(4.0),
            current_price: Some(50.0),
            ..Default::default()
        }
        .build("PETR4.SA"),
    );

    let batch = dividend_yield::fetch(&source, &universe(&["PETR4.SA"])).await;

    assert_eq!(batch.values[&ticker("PETR4.SA")], Some(8.0));
}

#[tokio::test]
async fn when_price_is_zero_yield_is_null_not_a_division_error() {
    // Given: dividendRate 4 but no price
    let source = StaticSource::new().with_snapshot(
        SnapshotFields {
            dividend_rate: Some(4.0),
            current_price: Some(0.0),
            ..Default::default()
        }
        .build("PETR4.SA"),
    );

    let batch = dividend_yield::fetch(&source, &universe(&["PETR4.SA"])).await;

    assert_eq!(batch.values[&ticker("PETR4.SA")], None);
}

#[tokio::test]
async fn when_a_yield_fetch_fails_the_batch_survives_with_a_warning() {
    // Given: one failing and one healthy ticker
    let source = StaticSource::new()
        .failing_snapshot("BAD1.SA", FetchError::unavailable("timeout"))
        .with_snapshot(
            SnapshotFields {
                dividend_rate: Some(2.0),
                current_price: Some(40.0),
                ..Default::default()
            }
            .build("PETR4.SA"),
        );

    // When
    let batch = dividend_yield::fetch(&source, &universe(&["BAD1.SA", "PETR4.SA"])).await;

    // Then: the failure is contained to its own ticker
    assert_eq!(batch.values[&ticker("BAD1.SA")], None);
    assert_eq!(batch.values[&ticker("PETR4.SA")], Some(5.0));
    assert_eq!(batch.warnings.len(), 1);
    assert!(batch.warnings[0].contains("BAD1.SA"));
}

// =============================================================================
// EBITDA fetcher
// =============================================================================

#[tokio::test]
async fn when_revenue_and_margin_are_present_ebitda_is_scaled_revenue_times_margin() {
    let source = StaticSource::new().with_snapshot(
        SnapshotFields {
            total_revenue: Some(500_000_000.0),
            ebitda_margins: Some(0.32),
            ..Default::default()
        }
        .build("PETR4.SA"),
    );

    let batch = ebitda::fetch(&source, &universe(&["PETR4.SA"])).await;

    let entry = batch.values[&ticker("PETR4.SA")];
    assert_eq!(entry.ebitda, Some(500_000_000.0 / 100.0 * 0.32));
    assert_eq!(entry.margin, Some(0.32));
}

#[tokio::test]
async fn when_revenue_is_missing_the_margin_is_still_recorded() {
    let source = StaticSource::new().with_snapshot(
        SnapshotFields {
            ebitda_margins: Some(0.18),
            ..Default::default()
        }
        .build("PETR4.SA"),
    );

    let batch = ebitda::fetch(&source, &universe(&["PETR4.SA"])).await;

    let entry = batch.values[&ticker("PETR4.SA")];
    assert_eq!(entry.ebitda, None);
    assert_eq!(entry.margin, Some(0.18));
}

// =============================================================================
// P/B fetcher
// =============================================================================

#[tokio::test]
async fn when_price_and_book_value_are_present_pvp_is_their_ratio() {
    let source = StaticSource::new().with_snapshot(
        SnapshotFields {
            regular_market_price: Some(27.0),
            book_value: Some(18.0),
            ..Default::default()
        }
        .build("PETR4.SA"),
    );

    let batch = price_book::fetch(&source, &universe(&["PETR4.SA"])).await;

    assert_eq!(batch.values[&ticker("PETR4.SA")], Some(1.5));
}

#[tokio::test]
async fn when_book_value_is_zero_pvp_is_null() {
    let source = StaticSource::new().with_snapshot(
        SnapshotFields {
            regular_market_price: Some(27.0),
            book_value: Some(0.0),
            ..Default::default()
        }
        .build("PETR4.SA"),
    );

    let batch = price_book::fetch(&source, &universe(&["PETR4.SA"])).await;

    assert_eq!(batch.values[&ticker("PETR4.SA")], None);
}

// =============================================================================
// Cross-fetcher invariants
// =============================================================================

#[tokio::test]
async fn every_fetcher_returns_keys_that_are_a_subset_of_the_input() {
    // Given: a universe where one ticker has no scripted data at all
    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(1.0),
                book_value: Some(10.0),
                dividend_rate: Some(1.0),
                current_price: Some(20.0),
                total_revenue: Some(1_000_000.0),
                ebitda_margins: Some(0.2),
                regular_market_price: Some(20.0),
            }
            .build("PETR4.SA"),
        )
        .with_history_all(series("PETR4.SA", &[("2024-01-02", 20.0)]));
    let input = universe(&["PETR4.SA", "GHOST3.SA"]);

    // When: every fetcher runs
    let graham = graham::fetch(&source, &input).await;
    let pe = price_earnings::fetch(&source, &input).await;
    let dy = dividend_yield::fetch(&source, &input).await;
    let eb = ebitda::fetch(&source, &input).await;
    let pb = price_book::fetch(&source, &input).await;

    // Then: no fetcher invents tickers
    for key in graham.values.keys() {
        assert!(input.contains(key));
    }
    for batch_keys in [pe.values.keys(), dy.values.keys(), pb.values.keys()] {
        for key in batch_keys {
            assert!(input.contains(key));
        }
    }
    for key in eb.values.keys() {
        assert!(input.contains(key));
    }

    // And: the null-producing fetchers cover the full universe
    assert_eq!(pe.values.len(), input.len());
    assert_eq!(dy.values.len(), input.len());
    assert_eq!(eb.values.len(), input.len());
    assert_eq!(pb.values.len(), input.len());
}

#[tokio::test]
async fn fetching_twice_with_unchanged_data_yields_identical_results() {
    let source = StaticSource::new()
        .with_snapshot(
            SnapshotFields {
                trailing_eps: Some(2.0),
                book_value: Some(18.0),
                regular_market_price: Some(27.0),
                ..Default::default()
            }
            .build("PETR4.SA"),
        )
        .with_history_all(series("PETR4.SA", &[("2024-01-02", 30.0)]));
    let input = universe(&["PETR4.SA"]);

    let first = graham::fetch(&source, &input).await;
    let second = graham::fetch(&source, &input).await;
    assert_eq!(first, second);

    let first = price_book::fetch(&source, &input).await;
    let second = price_book::fetch(&source, &input).await;
    assert_eq!(first, second);
}
