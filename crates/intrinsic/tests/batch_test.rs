//! Batch runs over in-memory and on-disk providers.

use approx::assert_relative_eq;
use intrinsic::{
    BatchRunner, DcfPipeline, ErrorKind, ExportFormat, InMemoryProvider, JsonDirectoryProvider,
    RawStatements, StatementKind, ValuationConfig, read_tickers,
};
use rstest::rstest;
use std::fs;

fn company(symbol: &str, revenue: f64, shares: Option<f64>) -> RawStatements {
    RawStatements {
        name: Some(format!("{symbol} Limited")),
        current_price: Some(15.0),
        beta: Some(1.1),
        shares_outstanding: shares,
        ..RawStatements::new(symbol)
    }
    .with_line_item(
        StatementKind::IncomeStatement,
        "Total Revenue",
        [(2021, revenue), (2022, revenue * 1.05), (2023, revenue * 1.1025)],
    )
    .with_line_item(
        StatementKind::IncomeStatement,
        "EBIT",
        [(2021, revenue * 0.15), (2022, revenue * 0.16), (2023, revenue * 0.17)],
    )
    .with_line_item(StatementKind::BalanceSheet, "Total Debt", [(2023, revenue * 0.3)])
    .with_line_item(StatementKind::BalanceSheet, "Cash And Cash Equivalents", [(2023, revenue * 0.1)])
}

fn provider() -> InMemoryProvider {
    [
        company("AAA", 1000.0, Some(200.0)),
        company("BBB", 2500.0, Some(400.0)),
        company("CCC", 800.0, Some(90.0)),
        // No share count anywhere: equity cannot be divided.
        company("NOSH", 500.0, None),
        // Quote only, no income statement.
        RawStatements {
            current_price: Some(8.0),
            beta: Some(0.9),
            shares_outstanding: Some(50.0),
            ..RawStatements::new("BARE")
        },
    ]
    .into_iter()
    .collect()
}

#[rstest]
#[case::missing_ticker("ZZZ", ErrorKind::NotFound)]
#[case::zero_shares("NOSH", ErrorKind::DivideByZero)]
#[case::no_statements("BARE", ErrorKind::InsufficientData)]
fn test_single_failure_yields_n_minus_one_rows(#[case] bad: &str, #[case] kind: ErrorKind) {
    let runner = BatchRunner::new(provider(), DcfPipeline::default());
    let tickers = ["AAA", bad, "BBB", "CCC"];

    let outcome = runner.run(&tickers);

    assert_eq!(outcome.attempted(), 4);
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].ticker, bad);
    assert_eq!(outcome.failures[0].kind, kind);

    let symbols: Vec<&str> = outcome.results.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAA", "BBB", "CCC"]);
}

#[test]
fn test_duplicates_processed_independently() {
    let runner = BatchRunner::new(provider(), DcfPipeline::default());
    let outcome = runner.run(&["AAA", "BBB", "AAA"]);

    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.results[0], outcome.results[2]);
}

#[test]
fn test_results_match_direct_pipeline() {
    let pipeline = DcfPipeline::default();
    let direct = pipeline
        .value(&company("BBB", 2500.0, Some(400.0)))
        .unwrap();

    let outcome = BatchRunner::new(provider(), pipeline).run(&["BBB"]);
    assert_relative_eq!(outcome.results[0].prices.base, direct.prices.base);
}

#[test]
fn test_invalid_config_rejected_up_front() {
    let config = ValuationConfig {
        fade_start: 12,
        ..Default::default()
    };
    assert!(BatchRunner::with_config(provider(), config).is_err());
}

#[test]
fn test_directory_provider_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let statements = dir.path().join("statements");
    let store = JsonDirectoryProvider::new(&statements);
    fs::create_dir_all(&statements).unwrap();
    store.save(&company("AAA", 1000.0, Some(200.0))).unwrap();
    store.save(&company("CCC", 800.0, Some(90.0))).unwrap();

    let ticker_file = dir.path().join("tickers.csv");
    fs::write(&ticker_file, "Ticker,Sector\nAAA,Mining\n,\nMISSING,Banks\nCCC,Health\n").unwrap();
    let tickers = read_tickers(&ticker_file).unwrap();
    assert_eq!(tickers, vec!["AAA", "MISSING", "CCC"]);

    let outcome = BatchRunner::new(store, DcfPipeline::default()).run(&tickers);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.failures[0].kind, ErrorKind::NotFound);

    let out = dir.path().join("output");
    let written = outcome
        .into_table()
        .write_all(&out, ExportFormat::Csv)
        .unwrap();
    let wide = fs::read_to_string(&written[0]).unwrap();
    assert_eq!(wide.lines().count(), 3);
    assert!(wide.lines().nth(1).unwrap().starts_with("AAA,AAA Limited,15.0,"));
}
