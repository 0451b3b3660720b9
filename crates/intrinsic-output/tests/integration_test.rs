//! Integration tests from valuation results to exported tables.

use intrinsic_data::{RawStatements, StatementKind};
use intrinsic_model::DcfPipeline;
use intrinsic_output::{ExportFormat, Exporter, FailureRow, ResultTable, WIDE_HEADER};

fn company(symbol: &str, revenue: f64) -> RawStatements {
    RawStatements {
        name: Some(format!("{symbol} Holdings")),
        current_price: Some(12.5),
        beta: Some(0.9),
        shares_outstanding: Some(250.0),
        ..RawStatements::new(symbol)
    }
    .with_line_item(
        StatementKind::IncomeStatement,
        "Total Revenue",
        [(2022, revenue), (2023, revenue * 1.06), (2024, revenue * 1.12)],
    )
    .with_line_item(
        StatementKind::IncomeStatement,
        "Operating Income",
        [(2022, revenue * 0.18), (2023, revenue * 0.19), (2024, revenue * 0.20)],
    )
}

#[test]
fn test_pipeline_results_export() {
    let pipeline = DcfPipeline::default();
    let results = ["AAA", "BBB"]
        .iter()
        .enumerate()
        .map(|(i, s)| pipeline.value(&company(s, 500.0 * (i + 1) as f64)).unwrap())
        .collect();
    let table = ResultTable::new(
        results,
        vec![FailureRow {
            ticker: "CCC".to_string(),
            kind: "NotFound".to_string(),
            message: "Symbol not found: CCC".to_string(),
        }],
    );

    let csv = table.export_to_string(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], WIDE_HEADER.join(","));
    assert!(lines[1].starts_with("AAA,AAA Holdings,12.5,"));
    assert!(lines[2].starts_with("BBB,BBB Holdings,12.5,"));
    assert_eq!(lines.len(), 3);

    let df = table.to_dataframe().unwrap();
    assert_eq!(df.height(), 2);

    let dir = tempfile::tempdir().unwrap();
    let written = table.write_all(dir.path(), ExportFormat::Json).unwrap();
    assert!(written.iter().all(|p| p.extension().is_some_and(|e| e == "json")));

    let failures = std::fs::read_to_string(&written[3]).unwrap();
    assert!(failures.contains("CCC"));
}
