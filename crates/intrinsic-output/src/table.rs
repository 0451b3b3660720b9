//! Aggregated batch results.

use crate::export::{
    DetailRow, ExportError, ExportFormat, Exporter, FailureRow, LongRow, WideRow,
};
use chrono::{DateTime, Utc};
use intrinsic_model::ValuationResult;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base file name of the wide table.
pub const WIDE_FILE: &str = "dcf_results_scenarios_wide";
/// Base file name of the long table.
pub const LONG_FILE: &str = "dcf_results_scenarios_long";
/// Base file name of the detail table.
pub const DETAILS_FILE: &str = "dcf_results_base_details";
/// Base file name of the failure table.
pub const FAILURES_FILE: &str = "dcf_results_failures";

/// Results of one batch run, in input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultTable {
    /// When the table was produced.
    pub generated_at: DateTime<Utc>,

    /// Valued tickers.
    pub results: Vec<ValuationResult>,

    /// Tickers that could not be valued.
    pub failures: Vec<FailureRow>,
}

impl ResultTable {
    /// Create a table stamped with the current time.
    pub fn new(results: Vec<ValuationResult>, failures: Vec<FailureRow>) -> Self {
        Self {
            generated_at: Utc::now(),
            results,
            failures,
        }
    }

    /// Number of valued tickers.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no ticker was valued.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// One row per ticker.
    pub fn wide_rows(&self) -> Vec<WideRow> {
        self.results.iter().map(WideRow::from).collect()
    }

    /// One row per ticker and scenario.
    pub fn long_rows(&self) -> Vec<LongRow> {
        LongRow::melt(&self.results)
    }

    /// Base-scenario detail per ticker.
    pub fn detail_rows(&self) -> Vec<DetailRow> {
        self.results.iter().map(DetailRow::from).collect()
    }

    /// Wide table as a DataFrame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be built.
    pub fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let rows = self.wide_rows();
        let df = DataFrame::new(vec![
            Series::new("Ticker".into(), column(&rows, |r| r.ticker.clone())).into(),
            Series::new("Name".into(), column(&rows, |r| r.name.clone())).into(),
            Series::new("Current Price".into(), column(&rows, |r| r.current_price)).into(),
            Series::new("Conservative".into(), column(&rows, |r| r.conservative)).into(),
            Series::new("Base".into(), column(&rows, |r| r.base)).into(),
            Series::new("Optimistic".into(), column(&rows, |r| r.optimistic)).into(),
        ])?;
        Ok(df)
    }

    /// Long table as a DataFrame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be built.
    pub fn to_long_dataframe(&self) -> Result<DataFrame, ExportError> {
        let rows = self.long_rows();
        let df = DataFrame::new(vec![
            Series::new("ticker".into(), column(&rows, |r| r.ticker.clone())).into(),
            Series::new("name".into(), column(&rows, |r| r.name.clone())).into(),
            Series::new("current_price".into(), column(&rows, |r| r.current_price)).into(),
            Series::new("wacc".into(), column(&rows, |r| r.wacc)).into(),
            Series::new("rf".into(), column(&rows, |r| r.rf)).into(),
            Series::new("tax_rate".into(), column(&rows, |r| r.tax_rate)).into(),
            Series::new("scenario".into(), column(&rows, |r| r.scenario.clone())).into(),
            Series::new("dcf_price".into(), column(&rows, |r| r.dcf_price)).into(),
        ])?;
        Ok(df)
    }

    /// Write the wide, long, detail and failure tables into `dir`.
    ///
    /// Returns the paths written, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file cannot
    /// be written.
    pub fn write_all(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = |stem: &str| dir.join(format!("{stem}.{}", format.extension()));

        let written = vec![
            path(WIDE_FILE),
            path(LONG_FILE),
            path(DETAILS_FILE),
            path(FAILURES_FILE),
        ];
        self.wide_rows().export_to_file(&written[0], format)?;
        self.long_rows().export_to_file(&written[1], format)?;
        self.detail_rows().export_to_file(&written[2], format)?;
        self.failures.export_to_file(&written[3], format)?;
        Ok(written)
    }

    /// Format the table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nDCF Valuation\n");
        output.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str(&format!(
            "{:<10} {:<24} {:>10} {:>10} {:>10} {:>10}\n",
            "Ticker", "Name", "Price", "Conserv.", "Base", "Optim."
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in self.wide_rows() {
            output.push_str(&format!(
                "{:<10} {:<24} {:>10.2} {:>10.2} {:>10.2} {:>10.2}\n",
                row.ticker,
                truncate(&row.name, 24),
                row.current_price,
                row.conservative,
                row.base,
                row.optimistic
            ));
        }

        if !self.failures.is_empty() {
            output.push_str(&format!("\nFailed ({}):\n", self.failures.len()));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for failure in &self.failures {
                output.push_str(&format!(
                    "{:<10} {:<24} {}\n",
                    failure.ticker, failure.kind, failure.message
                ));
            }
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "Valued {} of {} tickers\n",
            self.results.len(),
            self.results.len() + self.failures.len()
        ));
        output
    }
}

impl Exporter for ResultTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => self.wide_rows().export_to_string(format),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

fn column<R, T>(rows: &[R], f: impl Fn(&R) -> T) -> Vec<T> {
    rows.iter().map(f).collect()
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use intrinsic_model::{ScenarioPrices, ValuationDetails};

    fn result(symbol: &str, name: &str) -> ValuationResult {
        ValuationResult {
            symbol: symbol.to_string(),
            name: name.to_string(),
            current_price: 42.0,
            prices: ScenarioPrices {
                conservative: 30.0,
                base: 40.0,
                optimistic: 50.0,
            },
            details: ValuationDetails {
                wacc: 0.095,
                risk_free_rate: 0.04,
                market_risk_premium: 0.06,
                cost_of_equity: 0.10,
                tax_rate: 0.30,
                pretax_cost_of_debt: 0.06,
                historical_growth: 0.05,
                starting_growth: 0.05,
                ebit_margin: 0.15,
                da_ratio: 0.04,
                wc_ratio: 0.08,
                capex_ratio: None,
                enterprise_value: 5000.0,
                equity_value: 4000.0,
                net_debt: 1000.0,
                shares_outstanding: 100.0,
                years_used: 4,
            },
        }
    }

    fn table() -> ResultTable {
        ResultTable::new(
            vec![
                result("BHP", "BHP Group Limited"),
                result("CBA", "Commonwealth Bank of Australia"),
            ],
            vec![FailureRow {
                ticker: "ZZZ".to_string(),
                kind: "NotFound".to_string(),
                message: "Symbol not found: ZZZ".to_string(),
            }],
        )
    }

    #[test]
    fn test_dataframe_shape() {
        let df = table().to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
        for name in crate::export::WIDE_HEADER {
            assert!(df.column(name).is_ok(), "missing column {name}");
        }

        let long = table().to_long_dataframe().unwrap();
        assert_eq!(long.height(), 6);
        assert_eq!(long.width(), crate::export::LONG_HEADER.len());
        for name in crate::export::LONG_HEADER {
            assert!(long.column(name).is_ok(), "missing column {name}");
        }
    }

    #[test]
    fn test_ascii_table() {
        let ascii = table().to_ascii_table();
        assert!(ascii.contains("BHP"));
        assert!(ascii.contains("Commonwealth Bank of Au…"));
        assert!(ascii.contains("ZZZ"));
        assert!(ascii.contains("Valued 2 of 3 tickers"));
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let written = table().write_all(dir.path(), ExportFormat::Csv).unwrap();

        assert_eq!(written.len(), 4);
        assert!(written.iter().all(|p| p.exists()));

        let long = std::fs::read_to_string(&written[1]).unwrap();
        // header + 2 tickers x 3 scenarios
        assert_eq!(long.lines().count(), 7);
    }

    #[test]
    fn test_json_export() {
        let json = table().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["failures"][0]["ticker"], "ZZZ");
        assert!(value["generated_at"].is_string());
    }
}
