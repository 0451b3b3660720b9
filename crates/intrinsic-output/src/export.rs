//! CSV and JSON export of valuation results.
//!
//! Three row shapes are produced from a set of [`ValuationResult`]s:
//!
//! - [`WideRow`]: one row per ticker with a price column per scenario
//! - [`LongRow`]: one row per ticker and scenario, for BI tools
//! - [`DetailRow`]: base-scenario inputs and intermediate values

use intrinsic_model::{ScenarioKind, ValuationResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame construction error.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Serialized output was not valid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Unknown export format.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One ticker with its price under each scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WideRow {
    /// Ticker symbol.
    #[serde(rename = "Ticker")]
    pub ticker: String,

    /// Company name.
    #[serde(rename = "Name")]
    pub name: String,

    /// Latest market price.
    #[serde(rename = "Current Price")]
    pub current_price: f64,

    /// Conservative scenario price.
    #[serde(rename = "Conservative")]
    pub conservative: f64,

    /// Base scenario price.
    #[serde(rename = "Base")]
    pub base: f64,

    /// Optimistic scenario price.
    #[serde(rename = "Optimistic")]
    pub optimistic: f64,
}

impl From<&ValuationResult> for WideRow {
    fn from(result: &ValuationResult) -> Self {
        Self {
            ticker: result.symbol.clone(),
            name: result.name.clone(),
            current_price: result.current_price,
            conservative: result.prices.conservative,
            base: result.prices.base,
            optimistic: result.prices.optimistic,
        }
    }
}

/// One ticker under one scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LongRow {
    /// Ticker symbol.
    pub ticker: String,

    /// Company name.
    pub name: String,

    /// Latest market price.
    pub current_price: f64,

    /// Discount rate.
    pub wacc: f64,

    /// Risk-free rate.
    pub rf: f64,

    /// Effective tax rate.
    pub tax_rate: f64,

    /// Scenario label.
    pub scenario: String,

    /// Intrinsic price per share.
    pub dcf_price: f64,
}

impl LongRow {
    /// Row for one scenario of a result.
    pub fn new(result: &ValuationResult, kind: ScenarioKind) -> Self {
        Self {
            ticker: result.symbol.clone(),
            name: result.name.clone(),
            current_price: result.current_price,
            wacc: result.details.wacc,
            rf: result.details.risk_free_rate,
            tax_rate: result.details.tax_rate,
            scenario: kind.label().to_string(),
            dcf_price: result.prices.get(kind),
        }
    }

    /// Long rows grouped by scenario, tickers in input order within each.
    pub fn melt(results: &[ValuationResult]) -> Vec<Self> {
        ScenarioKind::ALL
            .into_iter()
            .flat_map(|kind| results.iter().map(move |r| Self::new(r, kind)))
            .collect()
    }
}

/// Base-scenario inputs and intermediate values for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailRow {
    /// Ticker symbol.
    pub ticker: String,
    /// Company name.
    pub name: String,
    /// Latest market price.
    pub current_price: f64,
    /// Base scenario intrinsic price.
    pub dcf_price: f64,
    /// Discount rate.
    pub wacc: f64,
    /// Risk-free rate.
    pub rf: f64,
    /// Market risk premium.
    pub mrp: f64,
    /// CAPM cost of equity.
    pub cost_of_equity: f64,
    /// Effective tax rate.
    pub tax_rate: f64,
    /// Pretax cost of debt.
    pub cost_of_debt: f64,
    /// Historical revenue growth.
    pub historical_growth: f64,
    /// Starting growth used by the base scenario.
    pub starting_growth: f64,
    /// Normalized EBIT margin.
    pub ebit_margin: f64,
    /// D&A / revenue.
    pub da_ratio: f64,
    /// Working capital / revenue.
    pub wc_ratio: f64,
    /// Historical capex / revenue; empty when not reported.
    pub capex_ratio: Option<f64>,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Equity value.
    pub equity_value: f64,
    /// Net debt.
    pub net_debt: f64,
    /// Shares outstanding.
    pub shares_outstanding: f64,
    /// Fiscal years of history used.
    pub years_used: usize,
}

impl From<&ValuationResult> for DetailRow {
    fn from(result: &ValuationResult) -> Self {
        let d = &result.details;
        Self {
            ticker: result.symbol.clone(),
            name: result.name.clone(),
            current_price: result.current_price,
            dcf_price: result.prices.base,
            wacc: d.wacc,
            rf: d.risk_free_rate,
            mrp: d.market_risk_premium,
            cost_of_equity: d.cost_of_equity,
            tax_rate: d.tax_rate,
            cost_of_debt: d.pretax_cost_of_debt,
            historical_growth: d.historical_growth,
            starting_growth: d.starting_growth,
            ebit_margin: d.ebit_margin,
            da_ratio: d.da_ratio,
            wc_ratio: d.wc_ratio,
            capex_ratio: d.capex_ratio,
            enterprise_value: d.enterprise_value,
            equity_value: d.equity_value,
            net_debt: d.net_debt,
            shares_outstanding: d.shares_outstanding,
            years_used: d.years_used,
        }
    }
}

/// A ticker that could not be valued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureRow {
    /// Ticker symbol.
    pub ticker: String,
    /// Error kind.
    pub kind: String,
    /// Error message.
    pub message: String,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Serialize records with a header row, even when there are no records.
fn records_to_csv<T: Serialize>(records: &[T], header: &[&str]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(header)?;
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

macro_rules! impl_exporter {
    ($row:ty, $header:expr) => {
        impl Exporter for Vec<$row> {
            fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
                match format {
                    ExportFormat::Csv => records_to_csv(self, $header),
                    ExportFormat::Json => Ok(serde_json::to_string(self)?),
                    ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
                }
            }
        }
    };
}

/// Wide table header.
pub const WIDE_HEADER: &[&str] = &[
    "Ticker",
    "Name",
    "Current Price",
    "Conservative",
    "Base",
    "Optimistic",
];

/// Long table header.
pub const LONG_HEADER: &[&str] = &[
    "ticker",
    "name",
    "current_price",
    "wacc",
    "rf",
    "tax_rate",
    "scenario",
    "dcf_price",
];

/// Detail table header.
pub const DETAIL_HEADER: &[&str] = &[
    "ticker",
    "name",
    "current_price",
    "dcf_price",
    "wacc",
    "rf",
    "mrp",
    "cost_of_equity",
    "tax_rate",
    "cost_of_debt",
    "historical_growth",
    "starting_growth",
    "ebit_margin",
    "da_ratio",
    "wc_ratio",
    "capex_ratio",
    "enterprise_value",
    "equity_value",
    "net_debt",
    "shares_outstanding",
    "years_used",
];

/// Failure table header.
pub const FAILURE_HEADER: &[&str] = &["ticker", "kind", "message"];

impl_exporter!(WideRow, WIDE_HEADER);
impl_exporter!(LongRow, LONG_HEADER);
impl_exporter!(DetailRow, DETAIL_HEADER);
impl_exporter!(FailureRow, FAILURE_HEADER);
