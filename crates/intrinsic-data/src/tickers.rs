//! Ticker list input.

use crate::error::{DataError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header of the column holding ticker symbols.
pub const TICKER_COLUMN: &str = "Ticker";

/// Canonical form of a ticker as typed or read: surrounding whitespace
/// removed, case kept. `None` for blank input.
pub fn clean_ticker(raw: &str) -> Option<&str> {
    let ticker = raw.trim();
    (!ticker.is_empty()).then_some(ticker)
}

/// Read the ordered ticker list from a CSV file.
///
/// Blank cells are skipped; duplicates and order are preserved.
///
/// # Errors
///
/// Returns [`DataError::MissingColumn`] if the file has no `Ticker` column
/// and [`DataError::Parse`] for spreadsheet formats that are not CSV.
pub fn read_tickers(path: &Path) -> Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if matches!(extension.as_deref(), Some("xlsx" | "xls")) {
        return Err(DataError::Parse(format!(
            "unsupported ticker file format: {} (export the sheet as CSV)",
            path.display()
        )));
    }

    let file = File::open(path)?;
    parse_tickers(file, &path.display().to_string())
}

/// Parse tickers from any CSV reader.
///
/// `source_name` only appears in error messages.
///
/// # Errors
///
/// Returns an error if the CSV is malformed or lacks a `Ticker` column.
pub fn parse_tickers<R: Read>(reader: R, source_name: &str) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let index = rdr
        .headers()?
        .iter()
        .position(|h| h.trim() == TICKER_COLUMN)
        .ok_or_else(|| DataError::MissingColumn {
            column: TICKER_COLUMN.to_string(),
            source_name: source_name.to_string(),
        })?;

    let mut tickers = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(symbol) = record.get(index).and_then(clean_ticker) {
            tickers.push(symbol.to_string());
        }
    }

    Ok(tickers)
}
