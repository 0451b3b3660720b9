//! Batch valuation across many tickers.
//!
//! Tickers are processed sequentially in input order. A failure for one
//! ticker is logged, recorded and skipped; it never aborts the batch.

use derive_more::Display;
use indicatif::ProgressBar;
use intrinsic_data::{DataError, FinancialsProvider, clean_ticker};
use intrinsic_model::{DcfPipeline, ValuationConfig, ValuationError, ValuationResult};
use intrinsic_output::{FailureRow, ResultTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised while valuing a single ticker.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The provider could not supply statements
    #[error("{0}")]
    Data(#[from] DataError),

    /// The statements could not be valued
    #[error("{0}")]
    Valuation(#[from] ValuationError),
}

impl BatchError {
    /// Classification used in diagnostics and failure tables.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(DataError::NotFound(_)) => ErrorKind::NotFound,
            Self::Data(DataError::InvalidSymbol(_)) => ErrorKind::InvalidSymbol,
            Self::Data(_) => ErrorKind::DataSource,
            Self::Valuation(e) => match e {
                ValuationError::InsufficientData(_) => ErrorKind::InsufficientData,
                ValuationError::InvalidCapitalStructure { .. } => {
                    ErrorKind::InvalidCapitalStructure
                }
                ValuationError::NonConvergentValuation { .. } => {
                    ErrorKind::NonConvergentValuation
                }
                ValuationError::InvalidScenario { .. } => ErrorKind::InvalidScenario,
                ValuationError::DivideByZero(_) => ErrorKind::DivideByZero,
                ValuationError::InvalidDiscountInput { .. } => ErrorKind::InvalidDiscountInput,
                ValuationError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            },
        }
    }
}

/// Kind of per-ticker failure.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Provider has no data for the ticker
    NotFound,
    /// Ticker is malformed
    InvalidSymbol,
    /// Provider failed while reading or decoding data
    DataSource,
    /// History too short or invalid
    InsufficientData,
    /// Debt plus equity not positive
    InvalidCapitalStructure,
    /// WACC does not exceed terminal growth
    NonConvergentValuation,
    /// Scenario adjustment rejected
    InvalidScenario,
    /// Zero shares outstanding
    DivideByZero,
    /// Non-finite or negative discount input
    InvalidDiscountInput,
    /// Inconsistent configuration
    InvalidConfig,
}

/// A ticker that could not be valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerFailure {
    /// Ticker as given in the input list
    pub ticker: String,
    /// Failure classification
    pub kind: ErrorKind,
    /// Human-readable error
    pub message: String,
}

impl TickerFailure {
    fn new(ticker: &str, error: &BatchError) -> Self {
        Self {
            ticker: ticker.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<&TickerFailure> for FailureRow {
    fn from(failure: &TickerFailure) -> Self {
        Self {
            ticker: failure.ticker.clone(),
            kind: failure.kind.to_string(),
            message: failure.message.clone(),
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Successful valuations, in input order
    pub results: Vec<ValuationResult>,
    /// Failed tickers, in input order
    pub failures: Vec<TickerFailure>,
    /// Blank entries skipped
    pub skipped: usize,
}

impl BatchOutcome {
    /// Number of tickers attempted.
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Convert into an exportable result table.
    pub fn into_table(self) -> ResultTable {
        let failures = self.failures.iter().map(FailureRow::from).collect();
        ResultTable::new(self.results, failures)
    }
}

/// Values a list of tickers against a data provider.
#[derive(Debug, Clone)]
pub struct BatchRunner<P> {
    provider: P,
    pipeline: DcfPipeline,
}

impl<P: FinancialsProvider> BatchRunner<P> {
    /// Create a runner from a provider and a configured pipeline.
    pub const fn new(provider: P, pipeline: DcfPipeline) -> Self {
        Self { provider, pipeline }
    }

    /// Create a runner, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InvalidConfig`] if the configuration is
    /// inconsistent.
    pub fn with_config(provider: P, config: ValuationConfig) -> Result<Self, ValuationError> {
        Ok(Self::new(provider, DcfPipeline::new(config)?))
    }

    /// The data provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The valuation pipeline.
    pub const fn pipeline(&self) -> &DcfPipeline {
        &self.pipeline
    }

    /// Fetch and value a single ticker.
    ///
    /// # Errors
    ///
    /// Returns the provider or valuation error for this ticker.
    pub fn value_ticker(&self, ticker: &str) -> Result<ValuationResult, BatchError> {
        let raw = self.provider.fetch_financials(ticker)?;
        Ok(self.pipeline.value(&raw)?)
    }

    /// Value every ticker.
    pub fn run<S: AsRef<str>>(&self, tickers: &[S]) -> BatchOutcome {
        self.run_with_progress(tickers, None)
    }

    /// Value every ticker, advancing `progress` once per entry.
    pub fn run_with_progress<S: AsRef<str>>(
        &self,
        tickers: &[S],
        progress: Option<&ProgressBar>,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        if let Some(pb) = progress {
            pb.set_length(tickers.len() as u64);
        }

        for entry in tickers {
            let Some(ticker) = clean_ticker(entry.as_ref()) else {
                outcome.skipped += 1;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                continue;
            };

            if let Some(pb) = progress {
                pb.set_message(ticker.to_string());
            }

            match self.value_ticker(ticker) {
                Ok(result) => {
                    tracing::info!(
                        ticker,
                        base = result.prices.base,
                        current = result.current_price,
                        "valued"
                    );
                    outcome.results.push(result);
                }
                Err(e) => {
                    let failure = TickerFailure::new(ticker, &e);
                    let log = || {
                        tracing::warn!(ticker, kind = %failure.kind, error = %e, "valuation failed");
                    };
                    match progress {
                        Some(pb) => pb.suspend(log),
                        None => log(),
                    }
                    outcome.failures.push(failure);
                }
            }

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        tracing::info!(
            provider = self.provider.name(),
            valued = outcome.results.len(),
            failed = outcome.failures.len(),
            skipped = outcome.skipped,
            "batch complete"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intrinsic_data::{InMemoryProvider, RawStatements, StatementKind};

    fn company(symbol: &str) -> RawStatements {
        RawStatements {
            current_price: Some(10.0),
            beta: Some(1.0),
            shares_outstanding: Some(50.0),
            ..RawStatements::new(symbol)
        }
        .with_line_item(
            StatementKind::IncomeStatement,
            "Total Revenue",
            [(2023, 100.0), (2024, 108.0)],
        )
        .with_line_item(StatementKind::IncomeStatement, "EBIT", [(2023, 12.0), (2024, 13.0)])
    }

    #[test]
    fn test_error_kinds() {
        let not_found = BatchError::from(DataError::NotFound("X".to_string()));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let parse = BatchError::from(DataError::Parse("bad".to_string()));
        assert_eq!(parse.kind(), ErrorKind::DataSource);

        let zero = BatchError::from(ValuationError::DivideByZero("shares".to_string()));
        assert_eq!(zero.kind(), ErrorKind::DivideByZero);
        assert_eq!(zero.kind().to_string(), "DivideByZero");
    }

    #[test]
    fn test_blank_tickers_skipped() {
        let provider: InMemoryProvider = [company("AAA")].into_iter().collect();
        let runner = BatchRunner::new(provider, DcfPipeline::default());

        let outcome = runner.run(&["AAA", "  ", ""]);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_tickers_keep_case() {
        let provider: InMemoryProvider = [company("AAA")].into_iter().collect();
        let runner = BatchRunner::new(provider, DcfPipeline::default());

        let outcome = runner.run(&[" AAA ", "aaa"]);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].symbol, "AAA");
        assert_eq!(outcome.failures[0].ticker, "aaa");
        assert_eq!(outcome.failures[0].kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_failure_row_conversion() {
        let failure = TickerFailure {
            ticker: "ZZZ".to_string(),
            kind: ErrorKind::NonConvergentValuation,
            message: "wacc".to_string(),
        };
        let row = FailureRow::from(&failure);
        assert_eq!(row.kind, "NonConvergentValuation");
    }

    #[test]
    fn test_progress_bar_advances() {
        let provider: InMemoryProvider = [company("AAA")].into_iter().collect();
        let runner = BatchRunner::new(provider, DcfPipeline::default());
        let pb = ProgressBar::hidden();

        runner.run_with_progress(&["AAA", "MISSING", " "], Some(&pb));
        assert_eq!(pb.position(), 3);
    }
}
