#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/intrinsic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod runner;

// Re-export main types from sub-crates
pub use intrinsic_data as data;
pub use intrinsic_model as model;
pub use intrinsic_output as output;

pub use intrinsic_data::{
    DataError, FinancialsProvider, InMemoryProvider, JsonDirectoryProvider, RawStatements,
    StatementKind, clean_ticker, read_tickers,
};
pub use intrinsic_model::{
    DcfPipeline, MarketConfig, Region, ScenarioKind, ValuationConfig, ValuationError,
    ValuationResult,
};
pub use intrinsic_output::{ExportFormat, Exporter, ResultTable};
pub use runner::{BatchError, BatchOutcome, BatchRunner, ErrorKind, TickerFailure};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
