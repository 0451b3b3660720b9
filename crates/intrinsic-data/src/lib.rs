#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/intrinsic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod labels;
pub mod provider;
pub mod statements;
pub mod tickers;

pub use error::{DataError, Result};
pub use provider::{FinancialsProvider, InMemoryProvider, JsonDirectoryProvider};
pub use statements::{LineItems, RawStatements, StatementKind};
pub use tickers::{TICKER_COLUMN, clean_ticker, parse_tickers, read_tickers};

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
