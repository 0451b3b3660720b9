//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur at the data-provider boundary.
#[derive(Debug, Error)]
pub enum DataError {
    /// Ticker could not be resolved by the provider
    #[error("Ticker not found: {0}")]
    NotFound(String),

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Required column absent from a tabular input
    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn {
        /// Column that was expected
        column: String,
        /// File or stream the column was expected in
        source_name: String,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Whether the error means the provider has no data for the ticker.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
