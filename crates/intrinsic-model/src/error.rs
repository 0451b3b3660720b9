//! Error types for the valuation core.

use crate::scenario::ScenarioKind;
use thiserror::Error;

/// Result type for valuation operations.
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors raised while normalizing, forecasting or discounting a company.
///
/// Every variant is scoped to a single ticker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// Too little or invalid historical data
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Debt plus equity is not positive
    #[error("Invalid capital structure: debt {debt} + equity {equity} <= 0")]
    InvalidCapitalStructure {
        /// Debt weight basis (net debt floored at zero)
        debt: f64,
        /// Market value of equity
        equity: f64,
    },

    /// Discount rate does not exceed terminal growth, terminal value undefined
    #[error(
        "Non-convergent valuation: WACC {wacc:.4} must exceed terminal growth {terminal_growth:.4} by at least {min_spread:.4}"
    )]
    NonConvergentValuation {
        /// Discount rate in use
        wacc: f64,
        /// Perpetual growth rate
        terminal_growth: f64,
        /// Minimum required spread
        min_spread: f64,
    },

    /// Scenario adjustment outside the configured set
    #[error("Invalid scenario {kind}: adjustment {adjustment} (expected {expected})")]
    InvalidScenario {
        /// Scenario tag
        kind: ScenarioKind,
        /// Adjustment supplied
        adjustment: f64,
        /// Adjustment the configuration allows for this tag
        expected: f64,
    },

    /// Zero shares outstanding or zero revenue in a ratio
    #[error("Division by zero: {0}")]
    DivideByZero(String),

    /// A discount-rate input is non-finite or out of its economic range
    #[error("Invalid discount rate input {field}: {value}")]
    InvalidDiscountInput {
        /// Name of the offending input
        field: &'static str,
        /// Value supplied
        value: f64,
    },

    /// Configuration is internally inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ValuationError {
    /// Short, stable name of the error kind for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::InsufficientData(_) => "InsufficientData",
            Self::InvalidCapitalStructure { .. } => "InvalidCapitalStructure",
            Self::NonConvergentValuation { .. } => "NonConvergentValuation",
            Self::InvalidScenario { .. } => "InvalidScenario",
            Self::DivideByZero(_) => "DivideByZero",
            Self::InvalidDiscountInput { .. } => "InvalidDiscountInput",
            Self::InvalidConfig(_) => "InvalidConfig",
        }
    }

    pub(crate) fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientData(reason.into())
    }
}
