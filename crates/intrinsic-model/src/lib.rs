#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/intrinsic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod discount;
pub mod error;
pub mod forecast;
pub mod normalize;
pub mod pipeline;
pub mod result;
pub mod scenario;
pub mod stats;
pub mod valuation;

pub use config::{CapexPolicy, MarketConfig, RateBounds, Region, ValuationConfig};
pub use discount::{
    DiscountRateEstimator, DiscountRateInputs, WaccBreakdown, cost_of_equity, ensure_convergent,
};
pub use error::{Result, ValuationError};
pub use forecast::{
    ForecastAssumptions, ForecastPath, ForecastYear, ScenarioForecaster, growth_path,
};
pub use normalize::{CompanyFinancials, FinancialsNormalizer, FiscalYear, NormalizedMetrics};
pub use pipeline::DcfPipeline;
pub use result::{ScenarioPrices, ValuationDetails, ValuationResult};
pub use scenario::{GrowthScenario, ScenarioKind};
pub use valuation::{Valuation, ValuationEngine, discount_factors};

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
