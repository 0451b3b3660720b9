//! Valuation configuration.
//!
//! Every assumption the model relies on (terminal growth, scenario
//! magnitude, clamps for derived rates, market premia) is carried
//! explicitly in [`ValuationConfig`] and passed to each component.

use crate::error::{Result, ValuationError};
use serde::{Deserialize, Serialize};

/// Default bounds for an estimated rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateBounds {
    /// Value used when the estimate is unavailable
    pub default: f64,
    /// Lower clamp
    pub min: f64,
    /// Upper clamp
    pub max: f64,
}

impl RateBounds {
    /// Create bounds.
    pub const fn new(default: f64, min: f64, max: f64) -> Self {
        Self { default, min, max }
    }

    /// Clamp an estimate into bounds, falling back to the default when the
    /// estimate is missing or non-finite.
    pub fn clamp(&self, estimate: Option<f64>) -> f64 {
        match estimate {
            Some(x) if x.is_finite() => x.clamp(self.min, self.max),
            _ => self.default,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        let ordered = self.min <= self.default && self.default <= self.max;
        if !(self.min.is_finite() && self.max.is_finite() && ordered) {
            return Err(ValuationError::InvalidConfig(format!(
                "{name} bounds must satisfy min <= default <= max, got {self:?}"
            )));
        }
        Ok(())
    }
}

/// Market the ticker list belongs to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// Australia
    #[default]
    Au,
    /// United States
    Us,
    /// Any other market
    Other,
}

impl Region {
    /// Equity market risk premium conventionally used for the region.
    pub const fn market_risk_premium(self) -> f64 {
        match self {
            Self::Au | Self::Other => 0.06,
            Self::Us => 0.055,
        }
    }

    /// Parse a region code, case-insensitively. Unknown codes map to `Other`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "AU" => Self::Au,
            "US" => Self::Us,
            _ => Self::Other,
        }
    }
}

/// Market-wide discount-rate assumptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    /// Market the tickers trade in
    pub region: Region,
    /// Explicit risk-free rate; the fallback is used when absent
    pub risk_free_rate: Option<f64>,
    /// Risk-free rate used when no explicit rate is supplied
    pub fallback_risk_free_rate: f64,
    /// Explicit market risk premium; the regional default is used when absent
    pub market_risk_premium: Option<f64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            region: Region::Au,
            risk_free_rate: None,
            fallback_risk_free_rate: 0.04,
            market_risk_premium: None,
        }
    }
}

impl MarketConfig {
    /// Risk-free rate in effect.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
            .filter(|r| r.is_finite())
            .unwrap_or(self.fallback_risk_free_rate)
    }

    /// Market risk premium in effect.
    pub fn market_risk_premium(&self) -> f64 {
        self.market_risk_premium
            .filter(|p| p.is_finite())
            .unwrap_or_else(|| self.region.market_risk_premium())
    }
}

/// How forecast capital expenditure is derived.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CapexPolicy {
    /// Maintenance capex equal to D&A plus a fixed growth buffer of revenue
    #[default]
    DepreciationPlusBuffer,
    /// Historical capex/revenue average when reported, otherwise D&A plus buffer
    HistoricalRatio,
}

/// Configuration shared by the normalizer, forecaster and engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValuationConfig {
    /// Explicit forecast horizon in years (default: 10)
    pub forecast_years: usize,
    /// Last year of flat growth before the fade begins (default: 5)
    pub fade_start: usize,
    /// Perpetual growth rate after the horizon (default: 1.5%)
    pub terminal_growth: f64,
    /// Magnitude of the scenario growth adjustment (default: 0.25)
    pub scenario_adjustment: f64,
    /// Trailing years used for margin and ratio normalization (default: 5)
    pub margin_window: usize,
    /// Growth capex as a share of revenue on top of D&A (default: 0.5%)
    pub capex_buffer_pct: f64,
    /// Capex derivation policy
    pub capex_policy: CapexPolicy,
    /// D&A/revenue used when no D&A is reported (default: 3%)
    pub fallback_da_ratio: f64,
    /// Minimum WACC - terminal growth spread (default: 0.1%)
    pub min_wacc_spread: f64,
    /// Effective tax rate default and clamps
    pub tax_rate: RateBounds,
    /// Pretax cost of debt default and clamps
    pub cost_of_debt: RateBounds,
    /// Market assumptions
    pub market: MarketConfig,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            forecast_years: 10,
            fade_start: 5,
            terminal_growth: 0.015,
            scenario_adjustment: 0.25,
            margin_window: 5,
            capex_buffer_pct: 0.005,
            capex_policy: CapexPolicy::DepreciationPlusBuffer,
            fallback_da_ratio: 0.03,
            min_wacc_spread: 0.001,
            tax_rate: RateBounds::new(0.30, 0.05, 0.35),
            cost_of_debt: RateBounds::new(0.06, 0.02, 0.12),
            market: MarketConfig::default(),
        }
    }
}

impl ValuationConfig {
    /// Smallest accepted normalization window.
    pub const MIN_MARGIN_WINDOW: usize = 3;
    /// Largest accepted normalization window.
    pub const MAX_MARGIN_WINDOW: usize = 5;

    /// Check that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ValuationError::InvalidConfig(msg));

        if self.forecast_years == 0 {
            return invalid("forecast_years must be at least 1".to_string());
        }
        if self.fade_start >= self.forecast_years {
            return invalid(format!(
                "fade_start ({}) must be below forecast_years ({})",
                self.fade_start, self.forecast_years
            ));
        }
        if !self.terminal_growth.is_finite() || self.terminal_growth <= -1.0 {
            return invalid(format!("terminal_growth {} is out of range", self.terminal_growth));
        }
        if !(0.0..1.0).contains(&self.scenario_adjustment) {
            return invalid(format!(
                "scenario_adjustment {} must be in [0, 1)",
                self.scenario_adjustment
            ));
        }
        if !(Self::MIN_MARGIN_WINDOW..=Self::MAX_MARGIN_WINDOW).contains(&self.margin_window) {
            return invalid(format!(
                "margin_window {} must be between {} and {}",
                self.margin_window,
                Self::MIN_MARGIN_WINDOW,
                Self::MAX_MARGIN_WINDOW
            ));
        }
        for (name, value) in [
            ("capex_buffer_pct", self.capex_buffer_pct),
            ("fallback_da_ratio", self.fallback_da_ratio),
            ("min_wacc_spread", self.min_wacc_spread),
            ("fallback_risk_free_rate", self.market.fallback_risk_free_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        self.tax_rate.validate("tax_rate")?;
        self.cost_of_debt.validate("cost_of_debt")?;
        if self.tax_rate.max >= 1.0 || self.tax_rate.min < 0.0 {
            return invalid("tax_rate bounds must lie in [0, 1)".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = ValuationConfig::default();
        assert_eq!(config.forecast_years, 10);
        assert_eq!(config.fade_start, 5);
        assert_eq!(config.terminal_growth, 0.015);
        assert_eq!(config.scenario_adjustment, 0.25);
        assert_eq!(config.capex_buffer_pct, 0.005);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(Some(0.50), 0.35)]
    #[case(Some(0.01), 0.05)]
    #[case(Some(0.21), 0.21)]
    #[case(None, 0.30)]
    #[case(Some(f64::NAN), 0.30)]
    fn test_rate_bounds_clamp(#[case] estimate: Option<f64>, #[case] expected: f64) {
        let bounds = RateBounds::new(0.30, 0.05, 0.35);
        assert_eq!(bounds.clamp(estimate), expected);
    }

    #[test]
    fn test_region_premia() {
        assert_eq!(Region::from_code("au").market_risk_premium(), 0.06);
        assert_eq!(Region::from_code("US").market_risk_premium(), 0.055);
        assert_eq!(Region::from_code("JP"), Region::Other);
    }

    #[test]
    fn test_market_overrides() {
        let market = MarketConfig {
            risk_free_rate: Some(0.043),
            market_risk_premium: Some(0.05),
            ..Default::default()
        };
        assert_eq!(market.risk_free_rate(), 0.043);
        assert_eq!(market.market_risk_premium(), 0.05);

        let fallback = MarketConfig::default();
        assert_eq!(fallback.risk_free_rate(), 0.04);
        assert_eq!(fallback.market_risk_premium(), 0.06);
    }

    #[rstest]
    #[case::fade_past_horizon(ValuationConfig { fade_start: 10, ..Default::default() })]
    #[case::window_too_small(ValuationConfig { margin_window: 2, ..Default::default() })]
    #[case::window_too_large(ValuationConfig { margin_window: 6, ..Default::default() })]
    #[case::negative_buffer(ValuationConfig { capex_buffer_pct: -0.01, ..Default::default() })]
    #[case::adjustment_too_large(ValuationConfig { scenario_adjustment: 1.0, ..Default::default() })]
    #[case::bad_tax_bounds(ValuationConfig { tax_rate: RateBounds::new(0.5, 0.1, 0.3), ..Default::default() })]
    fn test_invalid_configs(#[case] config: ValuationConfig) {
        assert!(matches!(
            config.validate(),
            Err(ValuationError::InvalidConfig(_))
        ));
    }
}
