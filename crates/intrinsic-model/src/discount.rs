//! Discount rate estimation.
//!
//! WACC = E/(D+E) * Ke + D/(D+E) * Kd * (1 - t)
//!
//! where:
//! - Ke = rf + beta * MRP (CAPM)
//! - Kd = pretax cost of debt
//! - E = market value of equity, D = net debt floored at zero

use crate::config::{MarketConfig, ValuationConfig};
use crate::error::{Result, ValuationError};
use crate::normalize::{CompanyFinancials, NormalizedMetrics};
use serde::{Deserialize, Serialize};

/// Inputs to the WACC computation for one company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountRateInputs {
    /// Risk-free rate
    pub risk_free_rate: f64,
    /// Equity market risk premium
    pub market_risk_premium: f64,
    /// Equity beta
    pub beta: f64,
    /// Pretax cost of debt proxy
    pub pretax_cost_of_debt: f64,
    /// Effective tax rate; the statutory default applies when absent
    pub tax_rate: Option<f64>,
    /// Market value of equity (price x shares)
    pub equity_value: f64,
    /// Net debt
    pub net_debt: f64,
}

impl DiscountRateInputs {
    /// Assemble inputs from a normalized history and market assumptions.
    pub fn from_financials(
        financials: &CompanyFinancials,
        metrics: &NormalizedMetrics,
        market: &MarketConfig,
    ) -> Self {
        Self {
            risk_free_rate: market.risk_free_rate(),
            market_risk_premium: market.market_risk_premium(),
            beta: financials.beta(),
            pretax_cost_of_debt: metrics.pretax_cost_of_debt,
            tax_rate: Some(metrics.tax_rate),
            equity_value: financials.market_cap(),
            net_debt: financials.net_debt(),
        }
    }

    fn validate(&self) -> Result<()> {
        let non_negative = [
            ("risk_free_rate", self.risk_free_rate),
            ("market_risk_premium", self.market_risk_premium),
            ("pretax_cost_of_debt", self.pretax_cost_of_debt),
            ("equity_value", self.equity_value),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ValuationError::InvalidDiscountInput { field, value });
            }
        }
        for (field, value) in [("beta", self.beta), ("net_debt", self.net_debt)] {
            if !value.is_finite() {
                return Err(ValuationError::InvalidDiscountInput { field, value });
            }
        }
        if let Some(tax) = self.tax_rate
            && !(tax.is_finite() && (0.0..1.0).contains(&tax))
        {
            return Err(ValuationError::InvalidDiscountInput {
                field: "tax_rate",
                value: tax,
            });
        }
        Ok(())
    }
}

/// Components of an estimated WACC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaccBreakdown {
    /// CAPM cost of equity
    pub cost_of_equity: f64,
    /// Cost of debt after tax
    pub after_tax_cost_of_debt: f64,
    /// Tax rate applied to the cost of debt
    pub tax_rate: f64,
    /// E / (D + E)
    pub equity_weight: f64,
    /// D / (D + E)
    pub debt_weight: f64,
    /// Weighted average cost of capital
    pub wacc: f64,
}

/// CAPM cost of equity.
pub fn cost_of_equity(risk_free_rate: f64, beta: f64, market_risk_premium: f64) -> f64 {
    risk_free_rate + beta * market_risk_premium
}

/// Fail unless `wacc` exceeds `terminal_growth` by at least `min_spread`.
///
/// # Errors
///
/// Returns [`ValuationError::NonConvergentValuation`] otherwise.
pub fn ensure_convergent(wacc: f64, terminal_growth: f64, min_spread: f64) -> Result<()> {
    if !wacc.is_finite() || wacc - terminal_growth <= min_spread {
        return Err(ValuationError::NonConvergentValuation {
            wacc,
            terminal_growth,
            min_spread,
        });
    }
    Ok(())
}

/// Estimates WACC from CAPM and the capital structure.
#[derive(Debug, Clone, Copy)]
pub struct DiscountRateEstimator {
    terminal_growth: f64,
    min_wacc_spread: f64,
    default_tax_rate: f64,
}

impl Default for DiscountRateEstimator {
    fn default() -> Self {
        Self::new(&ValuationConfig::default())
    }
}

impl DiscountRateEstimator {
    /// Create an estimator from the valuation configuration.
    pub const fn new(config: &ValuationConfig) -> Self {
        Self {
            terminal_growth: config.terminal_growth,
            min_wacc_spread: config.min_wacc_spread,
            default_tax_rate: config.tax_rate.default,
        }
    }

    /// Estimate WACC with its components.
    ///
    /// # Errors
    ///
    /// - [`ValuationError::InvalidDiscountInput`] for non-finite or negative inputs
    /// - [`ValuationError::InvalidCapitalStructure`] if D + E <= 0
    /// - [`ValuationError::NonConvergentValuation`] if WACC does not exceed
    ///   terminal growth by the configured spread
    pub fn estimate(&self, inputs: &DiscountRateInputs) -> Result<WaccBreakdown> {
        inputs.validate()?;

        let debt = inputs.net_debt.max(0.0);
        let equity = inputs.equity_value;
        let total = debt + equity;
        if total <= 0.0 {
            return Err(ValuationError::InvalidCapitalStructure { debt, equity });
        }

        let tax_rate = inputs.tax_rate.unwrap_or(self.default_tax_rate);
        let ke = cost_of_equity(inputs.risk_free_rate, inputs.beta, inputs.market_risk_premium);
        let kd = inputs.pretax_cost_of_debt * (1.0 - tax_rate);
        let equity_weight = equity / total;
        let debt_weight = debt / total;
        let wacc = equity_weight * ke + debt_weight * kd;

        ensure_convergent(wacc, self.terminal_growth, self.min_wacc_spread)?;

        Ok(WaccBreakdown {
            cost_of_equity: ke,
            after_tax_cost_of_debt: kd,
            tax_rate,
            equity_weight,
            debt_weight,
            wacc,
        })
    }

    /// Estimate WACC only.
    ///
    /// # Errors
    ///
    /// See [`DiscountRateEstimator::estimate`].
    pub fn wacc(&self, inputs: &DiscountRateInputs) -> Result<f64> {
        self.estimate(inputs).map(|b| b.wacc)
    }
}
