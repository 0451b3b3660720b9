//! Discounting a forecast to a per-share value.

use crate::config::ValuationConfig;
use crate::discount::ensure_convergent;
use crate::error::{Result, ValuationError};
use crate::forecast::ForecastPath;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Present values of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Discount rate applied
    pub wacc: f64,
    /// Sum of discounted explicit-period free cash flows
    pub pv_explicit: f64,
    /// Gordon growth terminal value at the horizon
    pub terminal_value: f64,
    /// Terminal value discounted to today
    pub pv_terminal_value: f64,
    /// PV(explicit) + PV(TV)
    pub enterprise_value: f64,
    /// Enterprise value less net debt
    pub equity_value: f64,
    /// Equity value per share
    pub price_per_share: f64,
}

impl Valuation {
    /// Share of enterprise value coming from the terminal value.
    pub fn terminal_share(&self) -> f64 {
        if self.enterprise_value == 0.0 {
            return 0.0;
        }
        self.pv_terminal_value / self.enterprise_value
    }
}

/// `(1 + rate)^y` for `y = 1..=years`.
pub fn discount_factors(rate: f64, years: usize) -> Array1<f64> {
    (1..=years).map(|y| (1.0 + rate).powi(y as i32)).collect()
}

/// Converts a forecast path into enterprise, equity and per-share value.
#[derive(Debug, Clone, Copy)]
pub struct ValuationEngine {
    terminal_growth: f64,
    min_wacc_spread: f64,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new(&ValuationConfig::default())
    }
}

impl ValuationEngine {
    /// Create an engine from the valuation configuration.
    pub const fn new(config: &ValuationConfig) -> Self {
        Self {
            terminal_growth: config.terminal_growth,
            min_wacc_spread: config.min_wacc_spread,
        }
    }

    /// Perpetual growth rate in use.
    pub const fn terminal_growth(&self) -> f64 {
        self.terminal_growth
    }

    /// Value a forecast path.
    ///
    /// ```text
    /// PV  = sum FCF(y) / (1 + WACC)^y
    /// TV  = FCF(N) * (1 + gT) / (WACC - gT)
    /// EV  = PV + TV / (1 + WACC)^N
    /// ```
    ///
    /// # Errors
    ///
    /// - [`ValuationError::InsufficientData`] on an empty path
    /// - [`ValuationError::NonConvergentValuation`] if WACC does not exceed
    ///   terminal growth by the configured spread
    /// - [`ValuationError::DivideByZero`] if `shares_outstanding <= 0`
    pub fn value(
        &self,
        path: &ForecastPath,
        wacc: f64,
        net_debt: f64,
        shares_outstanding: f64,
    ) -> Result<Valuation> {
        let Some(last) = path.last() else {
            return Err(ValuationError::insufficient("empty forecast path"));
        };
        ensure_convergent(wacc, self.terminal_growth, self.min_wacc_spread)?;
        if !shares_outstanding.is_finite() || shares_outstanding <= 0.0 {
            return Err(ValuationError::DivideByZero(format!(
                "shares outstanding is {shares_outstanding}"
            )));
        }

        let horizon = path.len();
        let factors = discount_factors(wacc, horizon);
        let pv_explicit = (path.free_cash_flows() / &factors).sum();

        let terminal_value =
            last.free_cash_flow * (1.0 + self.terminal_growth) / (wacc - self.terminal_growth);
        let pv_terminal_value = terminal_value / factors[horizon - 1];

        let enterprise_value = pv_explicit + pv_terminal_value;
        let equity_value = enterprise_value - net_debt;

        Ok(Valuation {
            wacc,
            pv_explicit,
            terminal_value,
            pv_terminal_value,
            enterprise_value,
            equity_value,
            price_per_share: equity_value / shares_outstanding,
        })
    }
}
