//! Scenario revenue and free-cash-flow forecasts.
//!
//! Growth is held at the scenario's starting rate through `fade_start`
//! and then faded linearly to terminal growth by the final year:
//!
//! ```text
//! g(y) = g0                                        y <= fade_start
//! g(y) = g0 + (gT - g0) * (y - fade_start) / (N - fade_start)   otherwise
//! ```
//!
//! Unlevered free cash flow per year is
//! `EBIT * (1 - t) + D&A - CapEx - dWC`.

use crate::config::{CapexPolicy, ValuationConfig};
use crate::error::{Result, ValuationError};
use crate::normalize::{CompanyFinancials, NormalizedMetrics};
use crate::scenario::GrowthScenario;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Company-level inputs shared by every scenario forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAssumptions {
    /// Revenue of the last actual year (year 0)
    pub base_revenue: f64,
    /// Historical growth before the scenario adjustment
    pub historical_growth: f64,
    /// Normalized EBIT margin, held constant
    pub ebit_margin: f64,
    /// D&A / revenue
    pub da_ratio: f64,
    /// Working capital / revenue
    pub wc_ratio: f64,
    /// Historical capex / revenue, if reported
    pub capex_ratio: Option<f64>,
    /// Tax rate applied to EBIT
    pub tax_rate: f64,
}

impl ForecastAssumptions {
    /// Assumptions for a normalized company.
    pub fn from_metrics(financials: &CompanyFinancials, metrics: &NormalizedMetrics) -> Self {
        Self {
            base_revenue: financials.last_revenue(),
            historical_growth: metrics.historical_growth,
            ebit_margin: metrics.ebit_margin,
            da_ratio: metrics.da_ratio,
            wc_ratio: metrics.wc_ratio,
            capex_ratio: metrics.capex_ratio,
            tax_rate: metrics.tax_rate,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_revenue.is_finite() && self.base_revenue > 0.0) {
            return Err(ValuationError::insufficient(format!(
                "base revenue must be positive, got {}",
                self.base_revenue
            )));
        }
        let scalars = [
            self.historical_growth,
            self.ebit_margin,
            self.da_ratio,
            self.wc_ratio,
            self.tax_rate,
        ];
        if scalars.iter().any(|v| !v.is_finite()) {
            return Err(ValuationError::insufficient(
                "forecast assumptions contain non-finite values",
            ));
        }
        Ok(())
    }
}

/// One projected year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastYear {
    /// Forecast year, starting at 1
    pub year: usize,
    /// Revenue growth applied this year
    pub growth: f64,
    /// Revenue
    pub revenue: f64,
    /// EBIT margin
    pub ebit_margin: f64,
    /// EBIT
    pub ebit: f64,
    /// Depreciation and amortization
    pub depreciation_amortization: f64,
    /// Capital expenditure
    pub capex: f64,
    /// Change in working capital
    pub delta_working_capital: f64,
    /// Unlevered free cash flow
    pub free_cash_flow: f64,
}

/// Projected years for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPath {
    scenario: GrowthScenario,
    starting_growth: f64,
    years: Vec<ForecastYear>,
}

impl ForecastPath {
    /// Scenario the path was produced under.
    pub const fn scenario(&self) -> &GrowthScenario {
        &self.scenario
    }

    /// Scenario-adjusted growth for the flat years.
    pub const fn starting_growth(&self) -> f64 {
        self.starting_growth
    }

    /// Projected years, year 1 first.
    pub fn years(&self) -> &[ForecastYear] {
        &self.years
    }

    /// Number of projected years.
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether the path has no years.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Final projected year.
    pub fn last(&self) -> Option<&ForecastYear> {
        self.years.last()
    }

    /// Free cash flows, year 1 first.
    pub fn free_cash_flows(&self) -> Array1<f64> {
        self.years.iter().map(|y| y.free_cash_flow).collect()
    }
}

/// Growth rate for each forecast year.
pub fn growth_path(initial: f64, years: usize, terminal: f64, fade_start: usize) -> Vec<f64> {
    let fade_years = years.saturating_sub(fade_start).max(1) as f64;
    (1..=years)
        .map(|y| {
            if y <= fade_start {
                initial
            } else {
                initial + (terminal - initial) * (y - fade_start) as f64 / fade_years
            }
        })
        .collect()
}

/// Projects revenue and free cash flow under a growth scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioForecaster {
    config: ValuationConfig,
}

impl ScenarioForecaster {
    /// Create a forecaster with the given configuration.
    pub const fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Capex for a year under the configured policy.
    fn capex(&self, assumptions: &ForecastAssumptions, revenue: f64, da: f64) -> f64 {
        let maintenance_plus_growth = da + self.config.capex_buffer_pct * revenue;
        match (self.config.capex_policy, assumptions.capex_ratio) {
            (CapexPolicy::HistoricalRatio, Some(ratio)) if ratio.is_finite() => ratio * revenue,
            _ => maintenance_plus_growth,
        }
    }

    /// Forecast the configured horizon for one scenario.
    ///
    /// # Errors
    ///
    /// - [`ValuationError::InvalidScenario`] if the scenario's adjustment is
    ///   not the configured one for its tag
    /// - [`ValuationError::InsufficientData`] for non-positive base revenue or
    ///   non-finite assumptions
    pub fn forecast(
        &self,
        assumptions: &ForecastAssumptions,
        scenario: &GrowthScenario,
    ) -> Result<ForecastPath> {
        scenario.validate(self.config.scenario_adjustment)?;
        assumptions.validate()?;

        let starting_growth = scenario.apply(assumptions.historical_growth);
        let growth = growth_path(
            starting_growth,
            self.config.forecast_years,
            self.config.terminal_growth,
            self.config.fade_start,
        );

        let mut previous_revenue = assumptions.base_revenue;
        let years = growth
            .into_iter()
            .enumerate()
            .map(|(i, g)| {
                let revenue = previous_revenue * (1.0 + g);
                let ebit = revenue * assumptions.ebit_margin;
                let da = revenue * assumptions.da_ratio;
                let capex = self.capex(assumptions, revenue, da);
                let delta_wc = assumptions.wc_ratio * (revenue - previous_revenue);
                let fcf = ebit * (1.0 - assumptions.tax_rate) + da - capex - delta_wc;
                previous_revenue = revenue;

                ForecastYear {
                    year: i + 1,
                    growth: g,
                    revenue,
                    ebit_margin: assumptions.ebit_margin,
                    ebit,
                    depreciation_amortization: da,
                    capex,
                    delta_working_capital: delta_wc,
                    free_cash_flow: fcf,
                }
            })
            .collect();

        Ok(ForecastPath {
            scenario: *scenario,
            starting_growth,
            years,
        })
    }

    /// Forecast all three scenarios from the same assumptions.
    ///
    /// # Errors
    ///
    /// See [`ScenarioForecaster::forecast`].
    pub fn forecast_all(&self, assumptions: &ForecastAssumptions) -> Result<[ForecastPath; 3]> {
        let [conservative, base, optimistic] = GrowthScenario::all(&self.config);
        Ok([
            self.forecast(assumptions, &conservative)?,
            self.forecast(assumptions, &base)?,
            self.forecast(assumptions, &optimistic)?,
        ])
    }
}
