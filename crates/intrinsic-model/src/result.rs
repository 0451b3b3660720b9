//! Per-ticker valuation records.

use crate::scenario::ScenarioKind;
use serde::{Deserialize, Serialize};

/// Intrinsic price per share under each scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPrices {
    /// Conservative scenario price
    pub conservative: f64,
    /// Base scenario price
    pub base: f64,
    /// Optimistic scenario price
    pub optimistic: f64,
}

impl ScenarioPrices {
    /// Price for a scenario.
    pub const fn get(&self, kind: ScenarioKind) -> f64 {
        match kind {
            ScenarioKind::Conservative => self.conservative,
            ScenarioKind::Base => self.base,
            ScenarioKind::Optimistic => self.optimistic,
        }
    }

    /// `(scenario, price)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (ScenarioKind, f64)> + '_ {
        ScenarioKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// Whether prices are ordered conservative <= base <= optimistic.
    pub fn is_ordered(&self) -> bool {
        self.conservative <= self.base && self.base <= self.optimistic
    }
}

/// Inputs and intermediate values behind the base-scenario price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationDetails {
    /// Discount rate shared by all scenarios
    pub wacc: f64,
    /// Risk-free rate
    pub risk_free_rate: f64,
    /// Market risk premium
    pub market_risk_premium: f64,
    /// CAPM cost of equity
    pub cost_of_equity: f64,
    /// Effective tax rate
    pub tax_rate: f64,
    /// Pretax cost of debt
    pub pretax_cost_of_debt: f64,
    /// Historical revenue growth
    pub historical_growth: f64,
    /// Base scenario starting growth
    pub starting_growth: f64,
    /// Normalized EBIT margin
    pub ebit_margin: f64,
    /// D&A / revenue
    pub da_ratio: f64,
    /// Working capital / revenue
    pub wc_ratio: f64,
    /// Historical capex / revenue, if reported
    pub capex_ratio: Option<f64>,
    /// Base scenario enterprise value
    pub enterprise_value: f64,
    /// Base scenario equity value
    pub equity_value: f64,
    /// Net debt deducted from enterprise value
    pub net_debt: f64,
    /// Shares outstanding
    pub shares_outstanding: f64,
    /// Fiscal years of history used
    pub years_used: usize,
}

/// Valuation of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Ticker symbol
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Latest market price
    pub current_price: f64,
    /// Intrinsic price per scenario
    pub prices: ScenarioPrices,
    /// Base scenario detail
    pub details: ValuationDetails,
}

impl ValuationResult {
    /// Intrinsic price relative to market price, minus one.
    pub fn upside(&self, kind: ScenarioKind) -> f64 {
        self.prices.get(kind) / self.current_price - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_prices() {
        let prices = ScenarioPrices {
            conservative: 24.7,
            base: 28.5,
            optimistic: 32.8,
        };

        assert_eq!(prices.get(ScenarioKind::Base), 28.5);
        assert!(prices.is_ordered());
        let kinds: Vec<ScenarioKind> = prices.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, ScenarioKind::ALL.to_vec());
    }
}
