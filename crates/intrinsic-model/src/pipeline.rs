//! End-to-end valuation of one company.

use crate::config::ValuationConfig;
use crate::discount::{DiscountRateEstimator, DiscountRateInputs};
use crate::error::Result;
use crate::forecast::{ForecastAssumptions, ScenarioForecaster};
use crate::normalize::{CompanyFinancials, FinancialsNormalizer};
use crate::result::{ScenarioPrices, ValuationDetails, ValuationResult};
use crate::valuation::ValuationEngine;
use intrinsic_data::RawStatements;

/// Normalizer, estimator, forecaster and engine wired to one configuration.
///
/// WACC is estimated once per company and shared by the three scenario
/// forecasts, which differ only in starting growth.
#[derive(Debug, Clone)]
pub struct DcfPipeline {
    normalizer: FinancialsNormalizer,
    estimator: DiscountRateEstimator,
    forecaster: ScenarioForecaster,
    engine: ValuationEngine,
}

impl Default for DcfPipeline {
    fn default() -> Self {
        Self::from_valid_config(ValuationConfig::default())
    }
}

impl DcfPipeline {
    /// Build a pipeline after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ValuationError::InvalidConfig`] if the configuration is
    /// inconsistent.
    pub fn new(config: ValuationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ValuationConfig) -> Self {
        Self {
            estimator: DiscountRateEstimator::new(&config),
            engine: ValuationEngine::new(&config),
            forecaster: ScenarioForecaster::new(config.clone()),
            normalizer: FinancialsNormalizer::new(config),
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ValuationConfig {
        self.normalizer.config()
    }

    /// Value a company from its raw statements.
    ///
    /// # Errors
    ///
    /// Propagates any normalization, discount-rate, forecast or valuation error.
    pub fn value(&self, raw: &RawStatements) -> Result<ValuationResult> {
        let financials = self.normalizer.normalize(raw)?;
        self.value_financials(&financials)
    }

    /// Value an already-normalized company.
    ///
    /// # Errors
    ///
    /// Propagates any discount-rate, forecast or valuation error.
    pub fn value_financials(&self, financials: &CompanyFinancials) -> Result<ValuationResult> {
        let metrics = self.normalizer.metrics(financials);
        let market = &self.config().market;

        let inputs = DiscountRateInputs::from_financials(financials, &metrics, market);
        let wacc = self.estimator.estimate(&inputs)?;

        let assumptions = ForecastAssumptions::from_metrics(financials, &metrics);
        let paths = self.forecaster.forecast_all(&assumptions)?;

        let net_debt = financials.net_debt();
        let shares = financials.shares_outstanding();
        let [conservative, base, optimistic] = [&paths[0], &paths[1], &paths[2]]
            .map(|path| self.engine.value(path, wacc.wacc, net_debt, shares));
        let (conservative, base, optimistic) = (conservative?, base?, optimistic?);

        tracing::debug!(
            symbol = financials.symbol(),
            wacc = wacc.wacc,
            base_price = base.price_per_share,
            "valued company"
        );

        let base_path = &paths[1];

        Ok(ValuationResult {
            symbol: financials.symbol().to_string(),
            name: financials.name().to_string(),
            current_price: financials.current_price(),
            prices: ScenarioPrices {
                conservative: conservative.price_per_share,
                base: base.price_per_share,
                optimistic: optimistic.price_per_share,
            },
            details: ValuationDetails {
                wacc: wacc.wacc,
                risk_free_rate: inputs.risk_free_rate,
                market_risk_premium: inputs.market_risk_premium,
                cost_of_equity: wacc.cost_of_equity,
                tax_rate: metrics.tax_rate,
                pretax_cost_of_debt: metrics.pretax_cost_of_debt,
                historical_growth: metrics.historical_growth,
                starting_growth: base_path.starting_growth(),
                ebit_margin: metrics.ebit_margin,
                da_ratio: metrics.da_ratio,
                wc_ratio: metrics.wc_ratio,
                capex_ratio: metrics.capex_ratio,
                enterprise_value: base.enterprise_value,
                equity_value: base.equity_value,
                net_debt,
                shares_outstanding: shares,
                years_used: metrics.years_used,
            },
        })
    }
}
