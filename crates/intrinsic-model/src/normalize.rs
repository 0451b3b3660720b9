//! Financials normalization.
//!
//! Turns a provider's [`RawStatements`] into a gap-free yearly series
//! ([`CompanyFinancials`]) and derives the scalars the forecast runs on
//! ([`NormalizedMetrics`]).

use crate::config::ValuationConfig;
use crate::error::{Result, ValuationError};
use crate::stats;
use intrinsic_data::labels::{balance_sheet, cash_flow, income_statement};
use intrinsic_data::{RawStatements, StatementKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One fiscal year of cleaned data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Fiscal year
    pub year: i32,
    /// Revenue (strictly positive)
    pub revenue: f64,
    /// Earnings before interest and taxes
    pub ebit: f64,
    /// Depreciation and amortization
    pub depreciation_amortization: Option<f64>,
    /// Working capital
    pub working_capital: Option<f64>,
    /// Capital expenditure as a positive outflow
    pub capex: Option<f64>,
    /// Income tax expense as a positive amount
    pub tax_provision: Option<f64>,
    /// Pretax income
    pub pretax_income: Option<f64>,
    /// Interest expense as a positive amount
    pub interest_expense: Option<f64>,
    /// Total debt
    pub total_debt: f64,
    /// Net debt (debt less cash)
    pub net_debt: f64,
    /// Shares outstanding
    pub shares_outstanding: f64,
}

impl FiscalYear {
    /// EBIT / revenue.
    pub fn ebit_margin(&self) -> f64 {
        self.ebit / self.revenue
    }

    /// D&A / revenue, when D&A is reported.
    pub fn da_ratio(&self) -> Option<f64> {
        self.depreciation_amortization.map(|da| da / self.revenue)
    }

    /// Working capital / revenue, when working capital is reported.
    pub fn wc_ratio(&self) -> Option<f64> {
        self.working_capital.map(|wc| wc / self.revenue)
    }

    /// Capex / revenue, when capex is reported.
    pub fn capex_ratio(&self) -> Option<f64> {
        self.capex.map(|capex| capex / self.revenue)
    }
}

/// Immutable, chronologically ordered financial history of one company.
///
/// Deserialization goes through [`CompanyFinancials::new`], so a decoded
/// history satisfies the same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FinancialsRecord")]
pub struct CompanyFinancials {
    symbol: String,
    name: String,
    current_price: f64,
    beta: f64,
    years: Vec<FiscalYear>,
}

#[derive(Debug, Deserialize)]
struct FinancialsRecord {
    symbol: String,
    name: String,
    current_price: f64,
    beta: f64,
    years: Vec<FiscalYear>,
}

impl TryFrom<FinancialsRecord> for CompanyFinancials {
    type Error = ValuationError;

    fn try_from(record: FinancialsRecord) -> Result<Self> {
        Self::new(
            record.symbol,
            record.name,
            record.current_price,
            record.beta,
            record.years,
        )
    }
}

impl CompanyFinancials {
    /// Build a history, checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InsufficientData`] if `years` is empty, not
    /// strictly consecutive, contains non-positive revenue, or if price or
    /// beta is not finite.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        current_price: f64,
        beta: f64,
        years: Vec<FiscalYear>,
    ) -> Result<Self> {
        let symbol = symbol.into();

        if years.is_empty() {
            return Err(ValuationError::insufficient(format!(
                "{symbol}: no fiscal year with both revenue and EBIT"
            )));
        }
        if let Some(pair) = years.windows(2).find(|w| w[1].year != w[0].year + 1) {
            return Err(ValuationError::insufficient(format!(
                "{symbol}: fiscal years {} and {} are not consecutive",
                pair[0].year, pair[1].year
            )));
        }
        if let Some(bad) = years
            .iter()
            .find(|y| !(y.revenue.is_finite() && y.revenue > 0.0))
        {
            return Err(ValuationError::insufficient(format!(
                "{symbol}: non-positive revenue {} in {}",
                bad.revenue, bad.year
            )));
        }
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ValuationError::insufficient(format!(
                "{symbol}: missing or invalid current price"
            )));
        }
        if !beta.is_finite() {
            return Err(ValuationError::insufficient(format!("{symbol}: missing beta")));
        }

        Ok(Self {
            symbol,
            name: name.into(),
            current_price,
            beta,
            years,
        })
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Company name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest market price.
    pub const fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Equity beta.
    pub const fn beta(&self) -> f64 {
        self.beta
    }

    /// Fiscal years, oldest first.
    pub fn years(&self) -> &[FiscalYear] {
        &self.years
    }

    /// Most recent fiscal year.
    pub fn latest(&self) -> Option<&FiscalYear> {
        self.years.last()
    }

    /// Revenue of the latest fiscal year, the forecast's starting point.
    pub fn last_revenue(&self) -> f64 {
        self.latest().map_or(0.0, |y| y.revenue)
    }

    /// Net debt at the latest balance sheet.
    pub fn net_debt(&self) -> f64 {
        self.latest().map_or(0.0, |y| y.net_debt)
    }

    /// Shares outstanding at the latest balance sheet.
    pub fn shares_outstanding(&self) -> f64 {
        self.latest().map_or(0.0, |y| y.shares_outstanding)
    }

    /// Market value of equity: price x shares outstanding.
    pub fn market_cap(&self) -> f64 {
        self.current_price * self.shares_outstanding()
    }

    /// Revenue series, oldest first.
    pub fn revenues(&self) -> Vec<f64> {
        self.years.iter().map(|y| y.revenue).collect()
    }

    /// EBIT margin series, oldest first.
    pub fn ebit_margins(&self) -> Vec<f64> {
        self.years.iter().map(FiscalYear::ebit_margin).collect()
    }

    /// Historical revenue growth.
    ///
    /// CAGR from the first to the last year; the simple year-over-year
    /// average with exactly two years; zero with a single year.
    pub fn historical_growth(&self) -> f64 {
        let revenues = self.revenues();
        match revenues.len() {
            0 | 1 => 0.0,
            2 => stats::mean_period_growth(&revenues).unwrap_or(0.0),
            n => stats::cagr(revenues[0], revenues[n - 1], n - 1).unwrap_or(0.0),
        }
    }
}

/// Scalars derived from history that drive every scenario of a company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    /// Median EBIT margin over the trailing window
    pub ebit_margin: f64,
    /// Historical revenue growth (CAGR)
    pub historical_growth: f64,
    /// Average D&A / revenue over the trailing window
    pub da_ratio: f64,
    /// Average working capital / revenue over the trailing window
    pub wc_ratio: f64,
    /// Average capex / revenue over the trailing window, if reported
    pub capex_ratio: Option<f64>,
    /// Effective tax rate after clamping
    pub tax_rate: f64,
    /// Pretax cost of debt after clamping
    pub pretax_cost_of_debt: f64,
    /// Number of fiscal years in the history
    pub years_used: usize,
}

/// Cleans raw statements and derives normalized metrics.
#[derive(Debug, Clone, Default)]
pub struct FinancialsNormalizer {
    config: ValuationConfig,
}

impl FinancialsNormalizer {
    /// Create a normalizer with the given configuration.
    pub const fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Convert raw statements into a gap-free yearly history.
    ///
    /// The history is the trailing run of consecutive fiscal years that
    /// report both revenue and EBIT.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InsufficientData`] if no usable year exists,
    /// if revenue is non-positive in a used year, or if price or beta is
    /// missing.
    pub fn normalize(&self, raw: &RawStatements) -> Result<CompanyFinancials> {
        let symbol = raw.symbol.as_str();
        let income = StatementKind::IncomeStatement;
        let balance = StatementKind::BalanceSheet;

        let revenue = raw.first_series(income, income_statement::REVENUE);
        let ebit = raw.first_series(income, income_statement::EBIT);
        if revenue.is_empty() || ebit.is_empty() {
            return Err(ValuationError::insufficient(format!(
                "{symbol}: missing revenue/EBIT series"
            )));
        }

        let window = trailing_consecutive_years(&revenue, &ebit);
        if window.is_empty() {
            return Err(ValuationError::insufficient(format!(
                "{symbol}: no fiscal year with both revenue and EBIT"
            )));
        }

        let da = raw.first_series(income, income_statement::DEPRECIATION_AMORTIZATION);
        let tax = raw.first_series(income, income_statement::TAX_PROVISION);
        let pretax = raw.first_series(income, income_statement::PRETAX_INCOME);
        let interest = raw.first_series(income, income_statement::INTEREST_EXPENSE);
        let capex = raw.first_series(StatementKind::CashFlow, cash_flow::CAPITAL_EXPENDITURE);
        let cash = raw.first_series(balance, balance_sheet::CASH);
        let reported_net_debt = raw.first_series(balance, balance_sheet::NET_DEBT);
        let total_debt = raw.first_series(balance, balance_sheet::TOTAL_DEBT);
        let long_term_debt = raw.first_series(balance, balance_sheet::LONG_TERM_DEBT);
        let short_term_debt = raw.first_series(balance, balance_sheet::SHORT_TERM_DEBT);
        let working_capital = working_capital_series(raw);
        let reported_shares = raw.first_series(balance, balance_sheet::SHARES_OUTSTANDING);

        let current_shares = current_shares(raw, &reported_shares);
        let latest_year = window[window.len() - 1];

        let years = window
            .iter()
            .map(|&year| {
                let debt = as_of(&total_debt, year).unwrap_or_else(|| {
                    as_of(&long_term_debt, year).unwrap_or(0.0)
                        + as_of(&short_term_debt, year).unwrap_or(0.0)
                });
                let net_debt = as_of(&reported_net_debt, year)
                    .unwrap_or_else(|| debt - as_of(&cash, year).unwrap_or(0.0));
                let shares = if year == latest_year {
                    current_shares
                        .or_else(|| as_of(&reported_shares, year))
                        .unwrap_or(0.0)
                } else {
                    as_of(&reported_shares, year)
                        .or(current_shares)
                        .unwrap_or(0.0)
                };

                FiscalYear {
                    year,
                    revenue: revenue[&year],
                    ebit: ebit[&year],
                    depreciation_amortization: da.get(&year).copied(),
                    working_capital: working_capital.get(&year).copied(),
                    capex: capex.get(&year).map(|c| c.abs()),
                    tax_provision: tax.get(&year).map(|t| t.abs()),
                    pretax_income: pretax.get(&year).copied(),
                    interest_expense: interest.get(&year).map(|i| i.abs()),
                    total_debt: debt,
                    net_debt,
                    shares_outstanding: shares,
                }
            })
            .collect::<Vec<_>>();

        let price = raw.current_price.ok_or_else(|| {
            ValuationError::insufficient(format!("{symbol}: missing current price"))
        })?;
        let beta = raw
            .beta
            .ok_or_else(|| ValuationError::insufficient(format!("{symbol}: missing beta")))?;

        tracing::debug!(
            symbol,
            first_year = window[0],
            last_year = latest_year,
            years = window.len(),
            "normalized financials"
        );

        CompanyFinancials::new(symbol, raw.display_name(), price, beta, years)
    }

    /// Derive the normalized margin, growth and ratios of a history.
    pub fn metrics(&self, financials: &CompanyFinancials) -> NormalizedMetrics {
        let window = self.config.margin_window;
        let years = financials.years();

        // Median over a non-empty history of finite margins is always defined.
        let ebit_margin = stats::trailing_median(&financials.ebit_margins(), window).unwrap_or(0.0);

        let da_ratio = ratio_average(years, window, FiscalYear::da_ratio).unwrap_or_else(|| {
            tracing::debug!(
                symbol = financials.symbol(),
                fallback = self.config.fallback_da_ratio,
                "no D&A reported, using fallback ratio"
            );
            self.config.fallback_da_ratio
        });
        let wc_ratio = ratio_average(years, window, FiscalYear::wc_ratio).unwrap_or(0.0);
        let capex_ratio = ratio_average(years, window, FiscalYear::capex_ratio);

        NormalizedMetrics {
            ebit_margin,
            historical_growth: financials.historical_growth(),
            da_ratio,
            wc_ratio,
            capex_ratio,
            tax_rate: self.config.tax_rate.clamp(effective_tax_rate(years)),
            pretax_cost_of_debt: self.config.cost_of_debt.clamp(implied_cost_of_debt(years)),
            years_used: years.len(),
        }
    }
}

/// Trailing run of consecutive years present in both series.
fn trailing_consecutive_years(revenue: &BTreeMap<i32, f64>, ebit: &BTreeMap<i32, f64>) -> Vec<i32> {
    let mut run: Vec<i32> = Vec::new();
    for &year in revenue.keys().rev() {
        if !ebit.contains_key(&year) {
            if run.is_empty() {
                continue;
            }
            break;
        }
        if let Some(&next) = run.last()
            && next != year + 1
        {
            break;
        }
        run.push(year);
    }
    run.reverse();
    run
}

/// Latest value reported at or before `year`.
fn as_of(series: &BTreeMap<i32, f64>, year: i32) -> Option<f64> {
    series.range(..=year).next_back().map(|(_, v)| *v)
}

/// Reported working capital, or current assets less current liabilities.
fn working_capital_series(raw: &RawStatements) -> BTreeMap<i32, f64> {
    let balance = StatementKind::BalanceSheet;
    let reported = raw.first_series(balance, balance_sheet::WORKING_CAPITAL);
    if !reported.is_empty() {
        return reported;
    }

    let assets = raw.first_series(balance, balance_sheet::CURRENT_ASSETS);
    let liabilities = raw.first_series(balance, balance_sheet::CURRENT_LIABILITIES);
    assets
        .iter()
        .filter_map(|(year, a)| liabilities.get(year).map(|l| (*year, a - l)))
        .collect()
}

/// Current share count: quoted shares, else latest reported, else market cap / price.
fn current_shares(raw: &RawStatements, reported: &BTreeMap<i32, f64>) -> Option<f64> {
    let positive = |v: &f64| v.is_finite() && *v > 0.0;
    raw.shares_outstanding
        .filter(positive)
        .or_else(|| reported.values().next_back().copied().filter(positive))
        .or_else(|| match (raw.market_cap, raw.current_price) {
            (Some(cap), Some(price)) if price > 0.0 => Some(cap / price).filter(positive),
            _ => None,
        })
}

fn ratio_average(
    years: &[FiscalYear],
    window: usize,
    ratio: impl Fn(&FiscalYear) -> Option<f64>,
) -> Option<f64> {
    let values: Vec<f64> = stats::tail(years, window)
        .iter()
        .filter_map(ratio)
        .collect();
    stats::mean(&values)
}

/// Tax provision / pretax income of the latest year with positive pretax income.
fn effective_tax_rate(years: &[FiscalYear]) -> Option<f64> {
    years.iter().rev().find_map(|y| match (y.tax_provision, y.pretax_income) {
        (Some(tax), Some(pretax)) if pretax > 0.0 => Some(tax / pretax),
        _ => None,
    })
}

/// Interest expense / total debt of the latest year carrying debt.
fn implied_cost_of_debt(years: &[FiscalYear]) -> Option<f64> {
    years.iter().rev().find_map(|y| match y.interest_expense {
        Some(interest) if y.total_debt > 0.0 => Some(interest / y.total_debt),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw_company() -> RawStatements {
        let mut raw = RawStatements::new("ACME")
            .with_line_item(
                StatementKind::IncomeStatement,
                "Total Revenue",
                [(2020, 1000.0), (2021, 1100.0), (2022, 1210.0), (2023, 1331.0)],
            )
            .with_line_item(
                StatementKind::IncomeStatement,
                "Operating Income",
                [(2020, 150.0), (2021, 220.0), (2022, 242.0), (2023, 266.2)],
            )
            .with_line_item(
                StatementKind::IncomeStatement,
                "Reconciled Depreciation",
                [(2022, 60.5), (2023, 66.55)],
            )
            .with_line_item(StatementKind::IncomeStatement, "Tax Provision", [(2023, -60.0)])
            .with_line_item(StatementKind::IncomeStatement, "Pretax Income", [(2023, 240.0)])
            .with_line_item(StatementKind::IncomeStatement, "Interest Expense", [(2023, -20.0)])
            .with_line_item(
                StatementKind::BalanceSheet,
                "Current Assets",
                [(2022, 400.0), (2023, 433.1)],
            )
            .with_line_item(
                StatementKind::BalanceSheet,
                "Current Liabilities",
                [(2022, 279.0), (2023, 300.0)],
            )
            .with_line_item(StatementKind::BalanceSheet, "Long Term Debt", [(2023, 400.0)])
            .with_line_item(StatementKind::BalanceSheet, "Current Debt", [(2023, 100.0)])
            .with_line_item(StatementKind::BalanceSheet, "Cash", [(2023, 150.0)])
            .with_line_item(
                StatementKind::CashFlow,
                "Capital Expenditure",
                [(2023, -79.86)],
            );
        raw.name = Some("Acme Corp".to_string());
        raw.current_price = Some(25.0);
        raw.beta = Some(1.1);
        raw.shares_outstanding = Some(100.0);
        raw
    }

    #[test]
    fn test_normalize_builds_consecutive_history() {
        let financials = FinancialsNormalizer::default()
            .normalize(&raw_company())
            .unwrap();

        assert_eq!(financials.symbol(), "ACME");
        assert_eq!(financials.name(), "Acme Corp");
        assert_eq!(financials.years().len(), 4);
        assert_eq!(financials.last_revenue(), 1331.0);
        // 400 + 100 debt - 150 cash
        assert_relative_eq!(financials.net_debt(), 350.0);
        assert_relative_eq!(financials.market_cap(), 2500.0);

        let latest = financials.latest().unwrap();
        assert_eq!(latest.capex, Some(79.86));
        assert_eq!(latest.tax_provision, Some(60.0));
        assert_relative_eq!(latest.working_capital.unwrap(), 133.1, epsilon = 1e-9);
    }

    #[test]
    fn test_metrics() {
        let normalizer = FinancialsNormalizer::default();
        let financials = normalizer.normalize(&raw_company()).unwrap();
        let metrics = normalizer.metrics(&financials);

        // margins: 0.15, 0.2, 0.2, 0.2
        assert_relative_eq!(metrics.ebit_margin, 0.20, epsilon = 1e-12);
        assert_relative_eq!(metrics.historical_growth, 0.10, epsilon = 1e-12);
        assert_relative_eq!(metrics.da_ratio, 0.05, epsilon = 1e-12);
        assert_relative_eq!(metrics.wc_ratio, 0.10, epsilon = 1e-9);
        assert_relative_eq!(metrics.capex_ratio.unwrap(), 0.06, epsilon = 1e-12);
        assert_relative_eq!(metrics.tax_rate, 0.25, epsilon = 1e-12);
        assert_relative_eq!(metrics.pretax_cost_of_debt, 0.04, epsilon = 1e-12);
        assert_eq!(metrics.years_used, 4);
    }

    #[test]
    fn test_metrics_fall_back_to_defaults() {
        let raw = RawStatements {
            current_price: Some(10.0),
            beta: Some(1.0),
            ..RawStatements::new("BARE")
        }
        .with_line_item(StatementKind::IncomeStatement, "Total Revenue", [(2024, 500.0)])
        .with_line_item(StatementKind::IncomeStatement, "EBIT", [(2024, 50.0)]);

        let normalizer = FinancialsNormalizer::default();
        let financials = normalizer.normalize(&raw).unwrap();
        let metrics = normalizer.metrics(&financials);

        assert_eq!(metrics.historical_growth, 0.0);
        assert_eq!(metrics.da_ratio, 0.03);
        assert_eq!(metrics.wc_ratio, 0.0);
        assert_eq!(metrics.capex_ratio, None);
        assert_eq!(metrics.tax_rate, 0.30);
        assert_eq!(metrics.pretax_cost_of_debt, 0.06);
        assert_eq!(financials.shares_outstanding(), 0.0);
    }

    #[test]
    fn test_gap_truncates_to_trailing_run() {
        let raw = RawStatements {
            current_price: Some(10.0),
            beta: Some(1.0),
            ..RawStatements::new("GAPPY")
        }
        .with_line_item(
            StatementKind::IncomeStatement,
            "Total Revenue",
            [(2019, 80.0), (2021, 100.0), (2022, 110.0), (2023, 120.0)],
        )
        .with_line_item(
            StatementKind::IncomeStatement,
            "EBIT",
            [(2019, 8.0), (2021, 10.0), (2022, 11.0), (2023, 12.0)],
        );

        let financials = FinancialsNormalizer::default().normalize(&raw).unwrap();
        let years: Vec<i32> = financials.years().iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
    }

    #[test]
    fn test_two_years_uses_simple_growth() {
        let raw = RawStatements {
            current_price: Some(10.0),
            beta: Some(1.0),
            ..RawStatements::new("TWO")
        }
        .with_line_item(
            StatementKind::IncomeStatement,
            "Total Revenue",
            [(2023, 200.0), (2024, 250.0)],
        )
        .with_line_item(StatementKind::IncomeStatement, "EBIT", [(2023, 20.0), (2024, 30.0)]);

        let financials = FinancialsNormalizer::default().normalize(&raw).unwrap();
        assert_relative_eq!(financials.historical_growth(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_ebit_is_insufficient() {
        let raw = RawStatements {
            current_price: Some(10.0),
            beta: Some(1.0),
            ..RawStatements::new("NOEBIT")
        }
        .with_line_item(StatementKind::IncomeStatement, "Total Revenue", [(2024, 100.0)]);

        let result = FinancialsNormalizer::default().normalize(&raw);
        assert!(matches!(result, Err(ValuationError::InsufficientData(_))));
    }

    #[test]
    fn test_non_positive_revenue_is_insufficient() {
        let raw = RawStatements {
            current_price: Some(10.0),
            beta: Some(1.0),
            ..RawStatements::new("ZERO")
        }
        .with_line_item(
            StatementKind::IncomeStatement,
            "Total Revenue",
            [(2023, 0.0), (2024, 100.0)],
        )
        .with_line_item(StatementKind::IncomeStatement, "EBIT", [(2023, -5.0), (2024, 10.0)]);

        let result = FinancialsNormalizer::default().normalize(&raw);
        assert!(matches!(result, Err(ValuationError::InsufficientData(_))));
    }

    #[test]
    fn test_missing_beta_is_insufficient() {
        let mut raw = raw_company();
        raw.beta = None;

        let err = FinancialsNormalizer::default().normalize(&raw).unwrap_err();
        assert!(err.to_string().contains("beta"));
    }

    #[test]
    fn test_normalize_does_not_mutate_input() {
        let raw = raw_company();
        let before = raw.clone();
        let _ = FinancialsNormalizer::default().normalize(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_shares_fall_back_to_market_cap() {
        let mut raw = raw_company();
        raw.shares_outstanding = None;
        raw.market_cap = Some(5000.0);

        let financials = FinancialsNormalizer::default().normalize(&raw).unwrap();
        assert_relative_eq!(financials.shares_outstanding(), 200.0);
    }

    #[test]
    fn test_balance_sheet_carries_last_reported_value() {
        let raw = RawStatements {
            current_price: Some(10.0),
            beta: Some(1.0),
            shares_outstanding: Some(100.0),
            ..RawStatements::new("STALE")
        }
        .with_line_item(
            StatementKind::IncomeStatement,
            "Total Revenue",
            [(2022, 1000.0), (2023, 1100.0), (2024, 1210.0)],
        )
        .with_line_item(
            StatementKind::IncomeStatement,
            "EBIT",
            [(2022, 100.0), (2023, 110.0), (2024, 121.0)],
        )
        .with_line_item(StatementKind::BalanceSheet, "Total Debt", [(2022, 800.0), (2023, 800.0)])
        .with_line_item(StatementKind::BalanceSheet, "Cash", [(2022, 50.0)]);

        let financials = FinancialsNormalizer::default().normalize(&raw).unwrap();
        let latest = financials.latest().unwrap();

        assert_eq!(latest.year, 2024);
        assert_relative_eq!(latest.total_debt, 800.0);
        assert_relative_eq!(financials.net_debt(), 750.0);
    }

    #[test]
    fn test_as_of_ignores_later_values() {
        let series: BTreeMap<i32, f64> = [(2021, 1.0), (2023, 3.0)].into_iter().collect();
        assert_eq!(as_of(&series, 2020), None);
        assert_eq!(as_of(&series, 2022), Some(1.0));
        assert_eq!(as_of(&series, 2023), Some(3.0));
        assert_eq!(as_of(&series, 2030), Some(3.0));
    }

    #[test]
    fn test_deserialize_validates_history() {
        let empty = r#"{"symbol":"X","name":"X","current_price":10.0,"beta":1.0,"years":[]}"#;
        let err = serde_json::from_str::<CompanyFinancials>(empty).unwrap_err();
        assert!(err.to_string().contains("no fiscal year"));

        let financials = FinancialsNormalizer::default()
            .normalize(&raw_company())
            .unwrap();
        let json = serde_json::to_string(&financials).unwrap();
        let decoded: CompanyFinancials = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.symbol(), "ACME");
        assert_eq!(decoded.years().len(), 4);
    }

    #[test]
    fn test_company_financials_rejects_gaps() {
        let year = |year: i32| FiscalYear {
            year,
            revenue: 100.0,
            ebit: 10.0,
            depreciation_amortization: None,
            working_capital: None,
            capex: None,
            tax_provision: None,
            pretax_income: None,
            interest_expense: None,
            total_debt: 0.0,
            net_debt: 0.0,
            shares_outstanding: 1.0,
        };

        let result = CompanyFinancials::new("X", "X", 1.0, 1.0, vec![year(2020), year(2022)]);
        assert!(matches!(result, Err(ValuationError::InsufficientData(_))));
    }
}
