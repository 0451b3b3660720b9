//! Raw financial statement snapshots.
//!
//! A [`RawStatements`] is exactly what a provider hands back: line items
//! keyed by label and fiscal year, with gaps and nulls left in place.
//! Cleaning happens downstream in the normalizer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Line items of one statement: label -> fiscal year -> value.
///
/// `None` marks an explicit null reported by the provider.
pub type LineItems = BTreeMap<String, BTreeMap<i32, Option<f64>>>;

/// The three statements a provider returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Income statement
    IncomeStatement,
    /// Balance sheet
    BalanceSheet,
    /// Cash flow statement
    CashFlow,
}

/// Statement data and market snapshot for a single ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawStatements {
    /// Ticker symbol
    pub symbol: String,
    /// Company display name
    #[serde(default)]
    pub name: Option<String>,
    /// Latest market price
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Equity beta
    #[serde(default)]
    pub beta: Option<f64>,
    /// Current shares outstanding
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    /// Current market capitalization
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Income statement line items
    #[serde(default)]
    pub income_statement: LineItems,
    /// Balance sheet line items
    #[serde(default)]
    pub balance_sheet: LineItems,
    /// Cash flow line items
    #[serde(default)]
    pub cash_flow: LineItems,
}

impl RawStatements {
    /// Create an empty snapshot for a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Name to display, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.symbol)
    }

    /// Borrow the line items of one statement.
    pub const fn statement(&self, kind: StatementKind) -> &LineItems {
        match kind {
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    /// Mutably borrow the line items of one statement.
    pub const fn statement_mut(&mut self, kind: StatementKind) -> &mut LineItems {
        match kind {
            StatementKind::IncomeStatement => &mut self.income_statement,
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::CashFlow => &mut self.cash_flow,
        }
    }

    /// Set a single line-item value.
    pub fn set(
        &mut self,
        kind: StatementKind,
        label: impl Into<String>,
        fiscal_year: i32,
        value: Option<f64>,
    ) {
        self.statement_mut(kind)
            .entry(label.into())
            .or_default()
            .insert(fiscal_year, value);
    }

    /// Builder-style variant of [`RawStatements::set`].
    pub fn with_line_item(
        mut self,
        kind: StatementKind,
        label: impl Into<String>,
        values: impl IntoIterator<Item = (i32, f64)>,
    ) -> Self {
        let label = label.into();
        for (year, value) in values {
            self.set(kind, label.clone(), year, Some(value));
        }
        self
    }

    /// Non-null, finite values of one label, ordered by fiscal year.
    pub fn series(&self, kind: StatementKind, label: &str) -> BTreeMap<i32, f64> {
        self.statement(kind)
            .get(label)
            .map(|by_year| {
                by_year
                    .iter()
                    .filter_map(|(&year, value)| {
                        value.filter(|v| v.is_finite()).map(|v| (year, v))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Series of the first label in `labels` that has any usable value.
    ///
    /// Returns an empty map when none of the labels resolve.
    pub fn first_series(&self, kind: StatementKind, labels: &[&str]) -> BTreeMap<i32, f64> {
        labels
            .iter()
            .map(|label| self.series(kind, label))
            .find(|series| !series.is_empty())
            .unwrap_or_default()
    }

    /// Every fiscal year mentioned by any statement.
    pub fn fiscal_years(&self) -> BTreeSet<i32> {
        [&self.income_statement, &self.balance_sheet, &self.cash_flow]
            .into_iter()
            .flat_map(|items| items.values())
            .flat_map(|by_year| by_year.keys().copied())
            .collect()
    }
}
