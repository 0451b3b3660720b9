//! Statement line-item labels.
//!
//! Providers label the same economic quantity in different ways. Each
//! constant slice lists the candidate labels in priority order; the first
//! label with at least one non-null value wins.

/// Income statement line items
pub mod income_statement {
    /// Total revenue
    pub const REVENUE: &[&str] = &["Total Revenue", "Revenue", "Operating Revenue"];

    /// Earnings before interest and taxes, falling back to operating income
    pub const EBIT: &[&str] = &["EBIT", "Operating Income"];

    /// Depreciation and amortization
    pub const DEPRECIATION_AMORTIZATION: &[&str] = &[
        "Reconciled Depreciation",
        "Depreciation And Amortization",
        "Depreciation Amortization Depletion",
    ];

    /// Interest expense (sign is ignored)
    pub const INTEREST_EXPENSE: &[&str] = &["Interest Expense", "InterestExpense"];

    /// Income tax expense (sign is ignored)
    pub const TAX_PROVISION: &[&str] = &["Tax Provision", "Income Tax Expense", "IncomeTaxExpense"];

    /// Pretax income
    pub const PRETAX_INCOME: &[&str] = &["Pretax Income", "Income Before Tax", "IncomeBeforeTax"];
}

/// Balance sheet line items
pub mod balance_sheet {
    /// Cash and equivalents
    pub const CASH: &[&str] = &[
        "Cash And Cash Equivalents",
        "Cash",
        "Cash And Short Term Investments",
    ];

    /// Total debt
    pub const TOTAL_DEBT: &[&str] = &["Total Debt"];

    /// Long-term debt, used when total debt is absent
    pub const LONG_TERM_DEBT: &[&str] = &[
        "Long Term Debt",
        "Long Term Debt And Capital Lease Obligation",
    ];

    /// Short-term debt, used when total debt is absent
    pub const SHORT_TERM_DEBT: &[&str] = &["Short Long Term Debt", "Short Term Debt", "Current Debt"];

    /// Net debt as reported
    pub const NET_DEBT: &[&str] = &["Net Debt"];

    /// Working capital as reported
    pub const WORKING_CAPITAL: &[&str] = &["Working Capital"];

    /// Current assets, used to derive working capital
    pub const CURRENT_ASSETS: &[&str] = &["Current Assets"];

    /// Current liabilities, used to derive working capital
    pub const CURRENT_LIABILITIES: &[&str] = &["Current Liabilities"];

    /// Shares outstanding at period end
    pub const SHARES_OUTSTANDING: &[&str] = &["Ordinary Shares Number", "Share Issued"];
}

/// Cash flow statement line items
pub mod cash_flow {
    /// Capital expenditure (usually reported negative)
    pub const CAPITAL_EXPENDITURE: &[&str] = &["Capital Expenditure", "CapitalExpenditures"];
}
