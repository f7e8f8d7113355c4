//! Tax calculations over versioned bracket schedules.
//!
//! Every function here is pure: same inputs, same result, no shared state.

pub mod bracket;
pub mod common;
pub mod dividend;
pub mod minimum_tax;
pub mod reduction;
pub mod worksheets;

#[cfg(test)]
pub(crate) mod fixtures;

pub use bracket::{compute_tax, taxable_base};
pub use dividend::{DividendWithholding, dividend_withholding, period_withholding};
pub use minimum_tax::{MinimumTaxAssessment, minimum_rate, minimum_tax_due};
pub use reduction::{annual_reduction, monthly_reduction};
pub use worksheets::{
    AnnualSettlementInput, AnnualSettlementResult, AnnualSettlementWorksheet,
    MonthlyWithholdingInput, MonthlyWithholdingResult, MonthlyWithholdingWorksheet,
};
