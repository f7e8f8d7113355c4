//! Multi-line worksheets that chain the calculators into a full monthly
//! withholding or year-end settlement.

pub mod annual_settlement;
pub mod monthly_withholding;

pub use annual_settlement::{
    AnnualSettlementInput, AnnualSettlementResult, AnnualSettlementWorksheet,
};
pub use monthly_withholding::{
    MonthlyWithholdingInput, MonthlyWithholdingResult, MonthlyWithholdingWorksheet,
};
