//! Monthly payroll withholding worksheet.
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Gross monthly income |
//! | 2    | Itemized deductions (social security, dependants, alimony...) |
//! | 3    | Deduction used: larger of line 2 and the simplified discount |
//! | 4    | Taxable base (line 1 − line 3, minimum 0) |
//! | 5    | Tax from the monthly table |
//! | 6    | Monthly reduction on line 1, limited to line 5 |
//! | 7    | Tax to withhold (line 5 − line 6) |
//!
//! # Example
//!
//! ```
//! # use chrono::NaiveDate;
//! # use rust_decimal_macros::dec;
//! # use irpf_core::*;
//! # let tables = TaxYearTables {
//! #     tax_year: 2022,
//! #     effective_from: NaiveDate::from_ymd_opt(2015, 4, 1).unwrap(),
//! #     monthly: BracketSchedule::new(2022, ScheduleKind::Monthly, vec![
//! #         Bracket::new(Some(dec!(1903.98)), dec!(0), dec!(0)),
//! #         Bracket::new(Some(dec!(2826.65)), dec!(0.075), dec!(142.80)),
//! #         Bracket::new(Some(dec!(3751.05)), dec!(0.15), dec!(354.80)),
//! #         Bracket::new(Some(dec!(4664.68)), dec!(0.225), dec!(636.13)),
//! #         Bracket::new(None, dec!(0.275), dec!(869.36)),
//! #     ]).unwrap(),
//! #     annual: BracketSchedule::new(2022, ScheduleKind::Annual, vec![
//! #         Bracket::new(None, dec!(0), dec!(0)),
//! #     ]).unwrap(),
//! #     dividend_withholding: BracketSchedule::new(2022, ScheduleKind::DividendWithholding, vec![
//! #         Bracket::new(None, dec!(0), dec!(0)),
//! #     ]).unwrap(),
//! #     monthly_reduction: None,
//! #     annual_reduction: None,
//! #     monthly_simplified_discount: dec!(0),
//! #     annual_simplified_discount: AnnualSimplifiedDiscount { rate: dec!(0.20), cap: dec!(16754.34) },
//! #     minimum_tax: None,
//! # };
//! use irpf_core::calculations::{MonthlyWithholdingInput, MonthlyWithholdingWorksheet};
//!
//! let worksheet = MonthlyWithholdingWorksheet::new(&tables);
//! let result = worksheet
//!     .calculate(&MonthlyWithholdingInput {
//!         gross_income: dec!(8000.00),
//!         itemized_deductions: dec!(0.00),
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.taxable_base, dec!(8000.00));
//! assert_eq!(result.tax_due, dec!(1330.64));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxYearTables;
use crate::calculations::bracket::{compute_tax, taxable_base};
use crate::calculations::common::{ensure_non_negative, max, min, round_half_up};
use crate::calculations::reduction::monthly_reduction;
use crate::error::TaxError;

/// Monthly amounts reported by the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyWithholdingInput {
    pub gross_income: Decimal,
    /// Sum of all legally deductible items for the month.
    pub itemized_deductions: Decimal,
}

/// Result of the monthly withholding worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyWithholdingResult {
    pub deduction: Decimal,
    /// True when the simplified discount beat the itemized deductions.
    pub used_simplified_discount: bool,
    pub taxable_base: Decimal,
    pub table_tax: Decimal,
    pub reduction: Decimal,
    pub tax_due: Decimal,
}

/// Calculator for monthly withholding under one year's tables.
#[derive(Debug, Clone)]
pub struct MonthlyWithholdingWorksheet<'a> {
    tables: &'a TaxYearTables,
}

impl<'a> MonthlyWithholdingWorksheet<'a> {
    pub fn new(tables: &'a TaxYearTables) -> Self {
        Self { tables }
    }

    /// Runs every line of the worksheet.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] for negative inputs, or a schedule
    /// error if the tables are inconsistent.
    pub fn calculate(
        &self,
        input: &MonthlyWithholdingInput,
    ) -> Result<MonthlyWithholdingResult, TaxError> {
        let gross_income = ensure_non_negative("gross_income", input.gross_income)?;
        let itemized = ensure_non_negative("itemized_deductions", input.itemized_deductions)?;

        let (deduction, used_simplified_discount) = self.determine_deduction(itemized);
        let taxable_base = taxable_base(gross_income, deduction)?;
        let table_tax = round_half_up(compute_tax(taxable_base, &self.tables.monthly)?);
        let reduction = self.applied_reduction(gross_income, table_tax)?;
        let tax_due = max(table_tax - reduction, Decimal::ZERO);

        Ok(MonthlyWithholdingResult {
            deduction,
            used_simplified_discount,
            taxable_base,
            table_tax,
            reduction,
            tax_due,
        })
    }

    /// Itemized deductions, unless the simplified discount is larger.
    fn determine_deduction(
        &self,
        itemized: Decimal,
    ) -> (Decimal, bool) {
        let simplified = self.tables.monthly_simplified_discount;
        if simplified > itemized {
            (round_half_up(simplified), true)
        } else {
            (round_half_up(itemized), false)
        }
    }

    /// Reduction on gross income, never more than the tax it offsets.
    fn applied_reduction(
        &self,
        gross_income: Decimal,
        table_tax: Decimal,
    ) -> Result<Decimal, TaxError> {
        let reduction = round_half_up(monthly_reduction(gross_income, self.tables)?);
        Ok(min(reduction, table_tax))
    }
}
