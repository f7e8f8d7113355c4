//! Year-end settlement worksheet.
//!
//! Reconciles the tax withheld during the year with the tax due on the annual
//! return, then runs the minimum-tax check on the taxpayer's total income.
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Taxable income for the year |
//! | 2    | Itemized deductions |
//! | 3    | Simplified discount: income × rate, limited to the cap |
//! | 4    | Deduction used: larger of line 2 and line 3 |
//! | 5    | Taxable base (line 1 − line 4, minimum 0) |
//! | 6    | Tax from the annual table |
//! | 7    | Annual reduction on line 1, limited to line 6 |
//! | 8    | Tax assessed (line 6 − line 7) |
//! | 9    | Tax withheld during the year |
//! | 10   | Balance due (line 8 − line 9, minimum 0) |
//! | 11   | Refund due (line 9 − line 8, minimum 0) |
//! | 12   | Dividend withholding for the twelve periods |
//! | 13   | Total income: line 1 + exempt income + dividends |
//! | 14   | Minimum-tax supplementary due on line 13 |
//! | 15   | Total due (line 10 + line 14) |

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::bracket::{compute_tax, taxable_base};
use crate::calculations::common::{
    checked_add, checked_sum, ensure_non_negative, max, min, round_half_up,
};
use crate::calculations::dividend::{DividendWithholding, dividend_withholding};
use crate::calculations::minimum_tax::{MinimumTaxAssessment, minimum_rate, minimum_tax_due};
use crate::calculations::reduction::annual_reduction;
use crate::error::TaxError;
use crate::models::{PeriodAmounts, RateBundle, TaxYearTables};

/// Amounts the taxpayer reports for the year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnualSettlementInput {
    /// Income subject to the progressive table.
    pub taxable_income: Decimal,
    pub itemized_deductions: Decimal,
    /// Tax withheld on taxable income during the year.
    pub tax_withheld: Decimal,
    /// Exempt or exclusively taxed income other than dividends.
    pub exempt_income: Decimal,
    /// Dividends received, by month.
    pub dividends: PeriodAmounts,
    /// Caller's approximation of the distributing company's effective rate.
    pub corporate_effective_rate: Decimal,
    pub nominal_benchmark_rate: Decimal,
}

/// Result of the annual settlement worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnualSettlementResult {
    pub deduction: Decimal,
    pub used_simplified_discount: bool,
    pub taxable_base: Decimal,
    pub table_tax: Decimal,
    pub reduction: Decimal,
    pub tax_assessed: Decimal,
    pub balance_due: Decimal,
    pub refund_due: Decimal,
    pub dividends: DividendWithholding,
    pub annual_total_income: Decimal,
    /// `None` when the year has no minimum-tax rule.
    pub minimum_tax: Option<MinimumTaxAssessment>,
    pub total_due: Decimal,
}

/// Calculator for the annual settlement under one year's tables.
#[derive(Debug, Clone)]
pub struct AnnualSettlementWorksheet<'a> {
    tables: &'a TaxYearTables,
}

impl<'a> AnnualSettlementWorksheet<'a> {
    pub fn new(tables: &'a TaxYearTables) -> Self {
        Self { tables }
    }

    /// Runs every line of the worksheet.
    ///
    /// The personal rate fed to the minimum-tax check is the minimum rate the
    /// year's ramp assigns to the total income.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidAmount`] for negative amounts or totals too
    /// large to represent, [`TaxError::InvalidRate`] for rates outside `[0, 1]`, or a schedule
    /// error if the tables are inconsistent.
    pub fn calculate(
        &self,
        input: &AnnualSettlementInput,
    ) -> Result<AnnualSettlementResult, TaxError> {
        let taxable_income = ensure_non_negative("taxable_income", input.taxable_income)?;
        let itemized = ensure_non_negative("itemized_deductions", input.itemized_deductions)?;
        let tax_withheld = ensure_non_negative("tax_withheld", input.tax_withheld)?;
        let exempt_income = ensure_non_negative("exempt_income", input.exempt_income)?;

        let (deduction, used_simplified_discount) =
            self.determine_deduction(taxable_income, itemized);
        let taxable_base = taxable_base(taxable_income, deduction)?;
        let table_tax = round_half_up(compute_tax(taxable_base, &self.tables.annual)?);
        let reduction = self.applied_reduction(taxable_income, table_tax)?;
        let tax_assessed = max(table_tax - reduction, Decimal::ZERO);

        let balance_due = max(tax_assessed - tax_withheld, Decimal::ZERO);
        let refund_due = max(tax_withheld - tax_assessed, Decimal::ZERO);

        let dividends = dividend_withholding(&input.dividends, &self.tables.dividend_withholding)?;
        let dividends_received = checked_sum("dividends", input.dividends.values().copied())?;
        let annual_total_income = checked_sum(
            "annual_total_income",
            [taxable_income, exempt_income, dividends_received],
        )?;

        let minimum_tax = self.minimum_tax(
            annual_total_income,
            tax_assessed,
            dividends.total,
            input,
        )?;
        let supplementary_due = minimum_tax
            .as_ref()
            .map_or(Decimal::ZERO, |m| m.supplementary_due);
        let total_due = checked_add("total_due", balance_due, supplementary_due)?;

        Ok(AnnualSettlementResult {
            deduction,
            used_simplified_discount,
            taxable_base,
            table_tax,
            reduction,
            tax_assessed,
            balance_due,
            refund_due,
            dividends,
            annual_total_income,
            minimum_tax,
            total_due,
        })
    }

    /// Simplified discount for the year's income.
    fn simplified_discount(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let discount = &self.tables.annual_simplified_discount;
        round_half_up(min(taxable_income * discount.rate, discount.cap))
    }

    /// Itemized deductions, unless the simplified discount is larger.
    fn determine_deduction(
        &self,
        taxable_income: Decimal,
        itemized: Decimal,
    ) -> (Decimal, bool) {
        let simplified = self.simplified_discount(taxable_income);
        if simplified > itemized {
            (simplified, true)
        } else {
            (round_half_up(itemized), false)
        }
    }

    fn applied_reduction(
        &self,
        taxable_income: Decimal,
        table_tax: Decimal,
    ) -> Result<Decimal, TaxError> {
        let reduction = round_half_up(annual_reduction(taxable_income, self.tables)?);
        Ok(min(reduction, table_tax))
    }

    fn minimum_tax(
        &self,
        annual_total_income: Decimal,
        tax_assessed: Decimal,
        dividends_withheld: Decimal,
        input: &AnnualSettlementInput,
    ) -> Result<Option<MinimumTaxAssessment>, TaxError> {
        let Some(rule) = &self.tables.minimum_tax else {
            return Ok(None);
        };

        let rates = RateBundle {
            corporate_effective_rate: input.corporate_effective_rate,
            personal_effective_rate: minimum_rate(annual_total_income, rule),
            nominal_benchmark_rate: input.nominal_benchmark_rate,
        };

        minimum_tax_due(
            annual_total_income,
            tax_assessed,
            dividends_withheld,
            &rates,
            rule,
        )
        .map(Some)
    }
}
