//! Income-based reduction credit (redutor).
//!
//! The credit depends on gross income and is capped at the tax the
//! progressive table would charge on that income, so it can bring the tax
//! down to zero but never below. Monthly and annual credits are separate
//! entry points because they use different tables and different rules.

use rust_decimal::Decimal;

use crate::calculations::bracket::compute_tax;
use crate::calculations::common::{ensure_non_negative, max, min, round_half_up};
use crate::error::TaxError;
use crate::models::{BracketSchedule, ReductionRule, ScheduleKind, TaxYearTables};

/// Monthly reduction for `income`, using the monthly table and rule.
///
/// Returns zero when the year has no monthly reduction rule.
///
/// # Example
///
/// ```
/// # use chrono::NaiveDate;
/// # use rust_decimal_macros::dec;
/// # use irpf_core::*;
/// # let tables = TaxYearTables {
/// #     tax_year: 2026,
/// #     effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
/// #     monthly: BracketSchedule::new(2026, ScheduleKind::Monthly, vec![
/// #         Bracket::new(Some(dec!(2428.80)), dec!(0), dec!(0)),
/// #         Bracket::new(Some(dec!(2826.65)), dec!(0.075), dec!(182.16)),
/// #         Bracket::new(Some(dec!(3751.05)), dec!(0.15), dec!(394.16)),
/// #         Bracket::new(Some(dec!(4664.68)), dec!(0.225), dec!(675.49)),
/// #         Bracket::new(None, dec!(0.275), dec!(908.73)),
/// #     ]).unwrap(),
/// #     annual: BracketSchedule::new(2026, ScheduleKind::Annual, vec![
/// #         Bracket::new(None, dec!(0), dec!(0)),
/// #     ]).unwrap(),
/// #     dividend_withholding: BracketSchedule::new(2026, ScheduleKind::DividendWithholding, vec![
/// #         Bracket::new(None, dec!(0), dec!(0)),
/// #     ]).unwrap(),
/// #     monthly_reduction: Some(ReductionRule {
/// #         full_relief_ceiling: dec!(5000.00),
/// #         full_relief: dec!(312.89),
/// #         phase_out_ceiling: dec!(7350.00),
/// #         phase_out_constant: dec!(978.62),
/// #         phase_out_rate: dec!(0.133145),
/// #     }),
/// #     annual_reduction: None,
/// #     monthly_simplified_discount: dec!(607.20),
/// #     annual_simplified_discount: AnnualSimplifiedDiscount { rate: dec!(0.20), cap: dec!(16754.34) },
/// #     minimum_tax: None,
/// # };
/// use irpf_core::calculations::monthly_reduction;
///
/// // Phase-out: 978.62 − 0.133145 × 6000
/// assert_eq!(monthly_reduction(dec!(6000.00), &tables), Ok(dec!(179.75)));
/// // Capped at the table tax: 3000 × 15% − 394.16
/// assert_eq!(monthly_reduction(dec!(3000.00), &tables), Ok(dec!(55.84)));
/// ```
///
/// # Errors
///
/// Returns [`TaxError::InvalidAmount`] for negative income, or an error if
/// the monthly slot holds a schedule of another kind or the rule is invalid.
pub fn monthly_reduction(
    income: Decimal,
    tables: &TaxYearTables,
) -> Result<Decimal, TaxError> {
    tables.monthly.ensure_kind(ScheduleKind::Monthly)?;
    capped_reduction(income, tables.monthly_reduction.as_ref(), &tables.monthly)
}

/// Annual reduction for `income`, using the annual table and rule.
///
/// Returns zero when the year has no annual reduction rule.
///
/// # Errors
///
/// Returns [`TaxError::InvalidAmount`] for negative income, or an error if
/// the annual slot holds a schedule of another kind or the rule is invalid.
pub fn annual_reduction(
    income: Decimal,
    tables: &TaxYearTables,
) -> Result<Decimal, TaxError> {
    tables.annual.ensure_kind(ScheduleKind::Annual)?;
    capped_reduction(income, tables.annual_reduction.as_ref(), &tables.annual)
}

fn capped_reduction(
    income: Decimal,
    rule: Option<&ReductionRule>,
    schedule: &BracketSchedule,
) -> Result<Decimal, TaxError> {
    let income = ensure_non_negative("income", income)?;
    let table_tax = compute_tax(income, schedule)?;

    let Some(rule) = rule else {
        return Ok(Decimal::ZERO);
    };
    rule.validate()?;

    Ok(min(rule_amount(income, rule), table_tax))
}

/// Uncapped credit the rule grants at `income`.
fn rule_amount(
    income: Decimal,
    rule: &ReductionRule,
) -> Decimal {
    if income <= rule.full_relief_ceiling {
        rule.full_relief
    } else if income <= rule.phase_out_ceiling {
        max(
            round_half_up(rule.phase_out_constant - rule.phase_out_rate * income),
            Decimal::ZERO,
        )
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::fixtures::{tables_2026, tables_legacy};

    // =========================================================================
    // monthly_reduction tests
    // =========================================================================

    #[test]
    fn monthly_reduction_is_zero_below_exempt_bound() {
        let result = monthly_reduction(dec!(2000.00), &tables_2026());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn monthly_reduction_is_capped_at_table_tax() {
        let result = monthly_reduction(dec!(3000.00), &tables_2026());

        // 3000 × 15% − 394.16 = 55.84 < 312.89
        assert_eq!(result, Ok(dec!(55.84)));
    }

    #[test]
    fn monthly_reduction_full_relief_at_ceiling() {
        let result = monthly_reduction(dec!(5000.00), &tables_2026());

        assert_eq!(result, Ok(dec!(312.89)));
    }

    #[test]
    fn monthly_reduction_phases_out() {
        let result = monthly_reduction(dec!(7000.00), &tables_2026());

        // 978.62 − 0.133145 × 7000 = 46.605
        assert_eq!(result, Ok(dec!(46.61)));
    }

    #[test]
    fn monthly_reduction_rounds_to_zero_at_phase_out_ceiling() {
        let result = monthly_reduction(dec!(7350.00), &tables_2026());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn monthly_reduction_is_zero_above_phase_out() {
        let result = monthly_reduction(dec!(8000.00), &tables_2026());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn monthly_reduction_is_zero_without_rule() {
        let result = monthly_reduction(dec!(5000.00), &tables_legacy());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn monthly_reduction_rejects_negative_income() {
        let result = monthly_reduction(dec!(-1), &tables_2026());

        assert!(matches!(
            result,
            Err(TaxError::InvalidAmount { field: "income", .. })
        ));
    }

    #[test]
    fn monthly_reduction_refuses_swapped_schedule() {
        let mut tables = tables_2026();
        tables.monthly = tables.annual.clone();

        let result = monthly_reduction(dec!(5000.00), &tables);

        assert!(matches!(result, Err(TaxError::MalformedSchedule(_))));
    }

    // =========================================================================
    // annual_reduction tests
    // =========================================================================

    #[test]
    fn annual_reduction_full_relief_at_ceiling() {
        let result = annual_reduction(dec!(60000.00), &tables_2026());

        assert_eq!(result, Ok(dec!(2694.15)));
    }

    #[test]
    fn annual_reduction_phases_out() {
        let result = annual_reduction(dec!(70000.00), &tables_2026());

        // 8429.73 − 0.095575 × 70000
        assert_eq!(result, Ok(dec!(1739.48)));
    }

    #[test]
    fn annual_reduction_is_capped_at_annual_table_tax() {
        let result = annual_reduction(dec!(30000.00), &tables_2026());

        // 30000 × 7.5% − 2185.92
        assert_eq!(result, Ok(dec!(64.08)));
    }

    #[test]
    fn annual_reduction_uses_annual_table_not_monthly() {
        // 5000 is taxable monthly but exempt on the annual table.
        let monthly = monthly_reduction(dec!(5000.00), &tables_2026());
        let annual = annual_reduction(dec!(5000.00), &tables_2026());

        assert_eq!(monthly, Ok(dec!(312.89)));
        assert_eq!(annual, Ok(dec!(0)));
    }

    #[test]
    fn annual_reduction_is_zero_above_phase_out() {
        let result = annual_reduction(dec!(100000.00), &tables_2026());

        assert_eq!(result, Ok(dec!(0)));
    }
}
