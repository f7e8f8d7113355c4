//! Applying a bracket schedule to a taxable base.
//!
//! Every table in the system, monthly, annual or dividend withholding, goes
//! through [`compute_tax`]. Tables are collapsed marginal schedules: each row
//! carries a rate and a subtractor so that the tax for a base inside the row is
//! `base × rate − subtractor`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use irpf_core::{Bracket, BracketSchedule, ScheduleKind};
//! use irpf_core::calculations::{compute_tax, taxable_base};
//!
//! let monthly = BracketSchedule::new(
//!     2022,
//!     ScheduleKind::Monthly,
//!     vec![
//!         Bracket::new(Some(dec!(1903.98)), dec!(0), dec!(0)),
//!         Bracket::new(Some(dec!(2826.65)), dec!(0.075), dec!(142.80)),
//!         Bracket::new(Some(dec!(3751.05)), dec!(0.15), dec!(354.80)),
//!         Bracket::new(Some(dec!(4664.68)), dec!(0.225), dec!(636.13)),
//!         Bracket::new(None, dec!(0.275), dec!(869.36)),
//!     ],
//! )
//! .unwrap();
//!
//! let base = taxable_base(dec!(8500.00), dec!(500.00)).unwrap();
//! assert_eq!(compute_tax(base, &monthly), Ok(dec!(1330.64)));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{ensure_non_negative, max};
use crate::error::{ScheduleDefect, TaxError};
use crate::models::BracketSchedule;

/// Gross income minus deductions, floored at zero.
///
/// # Arguments
///
/// * `gross_income` - Income before deductions
/// * `deductions` - Total deductions claimed
///
/// # Returns
///
/// `gross_income - deductions`, or zero if deductions exceed income.
///
/// # Errors
///
/// Returns [`TaxError::InvalidAmount`] if either input is negative.
pub fn taxable_base(
    gross_income: Decimal,
    deductions: Decimal,
) -> Result<Decimal, TaxError> {
    let gross_income = ensure_non_negative("gross_income", gross_income)?;
    let deductions = ensure_non_negative("deductions", deductions)?;
    Ok(max(gross_income - deductions, Decimal::ZERO))
}

/// Tax on `base` under `schedule`, floored at zero and not rounded.
///
/// The first bracket whose upper bound is at or above `base` is used, so a
/// base sitting exactly on a published bound is taxed by the lower bracket.
///
/// # Arguments
///
/// * `base` - Taxable base for the schedule's period
/// * `schedule` - Validated bracket schedule to apply
///
/// # Returns
///
/// `base × rate − subtractor` for the matching bracket at full precision,
/// or zero when that is negative.
///
/// # Errors
///
/// Returns [`TaxError::InvalidAmount`] if `base` is negative.
pub fn compute_tax(
    base: Decimal,
    schedule: &BracketSchedule,
) -> Result<Decimal, TaxError> {
    let base = ensure_non_negative("base", base)?;

    let bracket = schedule
        .bracket_for(base)
        .ok_or(ScheduleDefect::MissingUnboundedTail)?;

    Ok(max(bracket.raw_tax(base), Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::fixtures::{legacy_monthly, tables_2026};

    // =========================================================================
    // taxable_base tests
    // =========================================================================

    #[test]
    fn taxable_base_subtracts_deductions() {
        let result = taxable_base(dec!(8000.00), dec!(1200.00));

        assert_eq!(result, Ok(dec!(6800.00)));
    }

    #[test]
    fn taxable_base_floors_at_zero() {
        let result = taxable_base(dec!(1000.00), dec!(1500.00));

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn taxable_base_rejects_negative_deductions() {
        let result = taxable_base(dec!(1000.00), dec!(-1.00));

        assert_eq!(
            result,
            Err(TaxError::InvalidAmount {
                field: "deductions",
                value: "-1.00".to_string()
            })
        );
    }

    #[test]
    fn taxable_base_rejects_negative_gross_income() {
        let result = taxable_base(dec!(-1.00), dec!(0));

        assert!(matches!(
            result,
            Err(TaxError::InvalidAmount {
                field: "gross_income",
                ..
            })
        ));
    }

    // =========================================================================
    // compute_tax tests
    // =========================================================================

    #[test]
    fn compute_tax_is_zero_for_zero_base() {
        let result = compute_tax(dec!(0), &legacy_monthly());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn compute_tax_top_bracket() {
        let result = compute_tax(dec!(8000.00), &legacy_monthly());

        // 8000 × 27.5% − 869.36
        assert_eq!(result, Ok(dec!(1330.64)));
    }

    #[test]
    fn compute_tax_middle_bracket() {
        let result = compute_tax(dec!(3000.00), &legacy_monthly());

        // 3000 × 15% − 354.80
        assert_eq!(result, Ok(dec!(95.20)));
    }

    #[test]
    fn compute_tax_exempt_bound_is_zero() {
        let result = compute_tax(dec!(1903.98), &legacy_monthly());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn compute_tax_floors_negative_formula_at_zero() {
        // 1903.99 × 7.5% − 142.80 = −0.00075
        let result = compute_tax(dec!(1903.99), &legacy_monthly());

        assert_eq!(result, Ok(dec!(0)));
    }

    #[test]
    fn compute_tax_one_cent_above_2026_exempt_bound() {
        let monthly = tables_2026().monthly;

        assert_eq!(compute_tax(dec!(2428.80), &monthly), Ok(dec!(0)));
        assert_eq!(
            compute_tax(dec!(2428.81), &monthly),
            Ok(dec!(2428.81) * dec!(0.075) - dec!(182.16))
        );
        assert!(compute_tax(dec!(2428.81), &monthly).unwrap() > Decimal::ZERO);
    }

    #[test]
    fn compute_tax_on_boundary_uses_lower_bracket() {
        let result = compute_tax(dec!(2826.65), &legacy_monthly());

        // 2826.65 × 7.5% − 142.80, not the 15% formula
        assert_eq!(result, Ok(dec!(69.19875)));
    }

    #[test]
    fn compute_tax_rejects_negative_base() {
        let result = compute_tax(dec!(-0.01), &legacy_monthly());

        assert!(matches!(
            result,
            Err(TaxError::InvalidAmount { field: "base", .. })
        ));
    }
}
