//! Minimum-tax reconciliation for high incomes (IRPFM).
//!
//! This is a simulation on caller-supplied rates. Given the same inputs the
//! result is reproducible to the cent; it makes no claim beyond that
//! arithmetic.
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Minimum rate from the year's ramp and the total annual income |
//! | 2    | Minimum required tax: income × minimum rate, rounded to cents |
//! | 3    | Combined effective rate: corporate + personal |
//! | 4    | Floor applies when the combined rate is below the benchmark |
//! | 5    | Credited tax: tax assessed + dividend withholding |
//! | 6    | Supplementary due: minimum required − credited, floored at zero |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use irpf_core::{MinimumTaxRule, RateBundle};
//! use irpf_core::calculations::minimum_tax_due;
//!
//! let rule = MinimumTaxRule {
//!     exemption_threshold: dec!(600000.00),
//!     full_rate_threshold: dec!(1200000.00),
//!     max_rate: dec!(0.10),
//! };
//! let rates = RateBundle {
//!     corporate_effective_rate: dec!(0.15),
//!     personal_effective_rate: dec!(0.05),
//!     nominal_benchmark_rate: dec!(0.34),
//! };
//!
//! let result = minimum_tax_due(dec!(900000), dec!(20000), dec!(6000), &rates, &rule).unwrap();
//!
//! assert_eq!(result.minimum_required_tax, dec!(45000.00));
//! assert_eq!(result.supplementary_due, dec!(19000.00));
//! ```

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::{checked_add, ensure_non_negative, max, round_half_up};
use crate::error::TaxError;
use crate::models::{MinimumTaxRule, RateBundle};

/// Outcome of the minimum-tax reconciliation, with every intermediate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinimumTaxAssessment {
    pub annual_total_income: Decimal,
    /// Rate from the ramp for `annual_total_income`.
    pub minimum_rate: Decimal,
    pub minimum_required_tax: Decimal,
    pub combined_effective_rate: Decimal,
    pub nominal_benchmark_rate: Decimal,
    /// Whether the combined rate fell short of the benchmark.
    pub floor_applies: bool,
    /// Tax already assessed plus dividend withholding.
    pub credited_tax: Decimal,
    pub supplementary_due: Decimal,
}

/// Minimum rate the ramp assigns to `annual_total_income`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::MinimumTaxRule;
/// use irpf_core::calculations::minimum_rate;
///
/// let rule = MinimumTaxRule {
///     exemption_threshold: dec!(600000.00),
///     full_rate_threshold: dec!(1200000.00),
///     max_rate: dec!(0.10),
/// };
///
/// assert_eq!(minimum_rate(dec!(600000), &rule), dec!(0));
/// assert_eq!(minimum_rate(dec!(900000), &rule), dec!(0.05));
/// assert_eq!(minimum_rate(dec!(2000000), &rule), dec!(0.10));
/// ```
pub fn minimum_rate(
    annual_total_income: Decimal,
    rule: &MinimumTaxRule,
) -> Decimal {
    if annual_total_income <= rule.exemption_threshold {
        Decimal::ZERO
    } else if annual_total_income >= rule.full_rate_threshold {
        rule.max_rate
    } else {
        rule.max_rate * (annual_total_income - rule.exemption_threshold)
            / (rule.full_rate_threshold - rule.exemption_threshold)
    }
}

/// Reconciles tax already paid against the minimum-tax floor.
///
/// # Arguments
///
/// * `annual_total_income` - Taxable, exempt and dividend income for the year
/// * `annual_tax_assessed` - Tax assessed on the annual return
/// * `dividends_withheld_annual` - Dividend tax withheld during the year
/// * `rates` - Effective and benchmark rates
/// * `rule` - The year's minimum-tax ramp
///
/// # Returns
///
/// A [`MinimumTaxAssessment`] whose `supplementary_due` is zero unless the
/// floor applies and the credited tax falls short of the required tax.
///
/// # Errors
///
/// Returns [`TaxError::InvalidAmount`] for any negative amount or credits too
/// large to add up, [`TaxError::InvalidRate`] for a rate outside `[0, 1]`, and
/// [`TaxError::InvalidRule`] for an inconsistent ramp.
pub fn minimum_tax_due(
    annual_total_income: Decimal,
    annual_tax_assessed: Decimal,
    dividends_withheld_annual: Decimal,
    rates: &RateBundle,
    rule: &MinimumTaxRule,
) -> Result<MinimumTaxAssessment, TaxError> {
    let annual_total_income = ensure_non_negative("annual_total_income", annual_total_income)?;
    let annual_tax_assessed = ensure_non_negative("annual_tax_assessed", annual_tax_assessed)?;
    let dividends_withheld_annual =
        ensure_non_negative("dividends_withheld_annual", dividends_withheld_annual)?;
    rates.validate()?;
    rule.validate()?;

    let minimum_rate = minimum_rate(annual_total_income, rule);
    let minimum_required_tax = round_half_up(annual_total_income * minimum_rate);
    let combined_effective_rate = rates.combined_effective_rate();
    let floor_applies = combined_effective_rate < rates.nominal_benchmark_rate;
    let credited_tax = checked_add(
        "credited_tax",
        annual_tax_assessed,
        dividends_withheld_annual,
    )?;

    let supplementary_due = if floor_applies {
        max(minimum_required_tax - credited_tax, Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    Ok(MinimumTaxAssessment {
        annual_total_income,
        minimum_rate,
        minimum_required_tax,
        combined_effective_rate,
        nominal_benchmark_rate: rates.nominal_benchmark_rate,
        floor_applies,
        credited_tax,
        supplementary_due,
    })
}
