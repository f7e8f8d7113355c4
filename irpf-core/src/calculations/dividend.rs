//! Withholding on dividends, period by period.
//!
//! Each month is withheld on its own: the amount for one period never
//! affects another. The annual total is the plain sum of the twelve
//! per-period values, which are already rounded to cents, so the total and
//! the breakdown always agree exactly.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::bracket::compute_tax;
use crate::calculations::common::{checked_sum, ensure_non_negative, round_half_up};
use crate::error::TaxError;
use crate::models::{BracketSchedule, Period, PeriodAmounts, ScheduleKind};

/// Withholding for a full year of dividend payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DividendWithholding {
    /// Sum of every value in `detail`.
    pub total: Decimal,
    /// Withholding for each of the twelve periods, including zero months.
    pub detail: BTreeMap<Period, Decimal>,
}

/// Withholding on a single period's dividends.
///
/// # Arguments
///
/// * `amount` - Dividends paid in the period
/// * `schedule` - The year's dividend withholding schedule
///
/// # Returns
///
/// The withholding rounded half-up to cents.
///
/// # Errors
///
/// Returns an error if `amount` is negative or the schedule is not a
/// dividend withholding schedule.
pub fn period_withholding(
    amount: Decimal,
    schedule: &BracketSchedule,
) -> Result<Decimal, TaxError> {
    schedule.ensure_kind(ScheduleKind::DividendWithholding)?;
    let amount = ensure_non_negative("dividend", amount)?;
    Ok(round_half_up(compute_tax(amount, schedule)?))
}

/// Withholding for every period of the year and its total.
///
/// Periods missing from `monthly_amounts` are treated as zero.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::{Bracket, BracketSchedule, Period, PeriodAmounts, ScheduleKind};
/// use irpf_core::calculations::dividend_withholding;
///
/// let schedule = BracketSchedule::new(
///     2026,
///     ScheduleKind::DividendWithholding,
///     vec![
///         Bracket::new(Some(dec!(50000.00)), dec!(0), dec!(0)),
///         Bracket::new(None, dec!(0.10), dec!(0)),
///     ],
/// )
/// .unwrap();
///
/// let mut amounts = PeriodAmounts::new();
/// amounts.insert(Period::new(3).unwrap(), dec!(60000.00));
///
/// let result = dividend_withholding(&amounts, &schedule).unwrap();
/// assert_eq!(result.total, dec!(6000.00));
/// assert_eq!(result.detail.len(), 12);
/// ```
///
/// # Errors
///
/// Returns [`TaxError::InvalidAmount`] if any amount is negative or the
/// total does not fit in a [`Decimal`], or
/// [`TaxError::MalformedSchedule`] if `schedule` is not a dividend withholding
/// schedule.
pub fn dividend_withholding(
    monthly_amounts: &PeriodAmounts,
    schedule: &BracketSchedule,
) -> Result<DividendWithholding, TaxError> {
    schedule.ensure_kind(ScheduleKind::DividendWithholding)?;

    let detail = Period::all()
        .map(|period| {
            let amount = monthly_amounts
                .get(&period)
                .copied()
                .unwrap_or(Decimal::ZERO);
            period_withholding(amount, schedule).map(|withheld| (period, withheld))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let total = checked_sum("dividend_total", detail.values().copied())?;

    Ok(DividendWithholding { total, detail })
}
