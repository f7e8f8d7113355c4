//! Helpers shared by every calculator: cent rounding, flooring, capping and
//! input validation for monetary amounts.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::TaxError;

/// Rounds to cents, half away from zero.
///
/// # Arguments
///
/// * `value` - The amount to round
///
/// # Returns
///
/// The value rounded to two decimal places.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(358.065)), dec!(358.07));
/// assert_eq!(round_half_up(dec!(358.064)), dec!(358.06));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two amounts.
///
/// # Arguments
///
/// * `a` - First amount
/// * `b` - Second amount
///
/// # Returns
///
/// The larger of the two values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::calculations::common::max;
///
/// assert_eq!(max(dec!(-0.50), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the smaller of two amounts.
///
/// # Arguments
///
/// * `a` - First amount
/// * `b` - Second amount
///
/// # Returns
///
/// The smaller of the two values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::calculations::common::min;
///
/// assert_eq!(min(dec!(24000.00), dec!(16754.34)), dec!(16754.34));
/// ```
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Rejects negative amounts, naming the offending input.
///
/// # Arguments
///
/// * `field` - Name of the input, reported in the error
/// * `value` - The amount to check
///
/// # Returns
///
/// `value` unchanged when it is zero or positive.
pub fn ensure_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, TaxError> {
    if value < Decimal::ZERO {
        Err(TaxError::invalid_amount(field, value))
    } else {
        Ok(value)
    }
}

/// Adds two amounts, failing instead of overflowing.
///
/// # Arguments
///
/// * `field` - Name of the result, reported in the error
/// * `a` - First amount
/// * `b` - Second amount
///
/// # Returns
///
/// `a + b`, or [`TaxError::InvalidAmount`] when the sum does not fit in a
/// [`Decimal`].
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use irpf_core::calculations::common::checked_add;
///
/// assert_eq!(checked_add("total", dec!(1.50), dec!(2.25)), Ok(dec!(3.75)));
/// assert!(checked_add("total", Decimal::MAX, dec!(1)).is_err());
/// ```
pub fn checked_add(
    field: &'static str,
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, TaxError> {
    a.checked_add(b).ok_or_else(|| TaxError::InvalidAmount {
        field,
        value: format!("{a} + {b} exceeds the largest representable amount"),
    })
}

/// Sums amounts with [`checked_add`].
///
/// # Arguments
///
/// * `field` - Name of the total, reported in the error
/// * `values` - The amounts to add
///
/// # Returns
///
/// The total, or [`TaxError::InvalidAmount`] on overflow.
pub fn checked_sum<I>(
    field: &'static str,
    values: I,
) -> Result<Decimal, TaxError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| checked_add(field, total, value))
}

/// Converts a floating-point amount from a collaborator into a [`Decimal`].
///
/// NaN, infinities and negative values are rejected.
///
/// ```
/// use irpf_core::TaxError;
/// use irpf_core::calculations::common::amount_from_f64;
///
/// assert!(amount_from_f64("income", 8000.0).is_ok());
/// assert!(matches!(
///     amount_from_f64("income", f64::NAN),
///     Err(TaxError::InvalidAmount { field: "income", .. })
/// ));
/// ```
pub fn amount_from_f64(
    field: &'static str,
    value: f64,
) -> Result<Decimal, TaxError> {
    if !value.is_finite() {
        return Err(TaxError::InvalidAmount {
            field,
            value: value.to_string(),
        });
    }
    let amount = Decimal::try_from(value).map_err(|_| TaxError::InvalidAmount {
        field,
        value: value.to_string(),
    })?;
    ensure_non_negative(field, amount)
}
