//! Reading period/amount lists typed by a person.
//!
//! Two layouts are accepted, separated by `;`, `|` or line breaks:
//!
//! - twelve positional values, January first: `0; 0; 60.000,00; 0; ...`
//! - `period=amount` pairs in any order: `3=60000; 7=1.250,50`
//!
//! Amounts may be written plainly (`60000.50`) or in Brazilian notation
//! (`60.000,50`). At most two decimal places are allowed.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{ParseError, TaxError};
use crate::models::{Period, PeriodAmounts};

static PLAIN_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d{1,2})?$").expect("plain amount pattern"));

static BRAZILIAN_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,3}(?:\.\d{3})*|\d+)(?:,\d{1,2})?$").expect("brazilian amount pattern")
});

/// Parses a single amount token.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::input::parse_amount;
///
/// assert_eq!(parse_amount("60.000,50"), Ok(dec!(60000.50)));
/// assert_eq!(parse_amount("60000.50"), Ok(dec!(60000.50)));
/// assert!(parse_amount("sixty").is_err());
/// ```
///
/// # Errors
///
/// [`ParseError::MalformedNumber`] for text that is not an amount and
/// [`TaxError::InvalidAmount`] for a negative amount.
pub fn parse_amount(token: &str) -> Result<Decimal, TaxError> {
    parse_amount_at(token, 1)
}

fn parse_amount_at(
    token: &str,
    position: usize,
) -> Result<Decimal, TaxError> {
    let token = token.trim();
    let malformed = || ParseError::MalformedNumber {
        token: token.to_string(),
        position,
    };

    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, token),
    };

    let amount: Decimal = if PLAIN_AMOUNT.is_match(digits) {
        digits.parse().map_err(|_| malformed())?
    } else if BRAZILIAN_AMOUNT.is_match(digits) {
        digits
            .replace('.', "")
            .replace(',', ".")
            .parse()
            .map_err(|_| malformed())?
    } else {
        return Err(malformed().into());
    };

    if negative && !amount.is_zero() {
        return Err(TaxError::InvalidAmount {
            field: "amount",
            value: token.to_string(),
        });
    }
    Ok(amount)
}

/// Parses a year of per-period amounts from delimited text.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::Period;
/// use irpf_core::input::parse_period_amounts;
///
/// let amounts = parse_period_amounts("3=60.000,00; 7=1250.50").unwrap();
/// assert_eq!(amounts[&Period::new(3).unwrap()], dec!(60000.00));
/// assert_eq!(amounts.len(), 2);
/// ```
///
/// # Errors
///
/// - [`TaxError::Parse`] for empty input, a positional list that is not
///   twelve values long, malformed numbers or pairs, or repeated periods.
/// - [`TaxError::InvalidPeriod`] for a pair whose period is outside `[1, 12]`.
/// - [`TaxError::InvalidAmount`] for a negative amount.
pub fn parse_period_amounts(text: &str) -> Result<PeriodAmounts, TaxError> {
    let tokens: Vec<&str> = text
        .split([';', '|', '\n'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(ParseError::Empty.into());
    }

    if tokens.iter().any(|t| t.contains('=')) {
        parse_pairs(&tokens)
    } else {
        parse_positional(&tokens)
    }
}

fn parse_positional(tokens: &[&str]) -> Result<PeriodAmounts, TaxError> {
    if tokens.len() != Period::COUNT {
        return Err(ParseError::WrongValueCount {
            expected: Period::COUNT,
            found: tokens.len(),
        }
        .into());
    }

    Period::all()
        .zip(tokens)
        .enumerate()
        .map(|(index, (period, token))| Ok((period, parse_amount_at(token, index + 1)?)))
        .collect()
}

fn parse_pairs(tokens: &[&str]) -> Result<PeriodAmounts, TaxError> {
    let mut amounts = PeriodAmounts::new();

    for (index, token) in tokens.iter().enumerate() {
        let (period, amount) = token
            .split_once('=')
            .ok_or_else(|| ParseError::MalformedPair(token.to_string()))?;
        let month: u32 = period
            .trim()
            .parse()
            .map_err(|_| ParseError::MalformedPair(token.to_string()))?;
        let period = Period::new(month)?;
        let amount = parse_amount_at(amount, index + 1)?;

        if amounts.insert(period, amount).is_some() {
            return Err(ParseError::DuplicatePeriod(month).into());
        }
    }

    Ok(amounts)
}
