use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::ScheduleKind;

/// Errors returned by every calculator in this crate.
///
/// All calculators fail fast: an invalid input aborts the single call and
/// nothing is clamped except the taxable base and the tax due.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaxError {
    /// A monetary input was negative or not a finite number.
    #[error("invalid amount for {field}: {value}")]
    InvalidAmount { field: &'static str, value: String },

    /// A rate input was outside `[0, 1]`.
    #[error("rate {field} must be between 0 and 1, got {value}")]
    InvalidRate { field: &'static str, value: Decimal },

    /// A period key was outside `[1, 12]`.
    #[error("period must be between 1 and 12, got {0}")]
    InvalidPeriod(u32),

    /// A bracket schedule failed validation.
    #[error("malformed schedule: {0}")]
    MalformedSchedule(#[from] ScheduleDefect),

    /// Reduction or minimum-tax parameters are inconsistent.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Delimited text input could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl TaxError {
    pub(crate) fn invalid_amount(
        field: &'static str,
        value: Decimal,
    ) -> Self {
        Self::InvalidAmount {
            field,
            value: value.to_string(),
        }
    }
}

/// The specific reason a [`BracketSchedule`](crate::BracketSchedule) was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleDefect {
    #[error("schedule has no brackets")]
    Empty,

    #[error("bracket {index} upper bound {bound} is not above the previous bound")]
    Unsorted { index: usize, bound: Decimal },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd { index: usize },

    #[error("last bracket must be unbounded")]
    MissingUnboundedTail,

    #[error("bracket {index} has a negative upper bound {bound}")]
    NegativeBound { index: usize, bound: Decimal },

    #[error("bracket {index} rate must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("bracket {index} subtractor must be non-negative, got {subtractor}")]
    NegativeSubtractor { index: usize, subtractor: Decimal },

    #[error("tax jumps by {gap} at boundary {boundary}")]
    Discontinuous { boundary: Decimal, gap: Decimal },

    #[error("expected a {expected} schedule, got {found}")]
    WrongKind {
        expected: ScheduleKind,
        found: ScheduleKind,
    },

    #[error("expected a schedule for tax year {expected}, got {found}")]
    WrongYear { expected: i32, found: i32 },
}

/// Errors raised while reading period/amount lists from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input is empty")]
    Empty,

    #[error("expected {expected} values, found {found}")]
    WrongValueCount { expected: usize, found: usize },

    #[error("malformed number '{token}' at position {position}")]
    MalformedNumber { token: String, position: usize },

    #[error("malformed period=amount pair '{0}'")]
    MalformedPair(String),

    #[error("period {0} appears more than once")]
    DuplicatePeriod(u32),
}
