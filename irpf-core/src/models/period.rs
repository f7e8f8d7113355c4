use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// A calendar month within a tax year, always in `[1, 12]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Period(u8);

/// Amounts keyed by period. Missing periods mean zero.
pub type PeriodAmounts = BTreeMap<Period, Decimal>;

impl Period {
    pub const COUNT: usize = 12;

    pub fn new(month: u32) -> Result<Self, TaxError> {
        match month {
            1..=12 => Ok(Self(month as u8)),
            _ => Err(TaxError::InvalidPeriod(month)),
        }
    }

    pub fn month(self) -> u32 {
        u32::from(self.0)
    }

    /// All twelve periods in calendar order.
    pub fn all() -> impl Iterator<Item = Period> {
        (1..=12u8).map(Period)
    }
}

impl TryFrom<u32> for Period {
    type Error = TaxError;

    fn try_from(month: u32) -> Result<Self, Self::Error> {
        Self::new(month)
    }
}

impl From<Period> for u32 {
    fn from(period: Period) -> Self {
        period.month()
    }
}

impl fmt::Display for Period {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_accepts_every_month() {
        for month in 1..=12 {
            assert_eq!(Period::new(month).map(Period::month), Ok(month));
        }
    }

    #[test]
    fn new_rejects_zero_and_thirteen() {
        assert_eq!(Period::new(0), Err(TaxError::InvalidPeriod(0)));
        assert_eq!(Period::new(13), Err(TaxError::InvalidPeriod(13)));
    }

    #[test]
    fn all_yields_twelve_periods_in_order() {
        let months: Vec<u32> = Period::all().map(Period::month).collect();

        assert_eq!(months, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn display_pads_to_two_digits() {
        assert_eq!(Period::new(3).unwrap().to_string(), "03");
    }
}
