use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleDefect;

/// Largest disagreement allowed between adjacent bracket formulas at their
/// shared bound in a progressive schedule (one cent).
pub const CONTINUITY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Which table a schedule is, and therefore which calculations may use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScheduleKind {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "annual")]
    Annual,
    #[serde(rename = "dividend")]
    DividendWithholding,
}

impl ScheduleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
            Self::DividendWithholding => "dividend",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "annual" => Some(Self::Annual),
            "dividend" => Some(Self::DividendWithholding),
            _ => None,
        }
    }

    /// Progressive tables must be continuous at every bracket boundary.
    /// Withholding tables may step.
    pub fn is_progressive(&self) -> bool {
        matches!(self, Self::Monthly | Self::Annual)
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a rate/subtractor table.
///
/// `upper_bound` is inclusive; `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub subtractor: Decimal,
}

impl Bracket {
    pub fn new(
        upper_bound: Option<Decimal>,
        rate: Decimal,
        subtractor: Decimal,
    ) -> Self {
        Self {
            upper_bound,
            rate,
            subtractor,
        }
    }

    pub fn contains(
        &self,
        base: Decimal,
    ) -> bool {
        self.upper_bound.is_none_or(|bound| base <= bound)
    }

    /// `base × rate − subtractor`, without the zero floor.
    pub fn raw_tax(
        &self,
        base: Decimal,
    ) -> Decimal {
        base * self.rate - self.subtractor
    }
}

/// Disagreement between two adjacent bracket formulas at their shared bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundaryGap {
    pub boundary: Decimal,
    /// Tax at the boundary using the lower bracket (floored at zero).
    pub below: Decimal,
    /// Tax at the boundary using the upper bracket (floored at zero).
    pub above: Decimal,
}

impl BoundaryGap {
    pub fn gap(&self) -> Decimal {
        self.above - self.below
    }
}

/// A validated, versioned progressive (or withholding) rate table.
///
/// Construction rejects empty tables, bounds that are not strictly ascending,
/// tables without a final unbounded bracket, rates outside `[0, 1]`, negative
/// subtractors and, for progressive kinds, jumps larger than
/// [`CONTINUITY_TOLERANCE`] at any boundary. A value of this type can
/// therefore always be applied to any non-negative base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBracketSchedule")]
pub struct BracketSchedule {
    tax_year: i32,
    kind: ScheduleKind,
    brackets: Vec<Bracket>,
}

#[derive(Deserialize)]
struct RawBracketSchedule {
    tax_year: i32,
    kind: ScheduleKind,
    brackets: Vec<Bracket>,
}

impl TryFrom<RawBracketSchedule> for BracketSchedule {
    type Error = ScheduleDefect;

    fn try_from(raw: RawBracketSchedule) -> Result<Self, Self::Error> {
        Self::new(raw.tax_year, raw.kind, raw.brackets)
    }
}

impl BracketSchedule {
    pub fn new(
        tax_year: i32,
        kind: ScheduleKind,
        brackets: Vec<Bracket>,
    ) -> Result<Self, ScheduleDefect> {
        validate(kind, &brackets)?;
        Ok(Self {
            tax_year,
            kind,
            brackets,
        })
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn kind(&self) -> ScheduleKind {
        self.kind
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Returns the first bracket whose upper bound is at or above `base`.
    pub fn bracket_for(
        &self,
        base: Decimal,
    ) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.contains(base))
    }

    /// Reports how far apart adjacent formulas are at every shared bound.
    pub fn boundary_gaps(&self) -> Vec<BoundaryGap> {
        boundary_gaps(&self.brackets)
    }

    /// Fails unless this schedule is of the `expected` kind.
    pub fn ensure_kind(
        &self,
        expected: ScheduleKind,
    ) -> Result<(), ScheduleDefect> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ScheduleDefect::WrongKind {
                expected,
                found: self.kind,
            })
        }
    }
}

fn boundary_gaps(brackets: &[Bracket]) -> Vec<BoundaryGap> {
    brackets
        .windows(2)
        .filter_map(|pair| {
            let (lower, upper) = (&pair[0], &pair[1]);
            lower.upper_bound.map(|boundary| BoundaryGap {
                boundary,
                below: lower.raw_tax(boundary).max(Decimal::ZERO),
                above: upper.raw_tax(boundary).max(Decimal::ZERO),
            })
        })
        .collect()
}

fn validate(
    kind: ScheduleKind,
    brackets: &[Bracket],
) -> Result<(), ScheduleDefect> {
    let Some(last_index) = brackets.len().checked_sub(1) else {
        return Err(ScheduleDefect::Empty);
    };

    let mut previous_bound: Option<Decimal> = None;
    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(ScheduleDefect::InvalidRate {
                index,
                rate: bracket.rate,
            });
        }
        if bracket.subtractor < Decimal::ZERO {
            return Err(ScheduleDefect::NegativeSubtractor {
                index,
                subtractor: bracket.subtractor,
            });
        }
        match bracket.upper_bound {
            Some(bound) => {
                if bound < Decimal::ZERO {
                    return Err(ScheduleDefect::NegativeBound { index, bound });
                }
                if previous_bound.is_some_and(|previous| bound <= previous) {
                    return Err(ScheduleDefect::Unsorted { index, bound });
                }
                previous_bound = Some(bound);
            }
            None if index != last_index => {
                return Err(ScheduleDefect::UnboundedBeforeEnd { index });
            }
            None => {}
        }
    }

    if brackets[last_index].upper_bound.is_some() {
        return Err(ScheduleDefect::MissingUnboundedTail);
    }

    if kind.is_progressive() {
        if let Some(step) = boundary_gaps(brackets)
            .into_iter()
            .find(|g| g.gap().abs() > CONTINUITY_TOLERANCE)
        {
            return Err(ScheduleDefect::Discontinuous {
                boundary: step.boundary,
                gap: step.gap(),
            });
        }
    }

    Ok(())
}
