use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleDefect, TaxError};
use crate::models::{BracketSchedule, ScheduleKind};

/// Parameters of the income-based reduction credit (redutor).
///
/// Up to `full_relief_ceiling` the credit is `full_relief`; up to
/// `phase_out_ceiling` it is `phase_out_constant − phase_out_rate × income`;
/// above that it is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionRule {
    pub full_relief_ceiling: Decimal,
    pub full_relief: Decimal,
    pub phase_out_ceiling: Decimal,
    pub phase_out_constant: Decimal,
    pub phase_out_rate: Decimal,
}

impl ReductionRule {
    pub fn validate(&self) -> Result<(), TaxError> {
        for (field, value) in [
            ("full_relief_ceiling", self.full_relief_ceiling),
            ("full_relief", self.full_relief),
            ("phase_out_ceiling", self.phase_out_ceiling),
            ("phase_out_constant", self.phase_out_constant),
        ] {
            if value < Decimal::ZERO {
                return Err(TaxError::invalid_amount(field, value));
            }
        }
        if self.phase_out_rate < Decimal::ZERO || self.phase_out_rate > Decimal::ONE {
            return Err(TaxError::InvalidRate {
                field: "phase_out_rate",
                value: self.phase_out_rate,
            });
        }
        if self.phase_out_ceiling < self.full_relief_ceiling {
            return Err(TaxError::InvalidRule(format!(
                "phase-out ceiling {} is below full-relief ceiling {}",
                self.phase_out_ceiling, self.full_relief_ceiling
            )));
        }
        Ok(())
    }
}

/// Annual simplified discount: a share of income, capped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSimplifiedDiscount {
    pub rate: Decimal,
    pub cap: Decimal,
}

/// Parameters of the minimum-tax (IRPFM) ramp.
///
/// The minimum rate is zero up to `exemption_threshold`, rises linearly to
/// `max_rate` at `full_rate_threshold` and stays there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumTaxRule {
    pub exemption_threshold: Decimal,
    pub full_rate_threshold: Decimal,
    pub max_rate: Decimal,
}

impl MinimumTaxRule {
    pub fn validate(&self) -> Result<(), TaxError> {
        if self.exemption_threshold < Decimal::ZERO {
            return Err(TaxError::invalid_amount(
                "exemption_threshold",
                self.exemption_threshold,
            ));
        }
        if self.full_rate_threshold <= self.exemption_threshold {
            return Err(TaxError::InvalidRule(format!(
                "full-rate threshold {} must be above exemption threshold {}",
                self.full_rate_threshold, self.exemption_threshold
            )));
        }
        if self.max_rate < Decimal::ZERO || self.max_rate > Decimal::ONE {
            return Err(TaxError::InvalidRate {
                field: "max_rate",
                value: self.max_rate,
            });
        }
        Ok(())
    }
}

/// Everything that changes from one tax year to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearTables {
    pub tax_year: i32,
    /// First day these tables apply to.
    pub effective_from: NaiveDate,
    pub monthly: BracketSchedule,
    pub annual: BracketSchedule,
    pub dividend_withholding: BracketSchedule,
    pub monthly_reduction: Option<ReductionRule>,
    pub annual_reduction: Option<ReductionRule>,
    pub monthly_simplified_discount: Decimal,
    pub annual_simplified_discount: AnnualSimplifiedDiscount,
    pub minimum_tax: Option<MinimumTaxRule>,
}

impl TaxYearTables {
    /// Checks that every schedule sits in the slot of its kind and year and
    /// that every rule is internally consistent.
    pub fn validate(&self) -> Result<(), TaxError> {
        for (schedule, kind) in [
            (&self.monthly, ScheduleKind::Monthly),
            (&self.annual, ScheduleKind::Annual),
            (&self.dividend_withholding, ScheduleKind::DividendWithholding),
        ] {
            schedule.ensure_kind(kind)?;
            if schedule.tax_year() != self.tax_year {
                return Err(ScheduleDefect::WrongYear {
                    expected: self.tax_year,
                    found: schedule.tax_year(),
                }
                .into());
            }
        }

        if let Some(rule) = &self.monthly_reduction {
            rule.validate()?;
        }
        if let Some(rule) = &self.annual_reduction {
            rule.validate()?;
        }
        if let Some(rule) = &self.minimum_tax {
            rule.validate()?;
        }

        if self.monthly_simplified_discount < Decimal::ZERO {
            return Err(TaxError::invalid_amount(
                "monthly_simplified_discount",
                self.monthly_simplified_discount,
            ));
        }
        let annual = &self.annual_simplified_discount;
        if annual.rate < Decimal::ZERO || annual.rate > Decimal::ONE {
            return Err(TaxError::InvalidRate {
                field: "annual_simplified_discount.rate",
                value: annual.rate,
            });
        }
        if annual.cap < Decimal::ZERO {
            return Err(TaxError::invalid_amount(
                "annual_simplified_discount.cap",
                annual.cap,
            ));
        }

        Ok(())
    }
}
