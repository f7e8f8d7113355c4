use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// Rate inputs for the minimum-tax simulation.
///
/// The corporate rate is an approximation supplied by the caller, not derived
/// from corporate filings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBundle {
    /// Effective rate paid by the distributing company.
    pub corporate_effective_rate: Decimal,
    /// Effective personal rate computed so far for the shareholder.
    pub personal_effective_rate: Decimal,
    /// Nominal combined rate the two layers are compared against (e.g. 34 %).
    pub nominal_benchmark_rate: Decimal,
}

impl RateBundle {
    pub fn validate(&self) -> Result<(), TaxError> {
        for (field, value) in [
            ("corporate_effective_rate", self.corporate_effective_rate),
            ("personal_effective_rate", self.personal_effective_rate),
            ("nominal_benchmark_rate", self.nominal_benchmark_rate),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(TaxError::InvalidRate { field, value });
            }
        }
        Ok(())
    }

    pub fn combined_effective_rate(&self) -> Decimal {
        self.corporate_effective_rate + self.personal_effective_rate
    }
}
