mod bracket_schedule;
mod period;
mod rate_bundle;
mod tax_year_tables;

pub use bracket_schedule::{
    BoundaryGap, Bracket, BracketSchedule, CONTINUITY_TOLERANCE, ScheduleKind,
};
pub use period::{Period, PeriodAmounts};
pub use rate_bundle::RateBundle;
pub use tax_year_tables::{
    AnnualSimplifiedDiscount, MinimumTaxRule, ReductionRule, TaxYearTables,
};
