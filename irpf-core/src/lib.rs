//! Progressive income-tax calculations for the Brazilian IRPF schedule.
//!
//! The crate is a set of pure functions over versioned tables:
//!
//! - [`calculations::compute_tax`] applies any [`BracketSchedule`] to a base.
//! - [`calculations::monthly_reduction`] and [`calculations::annual_reduction`]
//!   compute the reduction credit, capped at the table tax.
//! - [`calculations::dividend_withholding`] withholds dividends month by month.
//! - [`calculations::minimum_tax_due`] reconciles the minimum-tax floor.
//!
//! Tables for a year are bundled in [`TaxYearTables`]; loading them from data
//! files is left to the caller.

pub mod calculations;
pub mod error;
pub mod input;
pub mod models;

pub use error::{ParseError, ScheduleDefect, TaxError};
pub use models::*;
