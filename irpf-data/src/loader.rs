use std::collections::{BTreeMap, btree_map::Entry};
use std::io::Read;

use chrono::NaiveDate;
use irpf_core::{
    AnnualSimplifiedDiscount, Bracket, BracketSchedule, MinimumTaxRule, ReductionRule,
    ScheduleKind, TaxError, TaxYearTables,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::registry::{RegisteredYear, TableRegistry};

/// Errors that can occur when loading table data.
#[derive(Debug, Error)]
pub enum TableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("TOML parse error: {0}")]
    Toml(String),

    #[error("Unknown schedule '{0}' (expected monthly, annual or dividend)")]
    UnknownSchedule(String),

    #[error("Tax year {tax_year} has no {kind} schedule rows")]
    MissingSchedule { tax_year: i32, kind: ScheduleKind },

    #[error("Tax year {0} has schedule rows but no parameters")]
    MissingParameters(i32),

    #[error("Tax year {0} appears more than once in the parameters")]
    DuplicateYear(i32),

    #[error("Invalid tables: {0}")]
    Tax(#[from] TaxError),
}

impl From<csv::Error> for TableLoaderError {
    fn from(err: csv::Error) -> Self {
        TableLoaderError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for TableLoaderError {
    fn from(err: toml::de::Error) -> Self {
        TableLoaderError::Toml(err.to_string())
    }
}

/// A single row from the brackets CSV file.
///
/// - `tax_year`: the tax year the row belongs to (e.g., 2026)
/// - `schedule`: `monthly`, `annual` or `dividend`
/// - `upper_bound`: inclusive upper bound (empty for the open-ended bracket)
/// - `rate`: the bracket rate as a decimal (e.g., 0.075 for 7.5%)
/// - `subtractor`: the amount deducted after applying the rate
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    pub tax_year: i32,
    pub schedule: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub rate: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub subtractor: Decimal,
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim().parse::<Decimal>().map_err(serde::de::Error::custom)
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Everything about a tax year that is not a bracket row.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct YearParameters {
    pub tax_year: i32,
    pub effective_from: NaiveDate,
    /// Last day the tables apply; open-ended when absent.
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
    pub monthly_simplified_discount: Decimal,
    pub annual_simplified_discount: AnnualSimplifiedDiscount,
    #[serde(default)]
    pub monthly_reduction: Option<ReductionRule>,
    #[serde(default)]
    pub annual_reduction: Option<ReductionRule>,
    #[serde(default)]
    pub minimum_tax: Option<MinimumTaxRule>,
}

#[derive(Debug, Deserialize)]
struct ParametersFile {
    #[serde(default)]
    year: Vec<YearParameters>,
}

/// Which years a build must cover when rows and parameters come from
/// different sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coverage {
    /// Rows and parameters name exactly the same years.
    #[default]
    Exact,
    /// Only years with rows are built; parameter years without rows are skipped.
    RowYears,
    /// Only years with parameters are built; rows for other years are skipped.
    ParameterYears,
}

/// Loader for bracket rows (CSV) and per-year parameters (TOML).
///
/// Rows are grouped by `(tax_year, schedule)` in file order; each group
/// becomes one [`BracketSchedule`] and is validated on construction, so a
/// discontinuous or unsorted table never reaches a calculation.
pub struct TableLoader;

impl TableLoader {
    /// Parse schedule rows from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, TableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            records.push(record);
        }

        debug!(rows = records.len(), "parsed schedule rows");
        Ok(records)
    }

    /// Parse the per-year parameters from TOML text.
    pub fn parse_parameters(text: &str) -> Result<Vec<YearParameters>, TableLoaderError> {
        let file: ParametersFile = toml::from_str(text)?;
        debug!(years = file.year.len(), "parsed year parameters");
        Ok(file.year)
    }

    /// Assemble validated tables for every year in the parameters.
    ///
    /// Every year must have monthly, annual and dividend rows, and every year
    /// that has rows must have parameters.
    pub fn build(
        records: &[ScheduleRecord],
        parameters_toml: &str,
    ) -> Result<TableRegistry, TableLoaderError> {
        Self::build_with(records, parameters_toml, Coverage::Exact)
    }

    /// Assemble validated tables, skipping the years `coverage` allows one
    /// side to lack.
    ///
    /// A year that is built still needs all three schedules, so a year with
    /// only some of its rows is an error under every coverage.
    pub fn build_with(
        records: &[ScheduleRecord],
        parameters_toml: &str,
        coverage: Coverage,
    ) -> Result<TableRegistry, TableLoaderError> {
        let mut groups = group_records(records)?;
        let mut years = BTreeMap::new();

        for parameters in Self::parse_parameters(parameters_toml)? {
            let tax_year = parameters.tax_year;
            let Entry::Vacant(slot) = years.entry(tax_year) else {
                return Err(TableLoaderError::DuplicateYear(tax_year));
            };

            let has_rows = groups.keys().any(|&(year, _)| year == tax_year);
            if coverage == Coverage::RowYears && !has_rows {
                debug!(tax_year, "skipping year without schedule rows");
                continue;
            }

            let mut take = |kind: ScheduleKind| -> Result<BracketSchedule, TableLoaderError> {
                let brackets = groups
                    .remove(&(tax_year, kind))
                    .ok_or(TableLoaderError::MissingSchedule { tax_year, kind })?;
                BracketSchedule::new(tax_year, kind, brackets)
                    .map_err(|defect| TableLoaderError::Tax(defect.into()))
            };

            let tables = TaxYearTables {
                tax_year,
                effective_from: parameters.effective_from,
                monthly: take(ScheduleKind::Monthly)?,
                annual: take(ScheduleKind::Annual)?,
                dividend_withholding: take(ScheduleKind::DividendWithholding)?,
                monthly_reduction: parameters.monthly_reduction,
                annual_reduction: parameters.annual_reduction,
                monthly_simplified_discount: parameters.monthly_simplified_discount,
                annual_simplified_discount: parameters.annual_simplified_discount,
                minimum_tax: parameters.minimum_tax,
            };
            tables.validate()?;

            info!(
                tax_year,
                effective_from = %tables.effective_from,
                reduction = tables.monthly_reduction.is_some(),
                minimum_tax = tables.minimum_tax.is_some(),
                "loaded tax year tables"
            );
            slot.insert(RegisteredYear {
                tables,
                effective_until: parameters.effective_until,
            });
        }

        if let Some(&(tax_year, _)) = groups.keys().next() {
            if coverage != Coverage::ParameterYears {
                return Err(TableLoaderError::MissingParameters(tax_year));
            }
            debug!(groups = groups.len(), "skipping schedule rows without parameters");
        }

        Ok(TableRegistry::from_years(years))
    }
}

/// Groups rows by `(tax_year, schedule)`, keeping file order inside a group.
fn group_records(
    records: &[ScheduleRecord]
) -> Result<BTreeMap<(i32, ScheduleKind), Vec<Bracket>>, TableLoaderError> {
    let mut groups: BTreeMap<(i32, ScheduleKind), Vec<Bracket>> = BTreeMap::new();

    for record in records {
        let kind = ScheduleKind::parse(record.schedule.trim())
            .ok_or_else(|| TableLoaderError::UnknownSchedule(record.schedule.clone()))?;
        groups
            .entry((record.tax_year, kind))
            .or_default()
            .push(Bracket::new(record.upper_bound, record.rate, record.subtractor));
    }

    Ok(groups)
}
