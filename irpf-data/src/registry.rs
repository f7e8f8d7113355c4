//! Versioned table lookup.
//!
//! A [`TableRegistry`] holds one [`TaxYearTables`] per tax year. Tables are
//! looked up either by year or by the date a payment was made; adding a new
//! year is a matter of adding rows to the data files.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use irpf_core::TaxYearTables;
use tracing::debug;

use crate::loader::{TableLoader, TableLoaderError};

/// Bracket rows shipped with the crate.
pub const BUILTIN_BRACKETS: &str = include_str!("../data/brackets.csv");

/// Per-year parameters shipped with the crate.
pub const BUILTIN_PARAMETERS: &str = include_str!("../data/parameters.toml");

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegisteredYear {
    pub(crate) tables: TaxYearTables,
    pub(crate) effective_until: Option<NaiveDate>,
}

/// Immutable set of validated tables, keyed by tax year.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRegistry {
    years: BTreeMap<i32, RegisteredYear>,
}

impl TableRegistry {
    pub(crate) fn from_years(years: BTreeMap<i32, RegisteredYear>) -> Self {
        Self { years }
    }

    /// Loads the tables embedded in the crate.
    ///
    /// ```
    /// use irpf_data::TableRegistry;
    ///
    /// let registry = TableRegistry::builtin().unwrap();
    /// assert_eq!(registry.years().collect::<Vec<_>>(), vec![2022, 2026]);
    /// ```
    pub fn builtin() -> Result<Self, TableLoaderError> {
        let records = TableLoader::parse(BUILTIN_BRACKETS.as_bytes())?;
        TableLoader::build(&records, BUILTIN_PARAMETERS)
    }

    pub fn for_year(
        &self,
        tax_year: i32,
    ) -> Option<&TaxYearTables> {
        self.years.get(&tax_year).map(|year| &year.tables)
    }

    /// Tables in force on `date`: the latest year whose `effective_from` is
    /// on or before `date`, unless that year has already expired.
    pub fn effective_on(
        &self,
        date: NaiveDate,
    ) -> Option<&TaxYearTables> {
        let year = self
            .years
            .values()
            .filter(|year| year.tables.effective_from <= date)
            .max_by_key(|year| year.tables.effective_from)?;

        if year.effective_until.is_some_and(|until| date > until) {
            debug!(%date, tax_year = year.tables.tax_year, "latest tables expired before date");
            return None;
        }
        Some(&year.tables)
    }

    /// Last day the tables for `tax_year` apply, if they have an end date.
    pub fn effective_until(
        &self,
        tax_year: i32,
    ) -> Option<NaiveDate> {
        self.years.get(&tax_year)?.effective_until
    }

    /// Loaded tax years, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Tables for the most recent tax year loaded.
    pub fn latest(&self) -> Option<&TaxYearTables> {
        self.years.values().next_back().map(|year| &year.tables)
    }
}
