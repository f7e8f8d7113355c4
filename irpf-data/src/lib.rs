//! Table data for `irpf-core`: CSV bracket rows, TOML year parameters and
//! a registry of validated tables keyed by tax year.

mod loader;
mod registry;

pub use loader::{Coverage, ScheduleRecord, TableLoader, TableLoaderError, YearParameters};
pub use registry::{BUILTIN_BRACKETS, BUILTIN_PARAMETERS, TableRegistry};
