use std::fs::{self, File};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use irpf_core::calculations::{
    AnnualSettlementInput, AnnualSettlementWorksheet, MonthlyWithholdingInput,
    MonthlyWithholdingWorksheet, annual_reduction, compute_tax, dividend_withholding,
    minimum_tax_due, monthly_reduction,
};
use irpf_core::calculations::common::round_half_up;
use irpf_core::input::{parse_amount, parse_period_amounts};
use irpf_core::{PeriodAmounts, RateBundle, ScheduleKind, TaxYearTables};
use irpf_data::{BUILTIN_BRACKETS, BUILTIN_PARAMETERS, Coverage, TableLoader, TableRegistry};
use rust_decimal::Decimal;
use tracing::{debug, info};

mod logging;

/// Brazilian IRPF bracket calculator.
///
/// Amounts accept plain (`60000.50`) or Brazilian (`60.000,50`) notation.
/// Per-period lists take twelve values separated by `;` or `|`, or
/// `period=amount` pairs such as `3=60000;7=1250`.
#[derive(Parser, Debug)]
#[command(name = "irpf-calc")]
#[command(version, about, long_about = None)]
struct Args {
    /// Tax year whose tables to use (defaults to the tables in force today)
    #[arg(short, long, global = true)]
    year: Option<i32>,

    /// CSV file with bracket rows, replacing the built-in rows.
    /// Without --parameters, only the built-in years it has rows for are loaded
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// TOML file with per-year parameters, replacing the built-in parameters.
    /// Without --brackets, only the years it names are loaded
    #[arg(long, global = true)]
    parameters: Option<PathBuf>,

    /// Log filter (e.g. "debug" or "irpf_data=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a bracket schedule to a taxable base
    Tax {
        #[arg(value_parser = amount)]
        base: Decimal,

        #[arg(short, long, value_enum, default_value_t = Schedule::Monthly)]
        schedule: Schedule,
    },

    /// Monthly payroll withholding
    Monthly {
        #[arg(value_parser = amount)]
        gross_income: Decimal,

        /// Itemized monthly deductions
        #[arg(short, long, value_parser = amount, default_value = "0")]
        deductions: Decimal,
    },

    /// Monthly reduction for a gross income
    MonthlyReduction {
        #[arg(value_parser = amount)]
        income: Decimal,
    },

    /// Annual reduction for a taxable income
    AnnualReduction {
        #[arg(value_parser = amount)]
        income: Decimal,
    },

    /// Dividend withholding for a year of monthly dividends
    Dividends { amounts: String },

    /// Minimum-tax reconciliation
    MinimumTax {
        /// Total annual income
        #[arg(value_parser = amount)]
        income: Decimal,

        /// Tax already assessed on the annual return
        #[arg(long, value_parser = amount, default_value = "0")]
        assessed: Decimal,

        /// Dividend tax withheld during the year
        #[arg(long, value_parser = amount, default_value = "0")]
        withheld: Decimal,

        #[arg(long, value_parser = rate, default_value = "0")]
        corporate_rate: Decimal,

        #[arg(long, value_parser = rate, default_value = "0")]
        personal_rate: Decimal,

        #[arg(long, value_parser = rate, default_value = "0.34")]
        benchmark_rate: Decimal,
    },

    /// Year-end settlement including dividends and the minimum tax
    Settle {
        /// Income subject to the annual table
        #[arg(value_parser = amount)]
        taxable_income: Decimal,

        #[arg(short, long, value_parser = amount, default_value = "0")]
        deductions: Decimal,

        /// Tax withheld on taxable income
        #[arg(long, value_parser = amount, default_value = "0")]
        withheld: Decimal,

        /// Exempt income other than dividends
        #[arg(long, value_parser = amount, default_value = "0")]
        exempt: Decimal,

        /// Monthly dividends, positional or period=amount pairs
        #[arg(long)]
        dividends: Option<String>,

        #[arg(long, value_parser = rate, default_value = "0")]
        corporate_rate: Decimal,

        #[arg(long, value_parser = rate, default_value = "0.34")]
        benchmark_rate: Decimal,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Schedule {
    Monthly,
    Annual,
    Dividend,
}

impl From<Schedule> for ScheduleKind {
    fn from(schedule: Schedule) -> Self {
        match schedule {
            Schedule::Monthly => ScheduleKind::Monthly,
            Schedule::Annual => ScheduleKind::Annual,
            Schedule::Dividend => ScheduleKind::DividendWithholding,
        }
    }
}

fn amount(s: &str) -> Result<Decimal, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

fn rate(s: &str) -> Result<Decimal, String> {
    Decimal::from_str(s.trim()).map_err(|e| format!("invalid rate '{s}': {e}"))
}

fn load_registry(args: &Args) -> Result<TableRegistry> {
    if args.brackets.is_none() && args.parameters.is_none() {
        return TableRegistry::builtin().context("Failed to load built-in tables");
    }

    let records = match &args.brackets {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            TableLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?
        }
        None => TableLoader::parse(BUILTIN_BRACKETS.as_bytes())
            .context("Failed to parse built-in brackets")?,
    };

    let parameters = match &args.parameters {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?,
        None => BUILTIN_PARAMETERS.to_string(),
    };

    let coverage = match (&args.brackets, &args.parameters) {
        (Some(_), None) => Coverage::RowYears,
        (None, Some(_)) => Coverage::ParameterYears,
        _ => Coverage::Exact,
    };
    debug!(?coverage, "building tax tables");

    TableLoader::build_with(&records, &parameters, coverage)
        .context("Failed to build tax tables")
}

fn select_tables<'r>(
    registry: &'r TableRegistry,
    year: Option<i32>,
) -> Result<&'r TaxYearTables> {
    match year {
        Some(year) => registry.for_year(year).ok_or_else(|| {
            let known: Vec<String> = registry.years().map(|y| y.to_string()).collect();
            anyhow!("No tables for tax year {year} (loaded: {})", known.join(", "))
        }),
        None => {
            let today = Local::now().date_naive();
            registry
                .effective_on(today)
                .or_else(|| registry.latest())
                .ok_or_else(|| anyhow!("No tax tables loaded"))
        }
    }
}

fn print_period_amounts(
    label: &str,
    amounts: &PeriodAmounts,
) {
    for (period, value) in amounts {
        println!("  {label} {period}: {value:>14}");
    }
}

fn run(
    command: Command,
    tables: &TaxYearTables,
) -> Result<()> {
    match command {
        Command::Tax { base, schedule } => {
            let schedule = match ScheduleKind::from(schedule) {
                ScheduleKind::Monthly => &tables.monthly,
                ScheduleKind::Annual => &tables.annual,
                ScheduleKind::DividendWithholding => &tables.dividend_withholding,
            };
            let tax = compute_tax(base, schedule)?;
            println!("Tax ({} {}): {}", schedule.kind(), tables.tax_year, round_half_up(tax));
        }
        Command::Monthly {
            gross_income,
            deductions,
        } => {
            let result = MonthlyWithholdingWorksheet::new(tables).calculate(
                &MonthlyWithholdingInput {
                    gross_income,
                    itemized_deductions: deductions,
                },
            )?;
            let label = if result.used_simplified_discount {
                "simplified discount"
            } else {
                "itemized"
            };
            println!("Deduction ({label}): {}", result.deduction);
            println!("Taxable base:          {}", result.taxable_base);
            println!("Table tax:             {}", result.table_tax);
            println!("Reduction:             {}", result.reduction);
            println!("Tax to withhold:       {}", result.tax_due);
        }
        Command::MonthlyReduction { income } => {
            let reduction = monthly_reduction(income, tables)?;
            println!("Monthly reduction ({}): {}", tables.tax_year, round_half_up(reduction));
        }
        Command::AnnualReduction { income } => {
            let reduction = annual_reduction(income, tables)?;
            println!("Annual reduction ({}): {}", tables.tax_year, round_half_up(reduction));
        }
        Command::Dividends { amounts } => {
            let amounts = parse_period_amounts(&amounts)?;
            debug!(periods = amounts.len(), "parsed dividend amounts");
            let result = dividend_withholding(&amounts, &tables.dividend_withholding)?;
            print_period_amounts("Withholding", &result.detail);
            println!("Total withheld: {}", result.total);
        }
        Command::MinimumTax {
            income,
            assessed,
            withheld,
            corporate_rate,
            personal_rate,
            benchmark_rate,
        } => {
            let rule = tables
                .minimum_tax
                .as_ref()
                .ok_or_else(|| anyhow!("Tax year {} has no minimum tax", tables.tax_year))?;
            let rates = RateBundle {
                corporate_effective_rate: corporate_rate,
                personal_effective_rate: personal_rate,
                nominal_benchmark_rate: benchmark_rate,
            };
            let result = minimum_tax_due(income, assessed, withheld, &rates, rule)?;
            println!("Minimum rate:           {}", result.minimum_rate.round_dp(6));
            println!("Minimum required tax:   {}", result.minimum_required_tax);
            println!("Combined effective rate: {}", result.combined_effective_rate);
            println!("Floor applies:          {}", result.floor_applies);
            println!("Credited tax:           {}", result.credited_tax);
            println!("Supplementary due:      {}", result.supplementary_due);
        }
        Command::Settle {
            taxable_income,
            deductions,
            withheld,
            exempt,
            dividends,
            corporate_rate,
            benchmark_rate,
        } => {
            let dividends = match dividends {
                Some(text) => parse_period_amounts(&text)?,
                None => PeriodAmounts::new(),
            };
            let result = AnnualSettlementWorksheet::new(tables).calculate(
                &AnnualSettlementInput {
                    taxable_income,
                    itemized_deductions: deductions,
                    tax_withheld: withheld,
                    exempt_income: exempt,
                    dividends,
                    corporate_effective_rate: corporate_rate,
                    nominal_benchmark_rate: benchmark_rate,
                },
            )?;
            println!("Deduction:            {}", result.deduction);
            println!("Taxable base:         {}", result.taxable_base);
            println!("Table tax:            {}", result.table_tax);
            println!("Reduction:            {}", result.reduction);
            println!("Tax assessed:         {}", result.tax_assessed);
            println!("Balance due:          {}", result.balance_due);
            println!("Refund due:           {}", result.refund_due);
            println!("Dividends withheld:   {}", result.dividends.total);
            println!("Total income:         {}", result.annual_total_income);
            if let Some(minimum) = &result.minimum_tax {
                println!("Minimum required tax: {}", minimum.minimum_required_tax);
                println!("Supplementary due:    {}", minimum.supplementary_due);
            }
            println!("Total due:            {}", result.total_due);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref())?;

    let registry = load_registry(&args)?;
    let tables = select_tables(&registry, args.year)?;
    info!(tax_year = tables.tax_year, "using tax tables");

    run(args.command, tables)
}
