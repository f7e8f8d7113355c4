//! End-to-end calculations against the built-in tables.

use irpf_core::calculations::{
    AnnualSettlementInput, AnnualSettlementWorksheet, MonthlyWithholdingInput,
    MonthlyWithholdingWorksheet, annual_reduction, compute_tax, dividend_withholding,
    monthly_reduction,
};
use irpf_core::input::parse_period_amounts;
use irpf_core::{Period, PeriodAmounts, TaxYearTables};
use irpf_data::{
    BUILTIN_BRACKETS, BUILTIN_PARAMETERS, Coverage, TableLoader, TableLoaderError, TableRegistry,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn tables(tax_year: i32) -> TaxYearTables {
    TableRegistry::builtin()
        .expect("Failed to load built-in tables")
        .for_year(tax_year)
        .cloned()
        .unwrap_or_else(|| panic!("no tables for {tax_year}"))
}

#[test]
fn test_legacy_monthly_top_bracket() {
    let tables = tables(2022);

    let tax = compute_tax(dec!(8000.00), &tables.monthly).unwrap();

    assert_eq!(tax, dec!(1330.64));
}

#[test]
fn test_legacy_monthly_exempt_bound_is_inclusive() {
    let tables = tables(2022);

    assert_eq!(compute_tax(dec!(1903.98), &tables.monthly).unwrap(), dec!(0));
}

#[test]
fn test_2026_monthly_boundary() {
    let tables = tables(2026);

    assert_eq!(compute_tax(dec!(2428.80), &tables.monthly).unwrap(), dec!(0));

    let above = compute_tax(dec!(2428.81), &tables.monthly).unwrap();
    assert_eq!(above, dec!(0.00075));
    assert!(above > Decimal::ZERO);
}

#[test]
fn test_2026_dividends_only_large_period_withheld() {
    let tables = tables(2026);
    let amounts = parse_period_amounts("1=0; 3=60000").unwrap();

    let result = dividend_withholding(&amounts, &tables.dividend_withholding).unwrap();

    assert_eq!(result.total, dec!(6000.00));
    for (period, withheld) in &result.detail {
        if period.month() == 3 {
            assert_eq!(*withheld, dec!(6000.00));
        } else {
            assert_eq!(*withheld, dec!(0));
        }
    }
}

#[test]
fn test_2026_dividends_at_threshold_are_exempt() {
    let tables = tables(2026);
    let amounts: PeriodAmounts = Period::all().map(|p| (p, dec!(50000.00))).collect();

    let result = dividend_withholding(&amounts, &tables.dividend_withholding).unwrap();

    assert_eq!(result.total, dec!(0));
}

#[test]
fn test_legacy_dividends_are_exempt() {
    let tables = tables(2022);
    let amounts = parse_period_amounts("3=1.000.000,00").unwrap();

    let result = dividend_withholding(&amounts, &tables.dividend_withholding).unwrap();

    assert_eq!(result.total, dec!(0));
}

#[test]
fn test_2026_reductions() {
    let tables = tables(2026);

    assert_eq!(monthly_reduction(dec!(3000.00), &tables).unwrap(), dec!(55.84));
    assert_eq!(monthly_reduction(dec!(5000.00), &tables).unwrap(), dec!(312.89));
    assert_eq!(monthly_reduction(dec!(7000.00), &tables).unwrap(), dec!(46.61));
    assert_eq!(monthly_reduction(dec!(7350.01), &tables).unwrap(), dec!(0));
    assert_eq!(annual_reduction(dec!(70000.00), &tables).unwrap(), dec!(1739.48));
}

#[test]
fn test_legacy_has_no_reduction() {
    let tables = tables(2022);

    assert_eq!(monthly_reduction(dec!(3000.00), &tables).unwrap(), dec!(0));
    assert_eq!(annual_reduction(dec!(40000.00), &tables).unwrap(), dec!(0));
}

#[test]
fn test_2026_monthly_worksheet_at_five_thousand_owes_nothing() {
    let tables = tables(2026);

    let result = MonthlyWithholdingWorksheet::new(&tables)
        .calculate(&MonthlyWithholdingInput {
            gross_income: dec!(5000.00),
            itemized_deductions: dec!(0),
        })
        .unwrap();

    assert!(result.used_simplified_discount);
    assert_eq!(result.tax_due, dec!(0.00));
}

fn salaried(dividends: PeriodAmounts) -> AnnualSettlementInput {
    AnnualSettlementInput {
        taxable_income: dec!(120000.00),
        itemized_deductions: dec!(0),
        tax_withheld: dec!(20000.00),
        exempt_income: dec!(0),
        dividends,
        corporate_effective_rate: dec!(0.34),
        nominal_benchmark_rate: dec!(0.34),
    }
}

#[test]
fn test_2026_settlement_refund() {
    let tables = tables(2026);

    let result = AnnualSettlementWorksheet::new(&tables)
        .calculate(&salaried(PeriodAmounts::new()))
        .unwrap();

    assert_eq!(result.deduction, dec!(16754.34));
    assert_eq!(result.taxable_base, dec!(103245.66));
    assert_eq!(result.tax_assessed, dec!(17487.89));
    assert_eq!(result.refund_due, dec!(2512.11));
    assert_eq!(result.total_due, dec!(0));
    assert_eq!(
        result.minimum_tax.map(|m| m.supplementary_due),
        Some(dec!(0))
    );
}

#[test]
fn test_legacy_settlement_has_no_minimum_tax() {
    let tables = tables(2022);

    let result = AnnualSettlementWorksheet::new(&tables)
        .calculate(&salaried(PeriodAmounts::new()))
        .unwrap();

    // 103245.66 × 27.5% − 10432.32
    assert_eq!(result.tax_assessed, dec!(17960.24));
    assert_eq!(result.balance_due, dec!(0));
    assert_eq!(result.refund_due, dec!(2039.76));
    assert_eq!(result.minimum_tax, None);
}

const CUSTOM_2026_ROWS: &str = "tax_year,schedule,upper_bound,rate,subtractor\n\
                                 2026,monthly,,0.10,0\n\
                                 2026,annual,,0.10,0\n\
                                 2026,dividend,,0,0\n";

#[test]
fn test_custom_rows_with_builtin_parameters_load_covered_years() {
    let records = TableLoader::parse(CUSTOM_2026_ROWS.as_bytes()).unwrap();

    let registry =
        TableLoader::build_with(&records, BUILTIN_PARAMETERS, Coverage::RowYears).unwrap();

    assert_eq!(registry.years().collect::<Vec<_>>(), vec![2026]);
    let tables = registry.for_year(2026).unwrap();
    assert_eq!(compute_tax(dec!(1000.00), &tables.monthly).unwrap(), dec!(100.00));
    // Parameters still come from the built-in file.
    assert!(tables.minimum_tax.is_some());
}

#[test]
fn test_custom_rows_with_builtin_parameters_need_row_coverage() {
    let records = TableLoader::parse(CUSTOM_2026_ROWS.as_bytes()).unwrap();

    let err = TableLoader::build(&records, BUILTIN_PARAMETERS).unwrap_err();

    // The built-in parameters also name 2022, which these rows do not cover.
    assert!(matches!(err, TableLoaderError::MissingSchedule { tax_year: 2022, .. }));
}

#[test]
fn test_custom_parameters_with_builtin_rows_load_named_years() {
    let records = TableLoader::parse(BUILTIN_BRACKETS.as_bytes()).unwrap();
    let parameters: String = BUILTIN_PARAMETERS
        .split("[[year]]")
        .filter(|chunk| chunk.contains("tax_year = 2026"))
        .map(|chunk| format!("[[year]]{chunk}"))
        .collect();

    let registry =
        TableLoader::build_with(&records, &parameters, Coverage::ParameterYears).unwrap();

    assert_eq!(registry.years().collect::<Vec<_>>(), vec![2026]);
}
