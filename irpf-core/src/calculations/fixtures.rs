//! Published tables shared by the unit tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    AnnualSimplifiedDiscount, Bracket, BracketSchedule, MinimumTaxRule, ReductionRule,
    ScheduleKind, TaxYearTables,
};

fn schedule(
    tax_year: i32,
    kind: ScheduleKind,
    rows: &[(Option<Decimal>, Decimal, Decimal)],
) -> BracketSchedule {
    let brackets = rows
        .iter()
        .map(|&(bound, rate, subtractor)| Bracket::new(bound, rate, subtractor))
        .collect();
    BracketSchedule::new(tax_year, kind, brackets).expect("fixture schedule must be valid")
}

/// Monthly table in force from April 2015 to April 2023.
pub(crate) fn legacy_monthly() -> BracketSchedule {
    schedule(
        2022,
        ScheduleKind::Monthly,
        &[
            (Some(dec!(1903.98)), dec!(0), dec!(0)),
            (Some(dec!(2826.65)), dec!(0.075), dec!(142.80)),
            (Some(dec!(3751.05)), dec!(0.15), dec!(354.80)),
            (Some(dec!(4664.68)), dec!(0.225), dec!(636.13)),
            (None, dec!(0.275), dec!(869.36)),
        ],
    )
}

pub(crate) fn legacy_annual() -> BracketSchedule {
    schedule(
        2022,
        ScheduleKind::Annual,
        &[
            (Some(dec!(22847.76)), dec!(0), dec!(0)),
            (Some(dec!(33919.80)), dec!(0.075), dec!(1713.58)),
            (Some(dec!(45012.60)), dec!(0.15), dec!(4257.57)),
            (Some(dec!(55976.16)), dec!(0.225), dec!(7633.51)),
            (None, dec!(0.275), dec!(10432.32)),
        ],
    )
}

pub(crate) fn tables_legacy() -> TaxYearTables {
    TaxYearTables {
        tax_year: 2022,
        effective_from: NaiveDate::from_ymd_opt(2015, 4, 1).expect("valid date"),
        monthly: legacy_monthly(),
        annual: legacy_annual(),
        dividend_withholding: schedule(
            2022,
            ScheduleKind::DividendWithholding,
            &[(None, dec!(0), dec!(0))],
        ),
        monthly_reduction: None,
        annual_reduction: None,
        monthly_simplified_discount: dec!(0),
        annual_simplified_discount: AnnualSimplifiedDiscount {
            rate: dec!(0.20),
            cap: dec!(16754.34),
        },
        minimum_tax: None,
    }
}

pub(crate) fn tables_2026() -> TaxYearTables {
    TaxYearTables {
        tax_year: 2026,
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
        monthly: schedule(
            2026,
            ScheduleKind::Monthly,
            &[
                (Some(dec!(2428.80)), dec!(0), dec!(0)),
                (Some(dec!(2826.65)), dec!(0.075), dec!(182.16)),
                (Some(dec!(3751.05)), dec!(0.15), dec!(394.16)),
                (Some(dec!(4664.68)), dec!(0.225), dec!(675.49)),
                (None, dec!(0.275), dec!(908.73)),
            ],
        ),
        annual: schedule(
            2026,
            ScheduleKind::Annual,
            &[
                (Some(dec!(29145.60)), dec!(0), dec!(0)),
                (Some(dec!(33919.80)), dec!(0.075), dec!(2185.92)),
                (Some(dec!(45012.60)), dec!(0.15), dec!(4729.91)),
                (Some(dec!(55976.16)), dec!(0.225), dec!(8105.86)),
                (None, dec!(0.275), dec!(10904.67)),
            ],
        ),
        dividend_withholding: schedule(
            2026,
            ScheduleKind::DividendWithholding,
            &[
                (Some(dec!(50000.00)), dec!(0), dec!(0)),
                (None, dec!(0.10), dec!(0)),
            ],
        ),
        monthly_reduction: Some(ReductionRule {
            full_relief_ceiling: dec!(5000.00),
            full_relief: dec!(312.89),
            phase_out_ceiling: dec!(7350.00),
            phase_out_constant: dec!(978.62),
            phase_out_rate: dec!(0.133145),
        }),
        annual_reduction: Some(ReductionRule {
            full_relief_ceiling: dec!(60000.00),
            full_relief: dec!(2694.15),
            phase_out_ceiling: dec!(88200.00),
            phase_out_constant: dec!(8429.73),
            phase_out_rate: dec!(0.095575),
        }),
        monthly_simplified_discount: dec!(607.20),
        annual_simplified_discount: AnnualSimplifiedDiscount {
            rate: dec!(0.20),
            cap: dec!(16754.34),
        },
        minimum_tax: Some(MinimumTaxRule {
            exemption_threshold: dec!(600000.00),
            full_rate_threshold: dec!(1200000.00),
            max_rate: dec!(0.10),
        }),
    }
}
