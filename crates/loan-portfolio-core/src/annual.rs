//! Annual rollups of a period-level amortization schedule.
//!
//! Reporting totals: a period belongs to the calendar year of its payment
//! date, and cash-flow signs are discarded in favour of magnitudes.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LoanPortfolioError;
use crate::schedule::ScheduleRow;
use crate::types::Money;
use crate::LoanPortfolioResult;

/// Yearly principal and interest totals, as magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualPaymentRow {
    pub year: i32,
    pub interest: Money,
    pub principal: Money,
}

/// Yearly interest total with a provenance tag. `payment_date` carries the
/// year-end label the reporting layer keys on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualInterestRow {
    pub payment_date: NaiveDate,
    pub year: i32,
    pub interest: Money,
    pub purpose: String,
}

/// Roll a schedule up into yearly interest and principal sums, ascending by
/// year. A partial final year produces a row over however many periods fall
/// in it.
pub fn aggregate_annual(schedule: &[ScheduleRow]) -> Vec<AnnualPaymentRow> {
    let mut by_year: BTreeMap<i32, (Decimal, Decimal)> = BTreeMap::new();
    for row in schedule {
        let entry = by_year.entry(row.payment_date.year()).or_default();
        entry.0 += row.interest;
        entry.1 += row.principal;
    }

    by_year
        .into_iter()
        .map(|(year, (interest, principal))| AnnualPaymentRow {
            year,
            interest: interest.abs(),
            principal: principal.abs(),
        })
        .collect()
}

/// Same rollup restricted to the interest column, tagging every row with the
/// caller's provenance string.
pub fn aggregate_annual_interest(
    schedule: &[ScheduleRow],
    purpose: &str,
) -> LoanPortfolioResult<Vec<AnnualInterestRow>> {
    let mut by_year: BTreeMap<i32, Decimal> = BTreeMap::new();
    for row in schedule {
        *by_year.entry(row.payment_date.year()).or_default() += row.interest;
    }

    by_year
        .into_iter()
        .map(|(year, interest)| {
            Ok(AnnualInterestRow {
                payment_date: year_end(year)?,
                year,
                interest: interest.abs(),
                purpose: purpose.to_string(),
            })
        })
        .collect()
}

fn year_end(year: i32) -> LoanPortfolioResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| LoanPortfolioError::DateError(format!("No year-end date for year {year}")))
}
