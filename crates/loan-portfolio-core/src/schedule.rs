//! Loan amortization schedule engine.
//!
//! Builds a period-by-period schedule for a fixed-rate, fully-amortizing loan
//! plus a one-row payoff summary. Extra principal paydown shortens the
//! schedule without changing the scheduled principal/interest split of the
//! rows before payoff.

use chrono::{Datelike, Local, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanPortfolioError;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanPortfolioResult;

/// Currency rounding applied to each row before cumulative sums.
const CURRENCY_DP: u32 = 2;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Terms of a single fixed-rate loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Annual nominal interest rate as a fraction (0.05 = 5%).
    pub interest_rate: Rate,
    /// Contractual term in years.
    pub years: u32,
    /// Payment periods per year.
    #[serde(default = "default_payments_per_year")]
    pub payments_per_year: u32,
    /// Amount borrowed. Must be positive.
    pub principal: Money,
    /// Extra principal paid each period, as a non-positive outflow. A
    /// positive value is negated on entry and reported as a warning.
    #[serde(default)]
    pub additional_principal: Money,
    /// First payment month. A date that is not a month start rolls forward
    /// to the first of the following month. `None` resolves to the first of
    /// the month after the as-of date, per call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

fn default_payments_per_year() -> u32 {
    12
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One payment period. Outflows are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Payment period, 1-indexed.
    pub period: u32,
    /// First-of-month payment date.
    pub payment_date: NaiveDate,
    /// Level contractual payment.
    pub payment: Money,
    /// Scheduled principal component of the payment.
    pub principal: Money,
    /// Interest component of the payment.
    pub interest: Money,
    /// Extra principal paydown this period (non-positive).
    pub additional_principal: Money,
    /// Running sum of principal plus extra paydown, floored at `-principal`.
    pub cumulative_principal: Money,
    /// Outstanding balance after this payment.
    pub current_balance: Money,
}

/// Payoff summary across the (possibly truncated) schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Date of the final payment, contractual or accelerated.
    pub payoff_date: NaiveDate,
    pub interest_rate: Rate,
    pub years: u32,
    /// Actual per-period outlay: rounded level payment plus extra paydown.
    pub period_payment: Money,
    pub total_payment: Money,
    pub total_principal: Money,
    pub total_additional_principal: Money,
    pub total_interest: Money,
}

/// Full amortization run: the schedule table and its summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub schedule: Vec<ScheduleRow>,
    pub summary: ScheduleSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the amortization schedule, resolving the default start date from
/// the current local date.
pub fn build_schedule(
    terms: &LoanTerms,
) -> LoanPortfolioResult<ComputationOutput<AmortizationOutput>> {
    build_schedule_as_of(terms, Local::now().date_naive())
}

/// Build the amortization schedule against an explicit as-of date. The
/// deterministic entry point used by the portfolio driver and tests.
pub fn build_schedule_as_of(
    terms: &LoanTerms,
    as_of: NaiveDate,
) -> LoanPortfolioResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    validate_terms(terms)?;

    let mut warnings: Vec<String> = Vec::new();

    // Extra paydown is an outflow. Normalize a positive input here rather
    // than trusting callers to get the sign right.
    let additional = if terms.additional_principal > Decimal::ZERO {
        warnings.push(format!(
            "additional_principal {} supplied as positive; treated as {}",
            terms.additional_principal, -terms.additional_principal
        ));
        -terms.additional_principal
    } else {
        terms.additional_principal
    };

    let first_date = first_payment_date(terms.start_date, as_of)?;
    let nper = terms.years * terms.payments_per_year;
    let periodic_rate = terms.interest_rate / Decimal::from(terms.payments_per_year);

    let level_payment = time_value::pmt(periodic_rate, nper, terms.principal, Decimal::ZERO)?;
    let payment_rounded = level_payment.round_dp(CURRENCY_DP);

    let mut rows: Vec<ScheduleRow> = Vec::with_capacity(nper as usize);
    let mut payment_date = first_date;
    // Unclipped running sum; each stored row clips to the loan magnitude.
    let mut cumulative = Decimal::ZERO;

    for period in 1..=nper {
        let interest = time_value::ipmt(periodic_rate, period, nper, terms.principal)?
            .round_dp(CURRENCY_DP);
        let principal_part = time_value::ppmt(periodic_rate, period, nper, terms.principal)?
            .round_dp(CURRENCY_DP);

        cumulative += principal_part + additional;
        let clipped = cumulative.max(-terms.principal);

        rows.push(ScheduleRow {
            period,
            payment_date,
            payment: payment_rounded,
            principal: principal_part,
            interest,
            additional_principal: additional,
            cumulative_principal: clipped,
            current_balance: terms.principal + clipped,
        });

        if period < nper {
            payment_date = next_month_start(payment_date)?;
        }
    }

    if rows.is_empty() {
        return Err(LoanPortfolioError::DegenerateSchedule(
            "no payment periods generated".into(),
        ));
    }

    // Payoff is the first period at which the balance reaches zero, falling
    // back to contractual maturity.
    let payoff_index = rows
        .iter()
        .position(|r| r.current_balance <= Decimal::ZERO)
        .unwrap_or(rows.len() - 1);
    let payoff_date = rows[payoff_index].payment_date;

    if !additional.is_zero() {
        // Accelerated payoff: drop the periods past payoff and rewrite the
        // final row to zero out the prior balance exactly.
        rows.truncate(payoff_index + 1);
        let prior_balance = if payoff_index == 0 {
            terms.principal
        } else {
            rows[payoff_index - 1].current_balance
        };
        if let Some(last) = rows.last_mut() {
            last.principal = -prior_balance;
            last.payment = last.principal + last.interest;
            last.additional_principal = Decimal::ZERO;
            last.cumulative_principal = -terms.principal;
            last.current_balance = Decimal::ZERO;
        }
    }

    let mut total_payment = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_additional = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    for row in &rows {
        total_payment += row.payment;
        total_principal += row.principal;
        total_additional += row.additional_principal;
        total_interest += row.interest;
    }

    let summary = ScheduleSummary {
        payoff_date,
        interest_rate: terms.interest_rate,
        years: terms.years,
        period_payment: payment_rounded + additional,
        total_payment,
        total_principal,
        total_additional_principal: total_additional,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-Payment Amortization Schedule",
        terms,
        warnings,
        elapsed,
        AmortizationOutput {
            schedule: rows,
            summary,
        },
    ))
}

// ---------------------------------------------------------------------------
// Validation and date helpers
// ---------------------------------------------------------------------------

fn validate_terms(terms: &LoanTerms) -> LoanPortfolioResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(LoanPortfolioError::InvalidTerms {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if terms.years == 0 {
        return Err(LoanPortfolioError::InvalidTerms {
            field: "years".into(),
            reason: "Term must be at least one year".into(),
        });
    }
    if terms.payments_per_year == 0 {
        return Err(LoanPortfolioError::InvalidTerms {
            field: "payments_per_year".into(),
            reason: "At least one payment per year is required".into(),
        });
    }

    let periodic = terms.interest_rate / Decimal::from(terms.payments_per_year);
    if periodic <= dec!(-1) {
        return Err(LoanPortfolioError::InvalidTerms {
            field: "interest_rate".into(),
            reason: "Periodic rate at or below -100% has no amortizing payment".into(),
        });
    }

    Ok(())
}

/// First of the month following `date`.
fn next_month_start(date: NaiveDate) -> LoanPortfolioResult<NaiveDate> {
    let month_start = date.with_day(1).ok_or_else(|| {
        LoanPortfolioError::DateError(format!("Cannot normalize {date} to month start"))
    })?;
    month_start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| LoanPortfolioError::DateError(format!("Date overflow past {date}")))
}

/// Month-start calendar semantics: a supplied month start is kept, anything
/// else rolls forward to the next month start. An unset start date resolves
/// against the as-of date at call time.
fn first_payment_date(
    start_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> LoanPortfolioResult<NaiveDate> {
    match start_date {
        Some(d) if d.day() == 1 => Ok(d),
        Some(d) => next_month_start(d),
        None => next_month_start(as_of),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Helper: 30-year 5% loan of 100k, monthly payments from Jan 2020.
    fn standard_terms() -> LoanTerms {
        LoanTerms {
            interest_rate: dec!(0.05),
            years: 30,
            payments_per_year: 12,
            principal: dec!(100000),
            additional_principal: dec!(0),
            start_date: Some(date(2020, 1, 1)),
        }
    }

    fn run(terms: &LoanTerms) -> ComputationOutput<AmortizationOutput> {
        build_schedule_as_of(terms, date(2020, 1, 1)).unwrap()
    }

    // -----------------------------------------------------------------------
    // Full contractual schedule
    // -----------------------------------------------------------------------

    #[test]
    fn test_full_schedule_shape() {
        let out = run(&standard_terms()).result;
        assert_eq!(out.schedule.len(), 360);
        assert_eq!(out.schedule[0].period, 1);
        assert_eq!(out.schedule[0].payment_date, date(2020, 1, 1));
        assert_eq!(out.schedule[359].payment_date, date(2049, 12, 1));
        for row in &out.schedule {
            assert_eq!(row.payment, dec!(-536.82));
            assert_eq!(row.additional_principal, dec!(0));
        }
    }

    #[test]
    fn test_first_period_split() {
        let out = run(&standard_terms()).result;
        let first = &out.schedule[0];
        assert_eq!(first.interest, dec!(-416.67));
        assert_eq!(first.principal, dec!(-120.15));
    }

    #[test]
    fn test_final_balance_within_rounding_tolerance() {
        let out = run(&standard_terms()).result;
        let last = out.schedule.last().unwrap();
        // Rounding is applied per row and compounds forward; tolerance is
        // one cent per period.
        assert!(last.current_balance.abs() <= dec!(3.60));
    }

    #[test]
    fn test_payment_equals_principal_plus_interest() {
        let out = run(&standard_terms()).result;
        for row in &out.schedule {
            let diff = (row.payment - (row.principal + row.interest)).abs();
            assert!(diff <= dec!(0.01), "period {} diff {}", row.period, diff);
        }
    }

    #[test]
    fn test_balance_never_increases() {
        let out = run(&standard_terms()).result;
        let mut prev = out.schedule[0].current_balance;
        for row in &out.schedule[1..] {
            assert!(row.current_balance <= prev);
            prev = row.current_balance;
        }
    }

    #[test]
    fn test_dates_step_one_calendar_month() {
        let out = run(&standard_terms()).result;
        // Spot the year rollover.
        assert_eq!(out.schedule[11].payment_date, date(2020, 12, 1));
        assert_eq!(out.schedule[12].payment_date, date(2021, 1, 1));
    }

    #[test]
    fn test_summary_contractual() {
        let out = run(&standard_terms()).result;
        let s = &out.summary;
        assert_eq!(s.payoff_date, date(2049, 12, 1));
        assert_eq!(s.period_payment, dec!(-536.82));
        assert_eq!(s.total_payment, dec!(-536.82) * dec!(360));
        assert_eq!(s.total_additional_principal, dec!(0));
        assert_eq!(s.years, 30);
        // Payments split into principal and interest, up to the per-row
        // cent rounding.
        let drift = (s.total_payment - (s.total_principal + s.total_interest)).abs();
        assert!(drift <= dec!(3.60));
    }

    // -----------------------------------------------------------------------
    // Additional principal and truncation
    // -----------------------------------------------------------------------

    #[test]
    fn test_additional_principal_truncates_schedule() {
        let mut terms = standard_terms();
        terms.additional_principal = dec!(-200);
        let out = run(&terms).result;

        assert!(out.schedule.len() < 360);
        let last = out.schedule.last().unwrap();
        assert_eq!(last.additional_principal, dec!(0));
        assert_eq!(last.current_balance, dec!(0));
        assert_eq!(last.cumulative_principal, dec!(-100000));
        assert_eq!(last.payment, last.principal + last.interest);
        assert_eq!(out.summary.payoff_date, last.payment_date);
        assert_eq!(out.summary.period_payment, dec!(-736.82));
    }

    #[test]
    fn test_final_row_zeroes_prior_balance() {
        let mut terms = standard_terms();
        terms.additional_principal = dec!(-200);
        let out = run(&terms).result;

        let n = out.schedule.len();
        let prior = &out.schedule[n - 2];
        let last = &out.schedule[n - 1];
        assert_eq!(last.principal, -prior.current_balance);
    }

    #[test]
    fn test_positive_additional_principal_is_coerced() {
        let mut negative = standard_terms();
        negative.additional_principal = dec!(-200);
        let mut positive = standard_terms();
        positive.additional_principal = dec!(200);

        let out_neg = run(&negative);
        let out_pos = run(&positive);

        assert_eq!(out_neg.result, out_pos.result);
        assert!(out_neg.warnings.is_empty());
        assert_eq!(out_pos.warnings.len(), 1);
    }

    #[test]
    fn test_zero_rate_schedule() {
        let terms = LoanTerms {
            interest_rate: dec!(0),
            years: 1,
            payments_per_year: 12,
            principal: dec!(1200),
            additional_principal: dec!(0),
            start_date: Some(date(2024, 1, 1)),
        };
        let out = run(&terms).result;
        assert_eq!(out.schedule.len(), 12);
        for row in &out.schedule {
            assert_eq!(row.payment, dec!(-100));
            assert_eq!(row.interest, dec!(0));
        }
        assert_eq!(out.schedule[11].current_balance, dec!(0));
    }

    // -----------------------------------------------------------------------
    // Start date resolution
    // -----------------------------------------------------------------------

    #[test]
    fn test_default_start_resolves_from_as_of_date() {
        let mut terms = standard_terms();
        terms.start_date = None;
        let out = build_schedule_as_of(&terms, date(2024, 3, 15)).unwrap().result;
        assert_eq!(out.schedule[0].payment_date, date(2024, 4, 1));
    }

    #[test]
    fn test_mid_month_start_rolls_to_next_month() {
        let mut terms = standard_terms();
        terms.start_date = Some(date(2024, 3, 15));
        let out = run(&terms).result;
        assert_eq!(out.schedule[0].payment_date, date(2024, 4, 1));
    }

    #[test]
    fn test_month_start_is_kept() {
        let mut terms = standard_terms();
        terms.start_date = Some(date(2024, 12, 1));
        let out = run(&terms).result;
        assert_eq!(out.schedule[0].payment_date, date(2024, 12, 1));
        assert_eq!(out.schedule[1].payment_date, date(2025, 1, 1));
    }

    // -----------------------------------------------------------------------
    // Validation and determinism
    // -----------------------------------------------------------------------

    #[test]
    fn test_invalid_terms_rejected() {
        let mut no_principal = standard_terms();
        no_principal.principal = dec!(0);
        assert!(matches!(
            run_err(&no_principal),
            LoanPortfolioError::InvalidTerms { .. }
        ));

        let mut no_years = standard_terms();
        no_years.years = 0;
        assert!(matches!(
            run_err(&no_years),
            LoanPortfolioError::InvalidTerms { .. }
        ));

        let mut no_payments = standard_terms();
        no_payments.payments_per_year = 0;
        assert!(matches!(
            run_err(&no_payments),
            LoanPortfolioError::InvalidTerms { .. }
        ));

        let mut absurd_rate = standard_terms();
        absurd_rate.interest_rate = dec!(-12);
        assert!(matches!(
            run_err(&absurd_rate),
            LoanPortfolioError::InvalidTerms { .. }
        ));
    }

    fn run_err(terms: &LoanTerms) -> LoanPortfolioError {
        build_schedule_as_of(terms, date(2020, 1, 1)).unwrap_err()
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let terms = standard_terms();
        let a = run(&terms).result;
        let b = run(&terms).result;
        assert_eq!(a, b);
    }
}
