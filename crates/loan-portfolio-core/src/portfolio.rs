//! Portfolio net interest income driver.
//!
//! Treats the 10-year treasury index rate at funding as the cost of funds:
//! each loan is re-amortized at `interest_rate - treasury/100` and its annual
//! interest rollup is tagged and appended to one portfolio-wide table, the
//! system's only persisted output.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

use crate::annual::aggregate_annual_interest;
use crate::error::LoanPortfolioError;
use crate::schedule::{build_schedule_as_of, LoanTerms};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanPortfolioResult;

/// One funded loan in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: String,
    pub purpose: String,
    pub funded_date: NaiveDate,
    pub funded_amount: Money,
    pub duration_years: u32,
    pub interest_rate: Rate,
    /// 10-year treasury index rate on the funding date, in percent points
    /// (2.13 = 2.13%).
    pub ten_yr_treasury_index_date_funded: Rate,
}

/// One (loan, year) row of the persisted net interest table. Serde renames
/// carry the report's column headers into the CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetInterestRow {
    #[serde(rename = "Payment_Date")]
    pub payment_date: NaiveDate,
    #[serde(rename = "Interest")]
    pub interest: Money,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Purpose")]
    pub purpose: String,
    #[serde(rename = "Loan ID")]
    pub loan_id: String,
}

/// Portfolio-wide net interest table plus rollup totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetInterestOutput {
    pub rows: Vec<NetInterestRow>,
    pub loans_processed: usize,
    pub total_net_interest: Money,
}

/// Compute the funding-cost-adjusted annual net interest income for every
/// loan, in portfolio iteration order. Any invalid record fails the whole
/// run; nothing is persisted here.
pub fn compute_portfolio_net_interest(
    loans: &[LoanRecord],
) -> LoanPortfolioResult<ComputationOutput<NetInterestOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut rows: Vec<NetInterestRow> = Vec::new();
    let mut total_net_interest = Decimal::ZERO;

    for loan in loans {
        validate_loan(loan)?;

        let net_rate = loan.interest_rate - loan.ten_yr_treasury_index_date_funded / dec!(100);
        if net_rate <= Decimal::ZERO {
            warnings.push(format!(
                "Loan {}: non-positive net interest margin {}",
                loan.loan_id, net_rate
            ));
        }

        let terms = LoanTerms {
            interest_rate: net_rate,
            years: loan.duration_years,
            payments_per_year: 12,
            principal: loan.funded_amount,
            additional_principal: Decimal::ZERO,
            start_date: Some(loan.funded_date),
        };

        // Deterministic entry point: the run must not depend on the clock,
        // only on the funding date.
        let amortization = build_schedule_as_of(&terms, loan.funded_date).map_err(|e| {
            LoanPortfolioError::InvalidLoanRecord {
                loan_id: loan.loan_id.clone(),
                reason: e.to_string(),
            }
        })?;

        let annual = aggregate_annual_interest(&amortization.result.schedule, &loan.purpose)?;
        for entry in annual {
            total_net_interest += entry.interest;
            rows.push(NetInterestRow {
                payment_date: entry.payment_date,
                interest: entry.interest,
                year: entry.year,
                purpose: entry.purpose,
                loan_id: loan.loan_id.clone(),
            });
        }
    }

    let output = NetInterestOutput {
        rows,
        loans_processed: loans.len(),
        total_net_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio Net Interest Income (loan rate less 10Y treasury cost of funds)",
        &loans,
        warnings,
        elapsed,
        output,
    ))
}

/// Persist the net interest table, overwriting any prior version wholesale.
pub fn write_net_interest_csv(
    rows: &[NetInterestRow],
    path: &Path,
) -> LoanPortfolioResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| LoanPortfolioError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

fn validate_loan(loan: &LoanRecord) -> LoanPortfolioResult<()> {
    if loan.loan_id.trim().is_empty() {
        return Err(LoanPortfolioError::MissingField {
            field: "loan_id".into(),
        });
    }
    if loan.purpose.trim().is_empty() {
        return Err(LoanPortfolioError::MissingField {
            field: "purpose".into(),
        });
    }
    if loan.funded_amount <= Decimal::ZERO {
        return Err(LoanPortfolioError::InvalidLoanRecord {
            loan_id: loan.loan_id.clone(),
            reason: format!("funded_amount must be positive, got {}", loan.funded_amount),
        });
    }
    if loan.duration_years == 0 {
        return Err(LoanPortfolioError::InvalidLoanRecord {
            loan_id: loan.loan_id.clone(),
            reason: "duration_years must be at least 1".into(),
        });
    }
    Ok(())
}
