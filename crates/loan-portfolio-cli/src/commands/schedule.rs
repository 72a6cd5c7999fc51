use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_portfolio_core::schedule::{build_schedule, LoanTerms};

use crate::input;

/// Arguments for building an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON file with the loan terms
    #[arg(long)]
    pub input: Option<String>,

    /// Annual interest rate as a fraction (e.g. 0.05)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Payment periods per year
    #[arg(long, default_value = "12")]
    pub payments_per_year: u32,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Extra principal per period; outflows are negative, positive is coerced
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub additional_principal: Decimal,

    /// First payment date (YYYY-MM-DD); defaults to the first of next month
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Resolve loan terms from `--input`, piped stdin, or inline flags.
pub(crate) fn terms_from_args(args: &ScheduleArgs) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return Ok(input::file::read_json(path)?);
    }
    if let Some(value) = input::read_stdin()? {
        return Ok(serde_json::from_value(value)?);
    }

    let (Some(rate), Some(years), Some(principal)) = (args.rate, args.years, args.principal)
    else {
        return Err("--rate, --years and --principal (or --input/stdin JSON) are required".into());
    };

    Ok(LoanTerms {
        interest_rate: rate,
        years,
        payments_per_year: args.payments_per_year,
        principal,
        additional_principal: args.additional_principal,
        start_date: args.start_date,
    })
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = terms_from_args(&args)?;
    let result = build_schedule(&terms)?;
    Ok(serde_json::to_value(result)?)
}
