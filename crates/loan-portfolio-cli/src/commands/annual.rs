use clap::Args;
use serde_json::Value;

use loan_portfolio_core::annual::{aggregate_annual, aggregate_annual_interest};
use loan_portfolio_core::schedule::build_schedule;

use super::schedule::{terms_from_args, ScheduleArgs};

/// Arguments for the annual rollup of a single loan
#[derive(Args)]
pub struct AnnualArgs {
    #[command(flatten)]
    pub terms: ScheduleArgs,

    /// Restrict the rollup to interest only and tag rows with this purpose
    #[arg(long, value_name = "PURPOSE")]
    pub net_interest: Option<String>,
}

pub fn run_annual(args: AnnualArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = terms_from_args(&args.terms)?;
    let amortization = build_schedule(&terms)?;

    if let Some(ref purpose) = args.net_interest {
        let rows = aggregate_annual_interest(&amortization.result.schedule, purpose)?;
        Ok(serde_json::to_value(rows)?)
    } else {
        let rows = aggregate_annual(&amortization.result.schedule);
        Ok(serde_json::to_value(rows)?)
    }
}
