use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use loan_portfolio_core::portfolio::{
    compute_portfolio_net_interest, write_net_interest_csv, LoanRecord,
};

use crate::input;

/// Arguments for the portfolio net interest income run
#[derive(Args)]
pub struct NetInterestArgs {
    /// Portfolio file: CSV with one loan per row, or a JSON array
    #[arg(long)]
    pub portfolio: Option<String>,

    /// Destination for the persisted net interest table
    #[arg(long, default_value = "net_interest_income.csv")]
    pub out: PathBuf,

    /// Compute and print without writing the output file
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_net_interest(args: NetInterestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loans: Vec<LoanRecord> = if let Some(ref path) = args.portfolio {
        if path.ends_with(".csv") {
            input::file::read_portfolio_csv(path)?
        } else {
            input::file::read_json(path)?
        }
    } else if let Some(value) = input::read_stdin()? {
        serde_json::from_value(value)?
    } else {
        return Err("--portfolio <file.csv|file.json> or stdin required".into());
    };

    let result = compute_portfolio_net_interest(&loans)?;
    if !args.dry_run {
        write_net_interest_csv(&result.result.rows, &args.out)?;
    }
    Ok(serde_json::to_value(result)?)
}
