mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::annual::AnnualArgs;
use commands::net_interest::NetInterestArgs;
use commands::schedule::ScheduleArgs;

/// Loan amortization and portfolio net interest income reporting
#[derive(Parser)]
#[command(
    name = "lpa",
    version,
    about = "Loan amortization schedules and portfolio net interest income",
    long_about = "Builds period-by-period amortization schedules for fixed-rate \
                  loans, annual principal/interest rollups, and the portfolio-wide \
                  net interest income table at funding-cost-adjusted rates. \
                  All monetary math in decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an amortization schedule with its payoff summary
    Schedule(ScheduleArgs),
    /// Annual principal and interest rollup for one loan
    Annual(AnnualArgs),
    /// Portfolio-wide net interest income table, persisted as CSV
    Nii(NetInterestArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Annual(args) => commands::annual::run_annual(args),
        Commands::Nii(args) => commands::net_interest::run_net_interest(args),
        Commands::Version => {
            println!("lpa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
