use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::core::{
    OptimizeVariable, RentYear, SimulationResult, ValidationError, analyze_profile,
    compare_profiles, optimize, project_rent, simulate,
};
use crate::scenario_file::{Scenario, ScenarioFileError, load_or_default, save_scenario};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Scenario(#[from] ScenarioFileError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "unrent",
    about = "Rent vs buy forecaster: yearly wealth comparison, breakeven year and inverse solver"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Year-by-year comparison for one profile.
    Simulate {
        #[command(flatten)]
        input: ScenarioArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Value of one variable that moves breakeven to the target year.
    Optimize {
        #[command(flatten)]
        input: ScenarioArgs,
        #[arg(long, help = "Target breakeven year (1-based)")]
        target: u32,
        #[arg(long, value_enum)]
        variable: CliVariable,
    },
    /// Breakeven plus all three optimizations against the analysis target.
    Analyze {
        #[command(flatten)]
        input: ScenarioArgs,
    },
    /// Every profile in the scenario against the same rent path.
    Compare {
        #[arg(long, help = "Scenario JSON file; defaults are used when omitted")]
        scenario: Option<PathBuf>,
    },
    /// Write a scenario envelope (defaults, or the loaded scenario) to disk.
    Export {
        #[arg(long, help = "Scenario JSON file to re-export")]
        scenario: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct ScenarioArgs {
    #[arg(long, help = "Scenario JSON file; defaults are used when omitted")]
    pub scenario: Option<PathBuf>,
    #[arg(long, help = "Profile id within the scenario; defaults to the first")]
    pub profile: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliVariable {
    Price,
    Rate,
    DownPayment,
}

impl From<CliVariable> for OptimizeVariable {
    fn from(value: CliVariable) -> Self {
        match value {
            CliVariable::Price => OptimizeVariable::Price,
            CliVariable::Rate => OptimizeVariable::Rate,
            CliVariable::DownPayment => OptimizeVariable::DownPayment,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateOutput<'a> {
    profile_id: &'a str,
    rent: Vec<RentYear>,
    result: SimulationResult,
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve { port } => crate::api::run_http_server(port).await?,
        Command::Simulate { input, format } => {
            let scenario = load_or_default(input.scenario.as_deref())?;
            let profile = scenario.profile(input.profile.as_deref())?;
            let result = simulate(&scenario.global, &scenario.rent, profile)?;
            match format {
                OutputFormat::Table => print!("{}", render_table(&result)),
                OutputFormat::Json => print_json(&SimulateOutput {
                    profile_id: &profile.id,
                    rent: project_rent(&scenario.rent, scenario.global.forecast_years),
                    result,
                })?,
            }
        }
        Command::Optimize {
            input,
            target,
            variable,
        } => {
            let scenario = load_or_default(input.scenario.as_deref())?;
            let profile = scenario.profile(input.profile.as_deref())?;
            let result = optimize(
                target,
                variable.into(),
                profile,
                &scenario.global,
                &scenario.rent,
            )?;
            print_json(&result)?;
        }
        Command::Analyze { input } => {
            let scenario = load_or_default(input.scenario.as_deref())?;
            let profile = scenario.profile(input.profile.as_deref())?;
            print_json(&analyze_profile(&scenario.global, &scenario.rent, profile)?)?;
        }
        Command::Compare { scenario } => {
            let scenario = load_or_default(scenario.as_deref())?;
            print_json(&compare_profiles(
                &scenario.global,
                &scenario.rent,
                &scenario.profiles,
            )?)?;
        }
        Command::Export { scenario, output } => {
            let scenario: Scenario = load_or_default(scenario.as_deref())?;
            save_scenario(&output, &scenario)?;
            info!(profiles = scenario.profiles.len(), "export complete");
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn render_table(result: &SimulationResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "down payment {:.0}  closing costs {:.0}  loan {:.0}  monthly P&I {:.2}\n",
        result.down_payment, result.total_closing_costs, result.loan_amount, result.monthly_payment
    ));
    out.push_str(&format!(
        "{:>4} {:>12} {:>12} {:>10} {:>11} {:>11} {:>13} {:>13} {:>12}\n",
        "year",
        "home value",
        "mortgage",
        "interest",
        "buy outlay",
        "rent",
        "house wealth",
        "renter wealth",
        "delta"
    ));
    for row in &result.rows {
        out.push_str(&format!(
            "{:>4} {:>12.0} {:>12.0} {:>10.0} {:>11.0} {:>11.0} {:>13.0} {:>13.0} {:>12.0}\n",
            row.year,
            row.home_value,
            row.mortgage_balance,
            row.interest_paid,
            row.buy_outlay,
            row.annual_rent,
            row.net_house_wealth,
            row.net_renter_wealth,
            row.wealth_delta
        ));
    }
    match (result.breakeven_year, result.precise_breakeven) {
        (Some(year), Some(precise)) => {
            out.push_str(&format!("breakeven: year {year} ({precise:.2} years)\n"))
        }
        _ => out.push_str("breakeven: not within forecast\n"),
    }
    out
}
