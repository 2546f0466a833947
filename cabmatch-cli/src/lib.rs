//! Command-line interface for cabmatch dispatch runs.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod solve;

pub use error::CliError;
use solve::SolveArgs;

pub(crate) const ARG_SOLVE_INSTANCE: &str = "instance";
pub(crate) const ARG_SOLVE_ENGINE: &str = "engine";
pub(crate) const ARG_SOLVE_TRAVELING_COST_RATE: &str = "traveling-cost-rate";
pub(crate) const ARG_SOLVE_TRIP_WEIGHT: &str = "trip-weight";
pub(crate) const ARG_SOLVE_DETOUR_DISTANCE_WEIGHT: &str = "detour-distance-weight";
pub(crate) const ARG_SOLVE_DETOUR_TIME_WEIGHT: &str = "detour-time-weight";
pub(crate) const ARG_SOLVE_FORMAT: &str = "format";
pub(crate) const ARG_SOLVE_SHOW_COSTS: &str = "show-costs";
pub(crate) const ENV_SOLVE_INSTANCE: &str = "CABMATCH_CMDS_SOLVE_INSTANCE_PATH";

/// Run the cabmatch CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments, configuration or the instance are
/// invalid, or when no solver is available. A batch without a feasible
/// assignment is reported on stdout and is not an error.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => solve::run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "cabmatch",
    about = "Assign cabs to ride requests at minimum total cost",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a batch of cabs and riders and solve the assignment.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
