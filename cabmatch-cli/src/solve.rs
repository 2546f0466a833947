//! Solve command implementation for the cabmatch CLI.

use std::io::{BufReader, Write};

use cabmatch_core::{
    AssignmentError, AssignmentOutcome, AssignmentSolver, CostMatrix, CostParameters,
    DispatchRequest, MipBackend,
};
use cabmatch_solver_lp::{DEFAULT_ENGINE, LpBackend};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_SOLVE_DETOUR_DISTANCE_WEIGHT, ARG_SOLVE_DETOUR_TIME_WEIGHT, ARG_SOLVE_ENGINE,
    ARG_SOLVE_FORMAT, ARG_SOLVE_INSTANCE, ARG_SOLVE_SHOW_COSTS, ARG_SOLVE_TRAVELING_COST_RATE,
    ARG_SOLVE_TRIP_WEIGHT, CliError, ENV_SOLVE_INSTANCE,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Price every cab / rider pair of a dispatch instance and \
                 assign cabs to riders at minimum total cost. The instance \
                 is a JSON-encoded DispatchRequest; flags override the cost \
                 parameters embedded in it.",
    about = "Solve a cab dispatch instance"
)]
#[ortho_config(prefix = "CABMATCH")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing a DispatchRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) instance_path: Option<Utf8PathBuf>,
    /// Solver engine name (defaults to "microlp").
    #[arg(long = ARG_SOLVE_ENGINE, value_name = "name")]
    #[serde(default)]
    pub(crate) engine: Option<String>,
    /// Override the cost per unit of trip distance.
    #[arg(long = ARG_SOLVE_TRAVELING_COST_RATE, value_name = "rate")]
    #[serde(default)]
    pub(crate) traveling_cost_rate: Option<f64>,
    /// Override the weight of the trip cost term.
    #[arg(long = ARG_SOLVE_TRIP_WEIGHT, value_name = "weight")]
    #[serde(default)]
    pub(crate) trip_weight: Option<f64>,
    /// Override the weight of the detour distance term.
    #[arg(long = ARG_SOLVE_DETOUR_DISTANCE_WEIGHT, value_name = "weight")]
    #[serde(default)]
    pub(crate) detour_distance_weight: Option<f64>,
    /// Override the weight of the detour time term.
    #[arg(long = ARG_SOLVE_DETOUR_TIME_WEIGHT, value_name = "weight")]
    #[serde(default)]
    pub(crate) detour_time_weight: Option<f64>,
    /// Output format: "text" (default) or "json".
    #[arg(long = ARG_SOLVE_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<String>,
    /// Print the priced cost matrix before the assignment.
    #[arg(long = ARG_SOLVE_SHOW_COSTS)]
    #[serde(default)]
    pub(crate) show_costs: bool,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Report layout written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Result<Self, CliError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(CliError::UnknownFormat {
                value: value.to_owned(),
            }),
        }
    }
}

/// Cost parameter overrides taken from configuration layers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ParameterOverrides {
    pub(crate) traveling_cost_rate: Option<f64>,
    pub(crate) trip_weight: Option<f64>,
    pub(crate) detour_distance_weight: Option<f64>,
    pub(crate) detour_time_weight: Option<f64>,
}

impl ParameterOverrides {
    pub(crate) fn apply(&self, parameters: &mut CostParameters) {
        if let Some(rate) = self.traveling_cost_rate {
            parameters.traveling_cost_rate = rate;
        }
        if let Some(weight) = self.trip_weight {
            parameters.weights.trip = weight;
        }
        if let Some(weight) = self.detour_distance_weight {
            parameters.weights.detour_distance = weight;
        }
        if let Some(weight) = self.detour_time_weight {
            parameters.weights.detour_time = weight;
        }
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON instance file.
    pub(crate) instance_path: Utf8PathBuf,
    /// Engine handed to the solver backend.
    pub(crate) engine: String,
    pub(crate) overrides: ParameterOverrides,
    pub(crate) format: OutputFormat,
    pub(crate) show_costs: bool,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.instance_path, ARG_SOLVE_INSTANCE)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let instance_path = args.instance_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_INSTANCE,
            env: ENV_SOLVE_INSTANCE,
        })?;
        let format = args
            .format
            .as_deref()
            .map_or(Ok(OutputFormat::Text), OutputFormat::parse)?;

        Ok(Self {
            instance_path,
            engine: args.engine.unwrap_or_else(|| DEFAULT_ENGINE.to_owned()),
            overrides: ParameterOverrides {
                traveling_cost_rate: args.traveling_cost_rate,
                trip_weight: args.trip_weight,
                detour_distance_weight: args.detour_distance_weight,
                detour_time_weight: args.detour_time_weight,
            },
            format,
            show_costs: args.show_costs,
        })
    }
}

/// Object-safe view of an assignment solver.
pub(super) trait Dispatcher {
    /// Engine that answers the solve.
    fn engine(&self) -> &str;

    fn solve(&self, matrix: CostMatrix) -> Result<AssignmentOutcome, AssignmentError>;
}

impl<B: MipBackend> Dispatcher for AssignmentSolver<B> {
    fn engine(&self) -> &str {
        self.backend().name()
    }

    fn solve(&self, matrix: CostMatrix) -> Result<AssignmentOutcome, AssignmentError> {
        AssignmentSolver::solve(self, matrix)
    }
}

/// Builds a dispatcher for the current solve invocation.
pub(super) trait SolveDispatcherBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Dispatcher>, CliError>;
}

pub(super) struct DefaultSolveDispatcherBuilder;

impl SolveDispatcherBuilder for DefaultSolveDispatcherBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Dispatcher>, CliError> {
        Ok(Box::new(AssignmentSolver::new(LpBackend::new(
            config.engine.clone(),
        ))))
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultSolveDispatcherBuilder;
    run_solve_with(args, &builder, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolveDispatcherBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_solve_config(args)?;
    let (request, matrix) = prepare_request(&config)?;
    let costs = config.show_costs.then(|| matrix.clone());

    let dispatcher = builder.build(&config)?;
    let outcome = dispatcher
        .solve(matrix)
        .map_err(|source| CliError::Solve { source })?;
    log::info!(
        "dispatched {} riders across {} cabs with engine {}",
        request.riders.len(),
        request.cabs.len(),
        dispatcher.engine()
    );

    let report = SolveReport {
        engine: dispatcher.engine(),
        parameters: &request.parameters,
        cost_matrix: costs.as_ref(),
        outcome: &outcome,
    };
    match config.format {
        OutputFormat::Text => write_text_report(writer, &report),
        OutputFormat::Json => write_json_report(writer, &report),
    }
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Load the instance, apply overrides and price it once.
pub(super) fn prepare_request(
    config: &SolveConfig,
) -> Result<(DispatchRequest, CostMatrix), CliError> {
    let mut request = load_instance(&config.instance_path)?;
    config.overrides.apply(&mut request.parameters);
    let matrix = request
        .cost_matrix()
        .map_err(|source| CliError::InvalidInstance {
            path: config.instance_path.clone(),
            source,
        })?;
    Ok((request, matrix))
}

/// Loads a JSON-encoded [`DispatchRequest`] from disk.
pub(super) fn load_instance(path: &Utf8Path) -> Result<DispatchRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInstance {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInstance {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Serialize)]
pub(super) struct SolveReport<'a> {
    engine: &'a str,
    parameters: &'a CostParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost_matrix: Option<&'a CostMatrix>,
    outcome: &'a AssignmentOutcome,
}

fn write_text_report(writer: &mut dyn Write, report: &SolveReport<'_>) -> Result<(), CliError> {
    if let Some(costs) = report.cost_matrix {
        writeln!(writer, "Cost Matrix\n{costs}\n").map_err(CliError::WriteOutput)?;
    }
    match report.outcome {
        AssignmentOutcome::Assigned(assignment) => {
            writeln!(writer, "Total cost = {}\n", assignment.total_cost())
                .map_err(CliError::WriteOutput)?;
            for pair in assignment.pairs() {
                writeln!(
                    writer,
                    "Cab {} assigned to Rider {}. Cost: {}",
                    pair.cab, pair.rider, pair.cost
                )
                .map_err(CliError::WriteOutput)?;
            }
        }
        AssignmentOutcome::NoSolution(reason) => {
            log::info!("no solution: {reason:?}");
            writeln!(writer, "No solution found.").map_err(CliError::WriteOutput)?;
        }
    }
    Ok(())
}

fn write_json_report(writer: &mut dyn Write, report: &SolveReport<'_>) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
