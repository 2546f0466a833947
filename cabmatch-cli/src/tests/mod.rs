//! Shared test harness modules for the cabmatch CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::solve::{
    DefaultSolveDispatcherBuilder, OutputFormat, ParameterOverrides, SolveConfig,
    config_from_layers_for_test, load_instance, prepare_request, run_solve_with,
};

mod helpers;
mod solve_unit;
