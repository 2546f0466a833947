//! Facade crate for the cabmatch dispatch engine.
//!
//! This crate re-exports the cost model and assignment types and exposes the
//! linear-programming backend behind a feature flag.

#![forbid(unsafe_code)]

pub use cabmatch_core::{
    AssignedPair, Assignment, AssignmentError, AssignmentOutcome, AssignmentSolver, Cab,
    CabAttributes, CabId, CostMatrix, CostModel, CostParameters, CostWeights,
    DEFAULT_TRAVELING_COST_RATE, DetourError, DetourKind, DetourMetrics, DetourProvider,
    DispatchRequest, MipBackend, MipModel, NoSolutionReason, Rider, RiderAttributes, RiderId,
    RouteId, SolutionDefect, SolveDiagnostics, SolveStatus, SolverUnavailableError,
    ValidationError, dispatch,
};

#[cfg(feature = "solver-lp")]
pub use cabmatch_solver_lp::{DEFAULT_ENGINE, LpBackend, SUPPORTED_ENGINES};
