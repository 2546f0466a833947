//! Core domain types for cab dispatch.
//!
//! A dispatch run prices every cab / rider pair with a [`CostModel`] and
//! hands the resulting [`CostMatrix`] to an [`AssignmentSolver`], which
//! formulates a binary assignment program against any [`MipBackend`] and
//! extracts a minimum-cost matching.
//!
//! Constructors and validators return `Result` so malformed input is caught
//! before a solver is involved.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assignment;
mod cost;
pub mod detour;
mod error;
mod fleet;
mod index;
pub mod program;
mod request;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use assignment::{
    AssignedPair, Assignment, AssignmentError, AssignmentOutcome, AssignmentSolver,
    NoSolutionReason, SolutionDefect, SolveDiagnostics,
};
pub use cost::{CostMatrix, CostModel, CostParameters, CostWeights, DEFAULT_TRAVELING_COST_RATE};
pub use detour::{DetourError, DetourKind, DetourMetrics, DetourProvider};
pub use error::ValidationError;
pub use fleet::{Cab, CabAttributes, CabId, Rider, RiderAttributes, RiderId, RouteId};
pub use program::{MipBackend, MipModel, SolveStatus, SolverUnavailableError};
pub use request::{DispatchRequest, dispatch};
