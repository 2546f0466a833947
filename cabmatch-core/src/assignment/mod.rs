//! Assignment solver adapter.
//!
//! Formulates a [`CostMatrix`] as a binary program over a [`MipBackend`]:
//!
//! - `x[i][j] ∈ {0, 1}` for every cab `i` and rider `j`;
//! - every cab serves at most one rider: `Σ_j x[i][j] ≤ 1`;
//! - every rider is served exactly once: `Σ_i x[i][j] = 1`;
//! - minimise `Σ cost[i][j] · x[i][j]`.
//!
//! Infeasibility is an ordinary outcome ([`AssignmentOutcome::NoSolution`]);
//! only a missing solver or a self-contradicting solution is an error.

use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::Serialize;
use thiserror::Error;

use crate::program::{
    LinearConstraint, LinearExpr, MipBackend, MipModel, ObjectiveSense, SolveStatus,
    SolverUnavailableError, VariableBounds, VariableId,
};
use crate::{CabId, CostMatrix, DispatchRequest, RiderId, ValidationError};

/// Values above this count as "selected"; absorbs solver round-off.
pub const SELECTION_THRESHOLD: f64 = 0.5;

/// Allowed gap between the extracted total and the solver's objective,
/// relative to the objective's magnitude (never less than absolute `1e-6`).
pub const OBJECTIVE_TOLERANCE: f64 = 1e-6;

/// A cab serving a rider.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AssignedPair {
    /// Serving cab.
    pub cab: CabId,
    /// Served rider.
    pub rider: RiderId,
    /// Row of the cab in the cost matrix.
    pub cab_index: usize,
    /// Column of the rider in the cost matrix.
    pub rider_index: usize,
    /// `cost[cab_index][rider_index]`.
    pub cost: f64,
}

/// How the solve went.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SolveDiagnostics {
    /// Engine that produced the solution.
    pub engine: String,
    /// Status reported by the engine.
    pub status: SolveStatus,
    /// Decision variables in the program.
    pub variables: usize,
    /// Constraints in the program.
    pub constraints: usize,
    /// Objective value reported by the engine.
    pub reported_objective: f64,
    /// Wall-clock time spent formulating and solving.
    pub solve_time: Duration,
}

/// Minimum-cost one-to-one matching of riders to cabs.
///
/// Every rider of the run appears in exactly one pair; no cab appears twice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Assignment {
    pairs: Vec<AssignedPair>,
    total_cost: f64,
    idle_cabs: Vec<CabId>,
    #[cfg_attr(feature = "serde", serde(skip))]
    costs: CostMatrix,
    diagnostics: SolveDiagnostics,
}

impl Assignment {
    /// Selected pairs in cab order.
    #[must_use]
    pub fn pairs(&self) -> &[AssignedPair] {
        &self.pairs
    }

    /// Sum of the selected costs.
    #[must_use]
    pub const fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Cabs left without a rider.
    #[must_use]
    pub fn idle_cabs(&self) -> &[CabId] {
        &self.idle_cabs
    }

    /// Cost matrix the assignment was solved over.
    #[must_use]
    pub const fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    /// Solver statistics for this run.
    #[must_use]
    pub const fn diagnostics(&self) -> &SolveDiagnostics {
        &self.diagnostics
    }

    /// Cab serving `rider`, if the rider took part in the run.
    #[must_use]
    pub fn cab_for(&self, rider: &RiderId) -> Option<&CabId> {
        self.pairs
            .iter()
            .find(|pair| &pair.rider == rider)
            .map(|pair| &pair.cab)
    }

    /// Rider served by `cab`, if any.
    #[must_use]
    pub fn rider_for(&self, cab: &CabId) -> Option<&RiderId> {
        self.pairs
            .iter()
            .find(|pair| &pair.cab == cab)
            .map(|pair| &pair.rider)
    }
}

/// Why no matching was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "reason", rename_all = "snake_case")
)]
pub enum NoSolutionReason {
    /// Coverage is impossible: there are more riders than cabs.
    MoreRidersThanCabs {
        /// Riders in the batch.
        riders: usize,
        /// Cabs in the fleet.
        cabs: usize,
    },
    /// The solver proved the program infeasible.
    Infeasible,
    /// The solver failed while solving.
    SolverError {
        /// Engine-specific description.
        message: String,
    },
}

/// Result of one assignment run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "outcome", content = "detail", rename_all = "snake_case")
)]
pub enum AssignmentOutcome {
    /// Every rider was matched.
    Assigned(Assignment),
    /// No matching exists or none could be found.
    NoSolution(NoSolutionReason),
}

impl AssignmentOutcome {
    /// The matching, if one was produced.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        match self {
            Self::Assigned(assignment) => Some(assignment),
            Self::NoSolution(_) => None,
        }
    }

    /// Consume the outcome, keeping the matching if one was produced.
    #[must_use]
    pub fn into_assignment(self) -> Option<Assignment> {
        match self {
            Self::Assigned(assignment) => Some(assignment),
            Self::NoSolution(_) => None,
        }
    }
}

/// A solver answer that contradicts the program it was given.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolutionDefect {
    /// The solver reported success but withheld a variable's value.
    #[error("no value reported for cab {cab} / rider {rider}")]
    MissingValue {
        /// Cab of the variable.
        cab: CabId,
        /// Rider of the variable.
        rider: RiderId,
    },
    /// The solver reported success but no objective value.
    #[error("no objective value reported")]
    MissingObjective,
    /// A rider was selected a number of times other than one.
    #[error("rider {rider} selected {count} times")]
    RiderCoverage {
        /// Offending rider.
        rider: RiderId,
        /// Times selected.
        count: usize,
    },
    /// A cab was selected more than once.
    #[error("cab {cab} selected {count} times")]
    CabCapacity {
        /// Offending cab.
        cab: CabId,
        /// Times selected.
        count: usize,
    },
    /// The extracted total disagrees with the solver's objective.
    #[error("extracted total {computed} differs from reported objective {reported}")]
    ObjectiveMismatch {
        /// Sum of the selected costs.
        computed: f64,
        /// Objective value reported by the solver.
        reported: f64,
    },
}

/// Errors returned by [`AssignmentSolver`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignmentError {
    /// Input was rejected before a program was formulated.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The solver backend could not provide a model.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(#[from] SolverUnavailableError),
    /// The solver's answer contradicts the program.
    #[error("inconsistent solution: {0}")]
    InconsistentSolution(#[from] SolutionDefect),
}

/// Solves assignment programs on a [`MipBackend`].
///
/// # Examples
/// ```ignore
/// use cabmatch_core::{AssignmentSolver, DispatchRequest};
///
/// let request: DispatchRequest = serde_json::from_str(&instance)?;
/// let outcome = AssignmentSolver::new(backend).dispatch(&request)?;
/// if let Some(assignment) = outcome.assignment() {
///     log::info!("total cost = {}", assignment.total_cost());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentSolver<B> {
    backend: B,
}

impl<B> AssignmentSolver<B>
where
    B: MipBackend,
{
    /// Wrap a backend.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Backend in use.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the cost matrix for `request` and solve it.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Validation`] before any model is created
    /// when the request is malformed; otherwise see [`AssignmentSolver::solve`].
    pub fn dispatch(&self, request: &DispatchRequest) -> Result<AssignmentOutcome, AssignmentError> {
        let matrix = request.cost_matrix()?;
        self.solve(matrix)
    }

    /// Find a minimum-cost assignment for `matrix`.
    ///
    /// The matrix is consumed: each run formulates, solves and discards its
    /// own program, and a successful assignment keeps the matrix it priced.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::SolverUnavailable`] when the backend cannot
    /// create a model and [`AssignmentError::InconsistentSolution`] when the
    /// solver's answer breaks coverage, capacity or objective consistency.
    pub fn solve(&self, matrix: CostMatrix) -> Result<AssignmentOutcome, AssignmentError> {
        let (cabs, riders) = (matrix.rows(), matrix.columns());
        if riders > cabs {
            log::info!("no assignment: {riders} riders but only {cabs} cabs");
            return Ok(AssignmentOutcome::NoSolution(
                NoSolutionReason::MoreRidersThanCabs { riders, cabs },
            ));
        }

        let started_at = Instant::now();
        let mut model = self.backend.create_model()?;
        let program = formulate(&mut model, &matrix);
        let status = model.solve();
        log::debug!(
            "{} solved {} variables / {} constraints: {status:?}",
            self.backend.name(),
            program.variables.len(),
            program.constraints
        );

        match status {
            solved @ (SolveStatus::Optimal | SolveStatus::Feasible) => {
                let extracted = extract(&model, &matrix, &program)?;
                let diagnostics = SolveDiagnostics {
                    engine: self.backend.name().to_owned(),
                    status: solved,
                    variables: program.variables.len(),
                    constraints: program.constraints,
                    reported_objective: extracted.reported_objective,
                    solve_time: started_at.elapsed(),
                };
                Ok(AssignmentOutcome::Assigned(Assignment {
                    pairs: extracted.pairs,
                    total_cost: extracted.total_cost,
                    idle_cabs: extracted.idle_cabs,
                    costs: matrix,
                    diagnostics,
                }))
            }
            SolveStatus::Infeasible => {
                log::info!("no assignment: solver proved the program infeasible");
                Ok(AssignmentOutcome::NoSolution(NoSolutionReason::Infeasible))
            }
            SolveStatus::Error(message) => {
                log::warn!("no assignment: solver failed: {message}");
                Ok(AssignmentOutcome::NoSolution(
                    NoSolutionReason::SolverError { message },
                ))
            }
        }
    }
}

/// Variables of a formulated program, row-major over the cost matrix.
struct Program {
    variables: Vec<VariableId>,
    constraints: usize,
}

impl Program {
    fn variable(&self, cab: usize, rider: usize, riders: usize) -> Option<VariableId> {
        self.variables.get(cab * riders + rider).copied()
    }
}

fn formulate<M: MipModel>(model: &mut M, matrix: &CostMatrix) -> Program {
    let (cabs, riders) = (matrix.rows(), matrix.columns());
    let variables: Vec<VariableId> = (0..cabs * riders)
        .map(|_| model.add_variable(VariableBounds::binary()))
        .collect();
    let program = Program {
        variables,
        constraints: cabs + riders,
    };

    for cab in 0..cabs {
        let row = (0..riders).filter_map(|rider| program.variable(cab, rider, riders));
        model.add_constraint(LinearConstraint::leq(LinearExpr::sum(row), 1.0));
    }
    for rider in 0..riders {
        let column = (0..cabs).filter_map(|cab| program.variable(cab, rider, riders));
        model.add_constraint(LinearConstraint::eq(LinearExpr::sum(column), 1.0));
    }

    let mut objective = LinearExpr::with_capacity(program.variables.len());
    for (cab, row) in matrix.iter_rows().enumerate() {
        for (rider, &cost) in row.iter().enumerate() {
            if let Some(variable) = program.variable(cab, rider, riders) {
                objective.add_term(variable, cost);
            }
        }
    }
    model.set_objective(objective, ObjectiveSense::Minimize);
    program
}

struct Extracted {
    pairs: Vec<AssignedPair>,
    total_cost: f64,
    idle_cabs: Vec<CabId>,
    reported_objective: f64,
}

#[expect(
    clippy::float_arithmetic,
    reason = "the extracted total is a floating-point sum checked against the solver objective"
)]
fn extract<M: MipModel>(
    model: &M,
    matrix: &CostMatrix,
    program: &Program,
) -> Result<Extracted, SolutionDefect> {
    let riders = matrix.columns();
    let mut pairs = Vec::with_capacity(riders);
    let mut rider_hits = vec![0_usize; riders];
    let mut idle_cabs = Vec::new();
    let mut total_cost = 0.0;

    for (cab_index, cab) in matrix.cab_ids().iter().enumerate() {
        let mut cab_hits = 0_usize;
        for (rider_index, rider) in matrix.rider_ids().iter().enumerate() {
            let value = program
                .variable(cab_index, rider_index, riders)
                .and_then(|variable| model.value(variable))
                .ok_or_else(|| SolutionDefect::MissingValue {
                    cab: cab.clone(),
                    rider: rider.clone(),
                })?;
            if value <= SELECTION_THRESHOLD {
                continue;
            }
            let cost = matrix.get(cab_index, rider_index).unwrap_or_default();
            total_cost += cost;
            cab_hits += 1;
            if let Some(hits) = rider_hits.get_mut(rider_index) {
                *hits += 1;
            }
            pairs.push(AssignedPair {
                cab: cab.clone(),
                rider: rider.clone(),
                cab_index,
                rider_index,
                cost,
            });
        }
        if cab_hits > 1 {
            return Err(SolutionDefect::CabCapacity {
                cab: cab.clone(),
                count: cab_hits,
            });
        }
        if cab_hits == 0 {
            idle_cabs.push(cab.clone());
        }
    }

    if let Some((rider, &count)) = matrix
        .rider_ids()
        .iter()
        .zip(&rider_hits)
        .find(|(_, count)| **count != 1)
    {
        return Err(SolutionDefect::RiderCoverage {
            rider: rider.clone(),
            count,
        });
    }

    let reported = model
        .objective_value()
        .ok_or(SolutionDefect::MissingObjective)?;
    let tolerance = OBJECTIVE_TOLERANCE * reported.abs().max(1.0);
    if (total_cost - reported).abs() > tolerance {
        log::warn!("extracted total {total_cost} disagrees with solver objective {reported}");
        return Err(SolutionDefect::ObjectiveMismatch {
            computed: total_cost,
            reported,
        });
    }

    Ok(Extracted {
        pairs,
        total_cost,
        idle_cabs,
        reported_objective: reported,
    })
}

#[cfg(test)]
mod tests;
