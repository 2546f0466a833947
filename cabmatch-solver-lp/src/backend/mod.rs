//! `LpBackend` implementation backed by `good_lp`.
//!
//! Engines are chosen by name when a model is created, so a misconfigured
//! name surfaces as [`SolverUnavailableError::UnknownEngine`] rather than as
//! an infeasible run.

use std::time::Instant;

use cabmatch_core::program::{
    LinearConstraint, LinearExpr, MipBackend, MipModel, ObjectiveSense, SolveStatus,
    SolverUnavailableError, VariableBounds, VariableId,
};
use good_lp::ResolutionError;

use crate::lp::{LpError, LpProgram};

/// Engine used when none is configured.
pub const DEFAULT_ENGINE: &str = "microlp";

/// Engine names accepted by [`LpBackend`], compared case-insensitively.
pub const SUPPORTED_ENGINES: &[&str] = &["microlp", "default"];

/// Mixed-integer backend over `good_lp`.
///
/// # Examples
///
/// ```
/// use cabmatch_core::MipBackend;
/// use cabmatch_solver_lp::LpBackend;
///
/// assert!(LpBackend::default().create_model().is_ok());
/// assert!(LpBackend::new("SCIP").create_model().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpBackend {
    engine: String,
}

impl Default for LpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl LpBackend {
    /// Backend for the named engine. The name is checked by
    /// [`MipBackend::create_model`].
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
        }
    }

    /// Whether `engine` names an engine this backend can drive.
    #[must_use]
    pub fn supports(engine: &str) -> bool {
        SUPPORTED_ENGINES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(engine))
    }
}

impl MipBackend for LpBackend {
    type Model = LpModel;

    fn name(&self) -> &str {
        &self.engine
    }

    fn create_model(&self) -> Result<Self::Model, SolverUnavailableError> {
        if !Self::supports(&self.engine) {
            log::warn!("unknown solver engine `{}`", self.engine);
            return Err(SolverUnavailableError::UnknownEngine {
                name: self.engine.clone(),
            });
        }
        Ok(LpModel::default())
    }
}

/// A program recorded for a single `good_lp` solve.
///
/// The problem is assembled only when [`MipModel::solve`] is called; values
/// and the objective are available after a successful solve.
#[derive(Debug, Default)]
pub struct LpModel {
    variables: Vec<VariableBounds>,
    constraints: Vec<LinearConstraint>,
    objective: Option<(LinearExpr, ObjectiveSense)>,
    values: Option<Vec<f64>>,
    objective_value: Option<f64>,
}

impl MipModel for LpModel {
    fn add_variable(&mut self, bounds: VariableBounds) -> VariableId {
        let id = VariableId::from_index(self.variables.len());
        self.variables.push(bounds);
        id
    }

    fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    fn set_objective(&mut self, objective: LinearExpr, sense: ObjectiveSense) {
        self.objective = Some((objective, sense));
    }

    fn solve(&mut self) -> SolveStatus {
        self.values = None;
        self.objective_value = None;
        let Some((objective, sense)) = &self.objective else {
            return SolveStatus::Error("no objective has been set".to_owned());
        };

        let started_at = Instant::now();
        let program = LpProgram {
            variables: &self.variables,
            constraints: &self.constraints,
            objective,
            sense: *sense,
        };
        let outcome = program.solve();
        log::debug!(
            "good_lp solved {} variables / {} constraints in {:?}",
            self.variables.len(),
            self.constraints.len(),
            started_at.elapsed()
        );

        match outcome {
            Ok(values) => {
                self.objective_value = objective.evaluate(|id| values.get(id.index()).copied());
                self.values = Some(values);
                SolveStatus::Optimal
            }
            Err(LpError::Resolution(ResolutionError::Infeasible)) => SolveStatus::Infeasible,
            Err(err) => SolveStatus::Error(err.to_string()),
        }
    }

    fn value(&self, variable: VariableId) -> Option<f64> {
        self.values.as_ref()?.get(variable.index()).copied()
    }

    fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }
}
