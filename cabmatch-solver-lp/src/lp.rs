//! `good_lp` modelling helpers for `LpModel`.
//!
//! This module converts the recorded variables, constraints and objective
//! into a `good_lp` problem, solves it with the pure-Rust `microlp` engine and
//! returns one value per variable in creation order.

use cabmatch_core::program::{
    LinearConstraint, LinearExpr, ObjectiveSense, Relation, VariableBounds,
};
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    VariableDefinition, constraint, default_solver, variable,
};
use thiserror::Error;

/// Failure to translate or solve a recorded program.
#[derive(Debug, Error)]
pub(crate) enum LpError {
    /// An expression referenced a variable this model never issued.
    #[error("variable {index} does not belong to this model")]
    UnknownVariable { index: usize },
    /// `good_lp` could not solve the problem.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// A recorded program ready to hand to `good_lp`.
pub(crate) struct LpProgram<'a> {
    pub(crate) variables: &'a [VariableBounds],
    pub(crate) constraints: &'a [LinearConstraint],
    pub(crate) objective: &'a LinearExpr,
    pub(crate) sense: ObjectiveSense,
}

impl LpProgram<'_> {
    /// Solve the program, returning the value of every variable.
    pub(crate) fn solve(&self) -> Result<Vec<f64>, LpError> {
        let mut problem = ProblemVariables::new();
        let handles: Vec<Variable> = self
            .variables
            .iter()
            .map(|bounds| problem.add(definition(*bounds)))
            .collect();

        let objective = expression(self.objective, &handles)?;
        let unsolved = match self.sense {
            ObjectiveSense::Minimize => problem.minimise(objective),
            ObjectiveSense::Maximize => problem.maximise(objective),
        };
        let mut model = unsolved.using(default_solver);
        for linear in self.constraints {
            model = model.with(translate(linear, &handles)?);
        }

        let solution = model.solve()?;
        Ok(handles.iter().map(|handle| solution.value(*handle)).collect())
    }
}

fn definition(bounds: VariableBounds) -> VariableDefinition {
    let mut definition = variable();
    if bounds.integer {
        definition = definition.integer();
    }
    if bounds.lower.is_finite() {
        definition = definition.min(bounds.lower);
    }
    if bounds.upper.is_finite() {
        definition = definition.max(bounds.upper);
    }
    definition
}

fn expression(expr: &LinearExpr, handles: &[Variable]) -> Result<Expression, LpError> {
    let mut translated = Expression::with_capacity(expr.terms().len());
    for &(variable_id, coefficient) in expr.terms() {
        let handle = handles
            .get(variable_id.index())
            .ok_or(LpError::UnknownVariable {
                index: variable_id.index(),
            })?;
        translated.add_mul(coefficient, *handle);
    }
    Ok(translated + expr.constant())
}

fn translate(linear: &LinearConstraint, handles: &[Variable]) -> Result<Constraint, LpError> {
    let lhs = expression(&linear.expr, handles)?;
    Ok(match linear.relation {
        Relation::LessOrEqual => constraint::leq(lhs, linear.rhs),
        Relation::Equal => constraint::eq(lhs, linear.rhs),
        Relation::GreaterOrEqual => constraint::geq(lhs, linear.rhs),
    })
}
