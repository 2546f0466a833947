//! Capability interface for mixed-integer program solvers.
//!
//! The assignment adapter only talks to a solver through [`MipBackend`] and
//! [`MipModel`]: create a model, add bounded variables and linear
//! constraints, set an objective, solve, and read values back. Concrete
//! engines live in their own crates so they can be swapped without touching
//! the cost model or the formulation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to a variable inside one model.
///
/// Handles are dense, starting at zero in creation order, and only meaningful
/// for the model that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

impl VariableId {
    /// Handle for the `index`-th variable added to a model.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Creation-order index of the variable.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// Inclusive lower bound.
    pub lower: f64,
    /// Inclusive upper bound.
    pub upper: f64,
    /// Whether the variable must take an integral value.
    pub integer: bool,
}

impl VariableBounds {
    /// A 0/1 variable.
    #[must_use]
    pub const fn binary() -> Self {
        Self::integer(0.0, 1.0)
    }

    /// An integral variable in `lower..=upper`.
    #[must_use]
    pub const fn integer(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            integer: true,
        }
    }

    /// A real-valued variable in `lower..=upper`.
    #[must_use]
    pub const fn continuous(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            integer: false,
        }
    }
}

/// Affine expression `Σ coefficient · variable + constant`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    terms: Vec<(VariableId, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// Empty expression evaluating to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            terms: Vec::new(),
            constant: 0.0,
        }
    }

    /// Empty expression with room for `capacity` terms.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
            constant: 0.0,
        }
    }

    /// Sum of `variables`, each with coefficient one.
    pub fn sum<I>(variables: I) -> Self
    where
        I: IntoIterator<Item = VariableId>,
    {
        let mut expr = Self::new();
        for variable in variables {
            expr.add_term(variable, 1.0);
        }
        expr
    }

    /// Append `coefficient · variable`.
    pub fn add_term(&mut self, variable: VariableId, coefficient: f64) -> &mut Self {
        self.terms.push((variable, coefficient));
        self
    }

    /// Replace the constant term.
    pub const fn set_constant(&mut self, constant: f64) -> &mut Self {
        self.constant = constant;
        self
    }

    /// Terms in insertion order.
    #[must_use]
    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    /// Constant term.
    #[must_use]
    pub const fn constant(&self) -> f64 {
        self.constant
    }

    /// Evaluate with `value` supplying each variable's value.
    ///
    /// Returns `None` when `value` cannot resolve one of the variables.
    #[expect(
        clippy::float_arithmetic,
        reason = "expression evaluation is a real-valued dot product"
    )]
    pub fn evaluate<F>(&self, mut value: F) -> Option<f64>
    where
        F: FnMut(VariableId) -> Option<f64>,
    {
        self.terms
            .iter()
            .try_fold(self.constant, |acc, &(variable, coefficient)| {
                value(variable).map(|v| acc + coefficient * v)
            })
    }
}

/// Comparison between a constraint's expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `expr ≤ rhs`
    LessOrEqual,
    /// `expr = rhs`
    Equal,
    /// `expr ≥ rhs`
    GreaterOrEqual,
}

/// Linear constraint `expr (≤ | = | ≥) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Comparison operator.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// `expr ≤ rhs`
    #[must_use]
    pub const fn leq(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            relation: Relation::LessOrEqual,
            rhs,
        }
    }

    /// `expr = rhs`
    #[must_use]
    pub const fn eq(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            relation: Relation::Equal,
            rhs,
        }
    }

    /// `expr ≥ rhs`
    #[must_use]
    pub const fn geq(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            relation: Relation::GreaterOrEqual,
            rhs,
        }
    }
}

/// Direction of optimisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveSense {
    /// Smallest objective value wins.
    Minimize,
    /// Largest objective value wins.
    Maximize,
}

/// Result of [`MipModel::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "status", content = "message", rename_all = "snake_case")
)]
pub enum SolveStatus {
    /// A proven optimum is available.
    Optimal,
    /// A feasible, possibly sub-optimal, solution is available.
    Feasible,
    /// The solver proved that no solution exists.
    Infeasible,
    /// The solver failed; no solution is available.
    Error(String),
}

impl SolveStatus {
    /// Whether variable values can be read after this status.
    #[must_use]
    pub const fn has_solution(&self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

/// Failure to obtain a usable model from a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverUnavailableError {
    /// The configured engine is not known to the backend.
    #[error("solver engine `{name}` is not available")]
    UnknownEngine {
        /// Requested engine name.
        name: String,
    },
}

/// One optimisation model under construction or solved.
///
/// A model is built, solved once and discarded; it is never shared.
pub trait MipModel {
    /// Add a variable with the given domain.
    fn add_variable(&mut self, bounds: VariableBounds) -> VariableId;

    /// Add a linear constraint over previously added variables.
    fn add_constraint(&mut self, constraint: LinearConstraint);

    /// Replace the objective.
    fn set_objective(&mut self, objective: LinearExpr, sense: ObjectiveSense);

    /// Solve the model, blocking until the engine returns.
    fn solve(&mut self) -> SolveStatus;

    /// Value of `variable` in the last solution, if any.
    fn value(&self, variable: VariableId) -> Option<f64>;

    /// Objective value of the last solution, if any.
    fn objective_value(&self) -> Option<f64>;
}

/// Factory for fresh models of one solver engine.
pub trait MipBackend {
    /// Model type produced by this backend.
    type Model: MipModel;

    /// Engine name, for logs and diagnostics.
    fn name(&self) -> &str;

    /// Create an empty model.
    ///
    /// # Errors
    ///
    /// Returns [`SolverUnavailableError`] when the engine cannot be
    /// instantiated or configured.
    fn create_model(&self) -> Result<Self::Model, SolverUnavailableError>;
}
