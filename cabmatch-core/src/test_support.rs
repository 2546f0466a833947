//! Fixtures and scripted collaborators used by unit and behaviour tests.

use std::sync::{Arc, Mutex, PoisonError};

use geo::Coord;

use crate::program::{
    LinearConstraint, LinearExpr, MipBackend, MipModel, ObjectiveSense, SolveStatus,
    SolverUnavailableError, VariableBounds, VariableId,
};
use crate::{
    Cab, CabAttributes, CostMatrix, CostParameters, DetourError, DetourMetrics, DetourProvider,
    DispatchRequest, Rider, RiderAttributes, RouteId,
};

/// Four cabs, four riders and the detour tables of the reference scenario.
///
/// With default parameters the cost matrix is
///
/// ```text
/// cab0 103 114 54 68
/// cab1 108 118 58 64
/// cab2 107 118 63 67
/// cab3 100 113 61 75
/// ```
///
/// and the unique optimum costs 336.
#[must_use]
pub fn worked_example() -> DispatchRequest {
    let cabs = [(4.0, 0), (4.4, 1), (3.0, 0), (5.0, 3)]
        .into_iter()
        .enumerate()
        .map(|(index, (rating, occupancy))| Cab {
            id: format!("cab{index}").into(),
            attributes: CabAttributes {
                route: RouteId(0),
                rating,
                occupancy,
            },
        })
        .collect();
    let riders = [
        ((78.01, 27.2046), (50.477_644, 28.196_93), 10.0),
        ((77.23, 28.48), (51.5621, 26.196_93), 11.0),
        ((73.45, 27.67), (52.3267, 26.9873), 5.0),
        ((75.43, 24.04), (51.644, 26.5431), 6.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (source, destination, distance))| Rider {
        id: format!("rider{index}").into(),
        attributes: RiderAttributes {
            source: Coord::from(source),
            destination: Coord::from(destination),
            distance,
            route: RouteId(0),
        },
    })
    .collect();
    let detours = DetourMetrics {
        cab_ids: (0..4).map(|index| format!("cab{index}").into()).collect(),
        rider_ids: (0..4).map(|index| format!("rider{index}").into()).collect(),
        distance: vec![
            vec![1.0, 1.0, 3.0, 5.0],
            vec![3.0, 4.0, 1.0, 1.0],
            vec![1.0, 4.0, 6.0, 2.0],
            vec![0.0, 1.0, 3.0, 5.0],
        ],
        time: vec![
            vec![2.0, 3.0, 1.0, 3.0],
            vec![5.0, 4.0, 7.0, 3.0],
            vec![6.0, 4.0, 7.0, 5.0],
            vec![0.0, 2.0, 8.0, 10.0],
        ],
    };
    DispatchRequest {
        cabs,
        riders,
        detours,
        parameters: CostParameters::default(),
    }
}

/// Minimum total cost over every feasible assignment, by exhaustive search.
///
/// Returns `None` when there are more riders than cabs. Only suitable for
/// tiny matrices.
#[must_use]
pub fn brute_force_optimum(matrix: &CostMatrix) -> Option<f64> {
    let mut used = vec![false; matrix.rows()];
    best_completion(matrix, 0, &mut used)
}

#[expect(
    clippy::float_arithmetic,
    reason = "exhaustive search sums real-valued costs"
)]
fn best_completion(matrix: &CostMatrix, rider: usize, used: &mut [bool]) -> Option<f64> {
    if rider == matrix.columns() {
        return Some(0.0);
    }
    let mut best: Option<f64> = None;
    for cab in 0..matrix.rows() {
        if used.get(cab).copied().unwrap_or(true) {
            continue;
        }
        let Some(cost) = matrix.get(cab, rider) else {
            continue;
        };
        if let Some(flag) = used.get_mut(cab) {
            *flag = true;
        }
        if let Some(rest) = best_completion(matrix, rider + 1, used) {
            let total = cost + rest;
            best = Some(best.map_or(total, |current| current.min(total)));
        }
        if let Some(flag) = used.get_mut(cab) {
            *flag = false;
        }
    }
    best
}

/// `DetourProvider` returning the same detour for every pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformDetourProvider {
    /// Extra distance for every pair.
    pub distance: f64,
    /// Extra time for every pair.
    pub time: f64,
}

impl DetourProvider for UniformDetourProvider {
    fn detour_metrics(
        &self,
        cabs: &[Cab],
        riders: &[Rider],
    ) -> Result<DetourMetrics, DetourError> {
        if cabs.is_empty() || riders.is_empty() {
            return Err(DetourError::EmptyInput);
        }
        DetourMetrics::positional(
            cabs,
            riders,
            vec![vec![self.distance; riders.len()]; cabs.len()],
            vec![vec![self.time; riders.len()]; cabs.len()],
        )
        .map_err(|err| DetourError::Routing {
            message: err.to_string(),
        })
    }
}

/// `DetourProvider` that always fails with a routing error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDetourProvider;

impl DetourProvider for FailingDetourProvider {
    fn detour_metrics(
        &self,
        _cabs: &[Cab],
        _riders: &[Rider],
    ) -> Result<DetourMetrics, DetourError> {
        Err(DetourError::Routing {
            message: "routing service unreachable".to_owned(),
        })
    }
}

/// Everything a [`ScriptedBackend`] model was asked to build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formulation {
    /// Variable domains in creation order.
    pub variables: Vec<VariableBounds>,
    /// Constraints in insertion order.
    pub constraints: Vec<LinearConstraint>,
    /// Last objective set, if any.
    pub objective: Option<(LinearExpr, ObjectiveSense)>,
    /// Times `solve` was called.
    pub solves: usize,
}

/// Backend whose models replay a fixed answer and record the formulation.
///
/// Variable values are looked up by creation index, so for the assignment
/// program `values[i * riders + j]` is the value of `x[i][j]`.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    status: SolveStatus,
    values: Vec<f64>,
    objective: Option<f64>,
    unavailable: bool,
    recorded: Arc<Mutex<Formulation>>,
}

impl ScriptedBackend {
    /// Models report `status` with no values or objective.
    #[must_use]
    pub fn solving(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            unavailable: false,
            recorded: Arc::default(),
        }
    }

    /// Optimal models selecting `pairs` of a `cabs × riders` program.
    ///
    /// The reported objective is `objective`.
    #[must_use]
    pub fn selecting(cabs: usize, riders: usize, pairs: &[(usize, usize)], objective: f64) -> Self {
        let mut values = vec![0.0; cabs * riders];
        for &(cab, rider) in pairs {
            if let Some(value) = values.get_mut(cab * riders + rider) {
                *value = 1.0;
            }
        }
        Self::solving(SolveStatus::Optimal)
            .with_values(values)
            .with_objective(objective)
    }

    /// Backend that refuses to create models.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::solving(SolveStatus::Error("unavailable".to_owned()))
        }
    }

    /// Replace the reported variable values.
    #[must_use]
    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Replace the reported objective value.
    #[must_use]
    pub const fn with_objective(mut self, objective: f64) -> Self {
        self.objective = Some(objective);
        self
    }

    /// Snapshot of the most recent formulation.
    #[must_use]
    pub fn formulation(&self) -> Formulation {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MipBackend for ScriptedBackend {
    type Model = ScriptedModel;

    fn name(&self) -> &str {
        "scripted"
    }

    fn create_model(&self) -> Result<Self::Model, SolverUnavailableError> {
        if self.unavailable {
            return Err(SolverUnavailableError::UnknownEngine {
                name: self.name().to_owned(),
            });
        }
        *self.recorded.lock().unwrap_or_else(PoisonError::into_inner) = Formulation::default();
        Ok(ScriptedModel {
            backend: self.clone(),
            solved: false,
        })
    }
}

/// Model created by [`ScriptedBackend`].
#[derive(Debug)]
pub struct ScriptedModel {
    backend: ScriptedBackend,
    solved: bool,
}

impl ScriptedModel {
    fn record<F>(&self, update: F)
    where
        F: FnOnce(&mut Formulation),
    {
        let mut formulation = self
            .backend
            .recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        update(&mut *formulation);
    }

    const fn answered(&self) -> bool {
        self.solved && self.backend.status.has_solution()
    }
}

impl MipModel for ScriptedModel {
    fn add_variable(&mut self, bounds: VariableBounds) -> VariableId {
        let mut index = 0;
        self.record(|formulation| {
            index = formulation.variables.len();
            formulation.variables.push(bounds);
        });
        VariableId::from_index(index)
    }

    fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.record(|formulation| formulation.constraints.push(constraint));
    }

    fn set_objective(&mut self, objective: LinearExpr, sense: ObjectiveSense) {
        self.record(|formulation| formulation.objective = Some((objective, sense)));
    }

    fn solve(&mut self) -> SolveStatus {
        self.solved = true;
        self.record(|formulation| formulation.solves += 1);
        self.backend.status.clone()
    }

    fn value(&self, variable: VariableId) -> Option<f64> {
        if !self.answered() {
            return None;
        }
        self.backend.values.get(variable.index()).copied()
    }

    fn objective_value(&self) -> Option<f64> {
        if !self.answered() {
            return None;
        }
        self.backend.objective
    }
}
