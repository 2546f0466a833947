//! Tests for the `AssignmentSolver`.

use super::*;
use rstest::{fixture, rstest};

use crate::program::Relation;
use crate::test_support::{ScriptedBackend, worked_example};

const OPTIMAL_PAIRS: [(usize, usize); 4] = [(0, 2), (1, 3), (2, 1), (3, 0)];

#[fixture]
fn matrix() -> CostMatrix {
    worked_example()
        .cost_matrix()
        .expect("worked example is valid")
}

fn small_matrix(rows: Vec<Vec<f64>>) -> CostMatrix {
    let cabs = (0..rows.len()).map(|i| CabId::new(format!("cab{i}"))).collect();
    let riders = (0..rows.first().map_or(0, Vec::len))
        .map(|j| RiderId::new(format!("rider{j}")))
        .collect();
    CostMatrix::from_rows(cabs, riders, rows).expect("valid matrix")
}

#[rstest]
fn formulation_has_one_binary_per_pair(matrix: CostMatrix) {
    let backend = ScriptedBackend::selecting(4, 4, &OPTIMAL_PAIRS, 336.0);
    AssignmentSolver::new(backend.clone())
        .solve(matrix)
        .expect("solve succeeds");

    let formulation = backend.formulation();
    assert_eq!(formulation.variables.len(), 16);
    assert!(
        formulation
            .variables
            .iter()
            .all(|bounds| *bounds == VariableBounds::binary())
    );
    assert_eq!(formulation.solves, 1);
}

#[rstest]
fn formulation_limits_cabs_and_covers_riders(matrix: CostMatrix) {
    let backend = ScriptedBackend::selecting(4, 4, &OPTIMAL_PAIRS, 336.0);
    AssignmentSolver::new(backend.clone())
        .solve(matrix)
        .expect("solve succeeds");

    let formulation = backend.formulation();
    assert_eq!(formulation.constraints.len(), 8);
    let (capacity, coverage) = formulation.constraints.split_at(4);
    for (cab, constraint) in capacity.iter().enumerate() {
        assert_eq!(constraint.relation, Relation::LessOrEqual);
        assert_eq!(constraint.rhs, 1.0);
        let indices: Vec<usize> = constraint
            .expr
            .terms()
            .iter()
            .map(|(var, _)| var.index())
            .collect();
        assert_eq!(indices, (cab * 4..cab * 4 + 4).collect::<Vec<_>>());
    }
    for (rider, constraint) in coverage.iter().enumerate() {
        assert_eq!(constraint.relation, Relation::Equal);
        assert_eq!(constraint.rhs, 1.0);
        let indices: Vec<usize> = constraint
            .expr
            .terms()
            .iter()
            .map(|(var, _)| var.index())
            .collect();
        assert_eq!(indices, vec![rider, rider + 4, rider + 8, rider + 12]);
    }
}

#[rstest]
fn objective_minimises_matrix_costs(matrix: CostMatrix) {
    let expected: Vec<f64> = matrix.iter_rows().flatten().copied().collect();
    let backend = ScriptedBackend::selecting(4, 4, &OPTIMAL_PAIRS, 336.0);
    AssignmentSolver::new(backend.clone())
        .solve(matrix)
        .expect("solve succeeds");

    let (objective, sense) = backend.formulation().objective.expect("objective set");
    assert_eq!(sense, ObjectiveSense::Minimize);
    let coefficients: Vec<f64> = objective.terms().iter().map(|(_, c)| *c).collect();
    assert_eq!(coefficients, expected);
}

#[rstest]
fn extracts_selected_pairs_in_cab_order(matrix: CostMatrix) {
    let backend = ScriptedBackend::selecting(4, 4, &OPTIMAL_PAIRS, 336.0);
    let outcome = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect("solve succeeds");
    let assignment = outcome.assignment().expect("assigned");

    let pairs: Vec<(&str, &str, f64)> = assignment
        .pairs()
        .iter()
        .map(|pair| (pair.cab.as_str(), pair.rider.as_str(), pair.cost))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("cab0", "rider2", 54.0),
            ("cab1", "rider3", 64.0),
            ("cab2", "rider1", 118.0),
            ("cab3", "rider0", 100.0),
        ]
    );
    assert_eq!(assignment.total_cost(), 336.0);
    assert!(assignment.idle_cabs().is_empty());
    assert_eq!(
        assignment.cab_for(&RiderId::from("rider1")),
        Some(&CabId::from("cab2"))
    );
    assert_eq!(
        assignment.rider_for(&CabId::from("cab0")),
        Some(&RiderId::from("rider2"))
    );
    assert_eq!(assignment.diagnostics().engine, "scripted");
    assert_eq!(assignment.diagnostics().variables, 16);
    assert_eq!(assignment.diagnostics().constraints, 8);
}

#[rstest]
fn surplus_cabs_are_reported_idle() {
    let matrix = small_matrix(vec![vec![5.0, 1.0], vec![2.0, 9.0], vec![7.0, 7.0]]);
    let backend = ScriptedBackend::selecting(3, 2, &[(0, 1), (1, 0)], 3.0);
    let outcome = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect("solve succeeds");
    let assignment = outcome.into_assignment().expect("assigned");
    assert_eq!(assignment.idle_cabs(), &[CabId::from("cab2")]);
    assert_eq!(assignment.rider_for(&CabId::from("cab2")), None);
}

#[rstest]
fn values_are_read_with_tolerance() {
    let matrix = small_matrix(vec![vec![4.0]]);
    let backend = ScriptedBackend::solving(SolveStatus::Feasible)
        .with_values(vec![0.999_999_9])
        .with_objective(4.0);
    let outcome = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect("solve succeeds");
    let assignment = outcome.assignment().expect("assigned");
    assert_eq!(assignment.pairs().len(), 1);
    assert_eq!(assignment.diagnostics().status, SolveStatus::Feasible);
}

#[rstest]
fn more_riders_than_cabs_never_reaches_the_solver() {
    let matrix = small_matrix(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    let backend = ScriptedBackend::solving(SolveStatus::Optimal);
    let outcome = AssignmentSolver::new(backend.clone())
        .solve(matrix)
        .expect("no error");
    assert_eq!(
        outcome,
        AssignmentOutcome::NoSolution(NoSolutionReason::MoreRidersThanCabs { riders: 3, cabs: 2 })
    );
    assert_eq!(backend.formulation().solves, 0);
    assert!(backend.formulation().variables.is_empty());
}

#[rstest]
#[case::infeasible(SolveStatus::Infeasible, NoSolutionReason::Infeasible)]
#[case::error(
    SolveStatus::Error("node limit".to_owned()),
    NoSolutionReason::SolverError { message: "node limit".to_owned() }
)]
fn failed_statuses_become_no_solution(
    matrix: CostMatrix,
    #[case] status: SolveStatus,
    #[case] expected: NoSolutionReason,
) {
    let outcome = AssignmentSolver::new(ScriptedBackend::solving(status))
        .solve(matrix)
        .expect("no error");
    assert_eq!(outcome, AssignmentOutcome::NoSolution(expected));
    assert!(outcome.assignment().is_none());
}

#[rstest]
fn unavailable_backend_is_an_error(matrix: CostMatrix) {
    let err = AssignmentSolver::new(ScriptedBackend::unavailable())
        .solve(matrix)
        .expect_err("no model");
    assert!(matches!(err, AssignmentError::SolverUnavailable(_)));
}

#[rstest]
fn objective_mismatch_is_inconsistent(matrix: CostMatrix) {
    let backend = ScriptedBackend::selecting(4, 4, &OPTIMAL_PAIRS, 337.0);
    let err = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect_err("objective disagrees");
    assert_eq!(
        err,
        AssignmentError::InconsistentSolution(SolutionDefect::ObjectiveMismatch {
            computed: 336.0,
            reported: 337.0,
        })
    );
}

#[rstest]
fn round_off_within_tolerance_is_accepted(matrix: CostMatrix) {
    let backend = ScriptedBackend::selecting(4, 4, &OPTIMAL_PAIRS, 336.000_1);
    let outcome = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect("within tolerance");
    let assignment = outcome.assignment().expect("assigned");
    assert_eq!(assignment.diagnostics().reported_objective, 336.000_1);
    assert_eq!(assignment.total_cost(), 336.0);
}

#[rstest]
fn uncovered_rider_is_inconsistent(matrix: CostMatrix) {
    let backend = ScriptedBackend::selecting(4, 4, &[(0, 2), (1, 3), (2, 1)], 236.0);
    let err = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect_err("rider0 uncovered");
    assert_eq!(
        err,
        AssignmentError::InconsistentSolution(SolutionDefect::RiderCoverage {
            rider: RiderId::from("rider0"),
            count: 0,
        })
    );
}

#[rstest]
fn overloaded_cab_is_inconsistent(matrix: CostMatrix) {
    let backend = ScriptedBackend::selecting(4, 4, &[(0, 0), (0, 1), (2, 2), (3, 3)], 0.0);
    let err = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect_err("cab0 selected twice");
    assert_eq!(
        err,
        AssignmentError::InconsistentSolution(SolutionDefect::CabCapacity {
            cab: CabId::from("cab0"),
            count: 2,
        })
    );
}

#[rstest]
fn missing_values_are_inconsistent(matrix: CostMatrix) {
    let backend = ScriptedBackend::solving(SolveStatus::Optimal).with_objective(336.0);
    let err = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect_err("no values");
    assert!(matches!(
        err,
        AssignmentError::InconsistentSolution(SolutionDefect::MissingValue { .. })
    ));
}

#[rstest]
fn missing_objective_is_inconsistent(matrix: CostMatrix) {
    let mut values = vec![0.0; 16];
    for (cab, rider) in OPTIMAL_PAIRS {
        if let Some(value) = values.get_mut(cab * 4 + rider) {
            *value = 1.0;
        }
    }
    let backend = ScriptedBackend::solving(SolveStatus::Optimal).with_values(values);
    let err = AssignmentSolver::new(backend)
        .solve(matrix)
        .expect_err("no objective");
    assert_eq!(
        err,
        AssignmentError::InconsistentSolution(SolutionDefect::MissingObjective)
    );
}

#[rstest]
fn dispatch_rejects_invalid_requests_before_modelling() {
    let mut request = worked_example();
    request.parameters.traveling_cost_rate = f64::NAN;
    let backend = ScriptedBackend::solving(SolveStatus::Optimal);
    let err = AssignmentSolver::new(backend.clone())
        .dispatch(&request)
        .expect_err("invalid rate");
    assert!(matches!(
        err,
        AssignmentError::Validation(ValidationError::InvalidParameter {
            name: "traveling_cost_rate",
            ..
        })
    ));
    assert_eq!(backend.formulation().solves, 0);
}

#[rstest]
fn dispatch_rejects_overflowing_costs_instead_of_reporting_infeasible() {
    let mut request = worked_example();
    request.parameters.traveling_cost_rate = 1e300;
    request.parameters.weights.trip = 1e300;
    let backend = ScriptedBackend::solving(SolveStatus::Infeasible);
    let err = AssignmentSolver::new(backend.clone())
        .dispatch(&request)
        .expect_err("overflowing costs");
    assert!(matches!(
        err,
        AssignmentError::Validation(ValidationError::InvalidCost { .. })
    ));
    assert_eq!(backend.formulation().solves, 0);
}

#[rstest]
fn dispatch_prices_and_solves() {
    let backend = ScriptedBackend::selecting(4, 4, &OPTIMAL_PAIRS, 336.0);
    let outcome = crate::dispatch(backend, &worked_example()).expect("dispatch succeeds");
    let assignment = outcome.assignment().expect("assigned");
    assert_eq!(assignment.total_cost(), 336.0);
    assert_eq!(assignment.costs().row(3), Some(&[100.0, 113.0, 61.0, 75.0][..]));
}
