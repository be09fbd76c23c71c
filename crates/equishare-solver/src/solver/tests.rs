use std::time::{Duration, Instant};

use super::*;
use crate::model::{BoolVar, LinearConstraint, LinearExpr};

fn params(millis: u64) -> SolveParams {
    SolveParams::default()
        .with_time_limit(Duration::from_millis(millis))
        .with_worker_count(2)
        .with_random_seed(42)
}

/// `n` equal items over `bins` bins, each bin holding between `lo` and `hi` items.
fn balanced_model(n: usize, bins: usize, lo: i64, hi: i64) -> Model {
    let mut model = Model::new();
    let mut per_bin: Vec<Vec<BoolVar>> = vec![Vec::new(); bins];
    for item in 0..n {
        let vars: Vec<BoolVar> = (0..bins)
            .map(|b| model.new_bool_var(format!("x_{item}_{b}")))
            .collect();
        model.add_exactly_one(&vars).unwrap();
        for (b, &v) in vars.iter().enumerate() {
            per_bin[b].push(v);
        }
    }
    for (b, vars) in per_bin.iter().enumerate() {
        model
            .add_constraint(
                LinearConstraint::new(format!("count_{b}"), LinearExpr::sum(vars)).between(lo, hi),
            )
            .unwrap();
    }
    model
}

#[test]
fn test_feasible_model_is_solved() {
    let model = balanced_model(30, 3, 10, 10);
    let outcome = LocalSearchSolver::new().solve(&model, &params(2_000));

    assert_eq!(outcome.status, SolveStatus::Feasible);
    let values = outcome.solution().unwrap();
    assert!(model.is_satisfied_by(values));
    assert!(outcome.statistics.worker_count >= 1);
}

#[test]
fn test_presolve_reports_infeasible_quickly() {
    // No bin can hold 31 of 30 items.
    let model = balanced_model(30, 3, 31, 40);
    let started = Instant::now();
    let outcome = LocalSearchSolver::new().solve(&model, &params(5_000));

    assert_eq!(outcome.status, SolveStatus::Infeasible);
    assert!(outcome.solution().is_none());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_unsatisfiable_model_times_out() {
    // Each bin alone could reach 11, but all three together cannot.
    let model = balanced_model(31, 3, 11, 11);
    let started = Instant::now();
    let outcome = LocalSearchSolver::new().solve(&model, &params(200));

    assert_eq!(outcome.status, SolveStatus::Timeout);
    assert!(outcome.solution().is_none());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_empty_model_is_trivially_feasible() {
    let model = Model::new();
    let outcome = LocalSearchSolver::new().solve(&model, &params(100));

    assert_eq!(outcome.status, SolveStatus::Feasible);
    assert_eq!(outcome.solution(), Some(&[][..]));
}

#[test]
fn test_solver_through_trait_object() {
    let solver: Box<dyn LinearSolver> = Box::new(LocalSearchSolver::new());
    let model = balanced_model(6, 2, 3, 3);
    let outcome = solver.solve(&model, &params(1_000));

    assert!(outcome.status.has_solution());
}

#[test]
fn test_builder_clamps_sizes() {
    let solver = LocalSearchSolver::new()
        .with_late_acceptance_size(0)
        .with_accepted_count_limit(0);

    assert_eq!(solver.late_acceptance_size(), 1);
    assert_eq!(solver.accepted_count_limit(), 1);
}
