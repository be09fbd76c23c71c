//! Scripted solver doubles.

use std::sync::atomic::{AtomicUsize, Ordering};

use equishare_solver::{LinearSolver, Model, SolveOutcome, SolveParams, SolveStatus, SolverStatistics};

/// Valuation choosing the first option of every exactly-one group.
fn first_options(model: &Model) -> Vec<bool> {
    let mut values = vec![false; model.num_vars()];
    for group in model.groups() {
        values[group[0].index()] = true;
    }
    values
}

/// Reports `Infeasible` for the first `failures` calls, then returns the
/// first-option valuation as `Feasible`, whether or not it satisfies the
/// model's constraints.
#[derive(Debug, Default)]
pub struct ScriptedSolver {
    failures: usize,
    calls: AtomicUsize,
}

impl ScriptedSolver {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of solve calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LinearSolver for ScriptedSolver {
    fn solve(&self, model: &Model, _params: &SolveParams) -> SolveOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            SolveOutcome::unsolved(SolveStatus::Infeasible, SolverStatistics::default())
        } else {
            SolveOutcome::solved(SolveStatus::Feasible, first_options(model), SolverStatistics::default())
        }
    }
}

/// Always succeeds with the first-option valuation.
#[derive(Debug, Default)]
pub struct FirstOptionSolver;

impl LinearSolver for FirstOptionSolver {
    fn solve(&self, model: &Model, _params: &SolveParams) -> SolveOutcome {
        SolveOutcome::solved(SolveStatus::Optimal, first_options(model), SolverStatistics::default())
    }
}
