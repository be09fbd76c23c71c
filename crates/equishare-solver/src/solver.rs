//! Solver capability and the parallel local search solver.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use tracing::{debug, info};

use equishare_core::Score;

use crate::director::ConstraintIndex;
use crate::model::Model;
use crate::presolve;
use crate::search::{run_worker, WorkerConfig, WorkerResult};
use crate::statistics::StatisticsCollector;
use crate::status::{SolveOutcome, SolveParams, SolveStatus};
use crate::termination::{
    BestScoreFeasibleTermination, ExternalTermination, OrTermination, StepCountTermination,
    TimeTermination,
};

/// A solver for boolean linear models.
///
/// Implementations must return a valuation only when it satisfies every
/// group and constraint of the model, and must respect
/// `params.time_limit` as a hard wall-clock budget.
pub trait LinearSolver: Send + Sync + Debug {
    fn solve(&self, model: &Model, params: &SolveParams) -> SolveOutcome;
}

impl<S: LinearSolver + ?Sized> LinearSolver for &S {
    fn solve(&self, model: &Model, params: &SolveParams) -> SolveOutcome {
        (**self).solve(model, params)
    }
}

/// Parallel late acceptance local search with a bound presolve.
///
/// The presolve proves infeasibility of constraints whose bounds fall
/// outside the reachable range. Beyond that the search cannot prove
/// infeasibility, so an unsatisfiable model ends with
/// [`SolveStatus::Timeout`] once the budget is spent.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use equishare_solver::{
///     LinearConstraint, LinearExpr, LinearSolver, LocalSearchSolver, Model, SolveParams,
///     SolveStatus,
/// };
///
/// let mut model = Model::new();
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_exactly_one(&[a, b]).unwrap();
/// model
///     .add_constraint(LinearConstraint::new("no_a", LinearExpr::sum(&[a])).equal_to(0))
///     .unwrap();
///
/// let params = SolveParams::default()
///     .with_time_limit(Duration::from_secs(1))
///     .with_worker_count(2);
/// let outcome = LocalSearchSolver::new().solve(&model, &params);
///
/// assert_eq!(outcome.status, SolveStatus::Feasible);
/// assert_eq!(outcome.solution(), Some(&[false, true][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSearchSolver {
    late_acceptance_size: usize,
    accepted_count_limit: usize,
    evaluation_limit: usize,
}

impl Default for LocalSearchSolver {
    fn default() -> Self {
        Self {
            late_acceptance_size: 400,
            accepted_count_limit: 4,
            evaluation_limit: 256,
        }
    }
}

impl LocalSearchSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_late_acceptance_size(mut self, size: usize) -> Self {
        self.late_acceptance_size = size.max(1);
        self
    }

    pub fn with_accepted_count_limit(mut self, limit: usize) -> Self {
        self.accepted_count_limit = limit.max(1);
        self
    }

    pub fn late_acceptance_size(&self) -> usize {
        self.late_acceptance_size
    }

    pub fn accepted_count_limit(&self) -> usize {
        self.accepted_count_limit
    }

    fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            late_acceptance_size: self.late_acceptance_size,
            accepted_count_limit: self.accepted_count_limit,
            evaluation_limit: self.evaluation_limit.max(self.accepted_count_limit),
        }
    }
}

impl LinearSolver for LocalSearchSolver {
    fn solve(&self, model: &Model, params: &SolveParams) -> SolveOutcome {
        let statistics = StatisticsCollector::new();
        let deadline = Instant::now() + params.time_limit;
        let workers = params.worker_count.max(1);

        info!(
            event = "solve_start",
            variables = model.num_vars(),
            groups = model.groups().len(),
            constraints = model.constraints().len(),
            workers,
            time_limit_ms = params.time_limit.as_millis() as u64,
        );

        if let Some(constraint) = presolve::find_infeasible(model) {
            let stats = statistics.snapshot();
            info!(
                event = "solve_end",
                status = SolveStatus::Infeasible.as_str(),
                constraint = constraint.name(),
                duration_ms = stats.duration.as_millis() as u64,
            );
            return SolveOutcome::unsolved(SolveStatus::Infeasible, stats);
        }

        let index = ConstraintIndex::build(model);
        let found = AtomicBool::new(false);
        let best: Mutex<Option<WorkerResult>> = Mutex::new(None);
        let config = self.worker_config();

        rayon::scope(|s| {
            for worker_index in 0..workers {
                let index = &index;
                let found = &found;
                let best = &best;
                let statistics = &statistics;
                s.spawn(move |_| {
                    statistics.record_worker();
                    let termination = OrTermination::new((
                        TimeTermination::until(deadline),
                        ExternalTermination::new(found),
                        BestScoreFeasibleTermination::new(),
                        params.step_limit.map(StepCountTermination::new),
                    ));
                    let seed = params.random_seed.wrapping_add(worker_index as u64);
                    let result =
                        run_worker(model, index, config, seed, worker_index, &termination, statistics);
                    if result.best_score.is_feasible() {
                        found.store(true, Ordering::Relaxed);
                    }

                    let mut guard = best.lock().unwrap_or_else(PoisonError::into_inner);
                    let improves = guard.as_ref().map_or(true, |b| {
                        result.best_score > b.best_score
                            || (result.best_score == b.best_score
                                && result.worker_index < b.worker_index)
                    });
                    if improves {
                        *guard = Some(result);
                    }
                });
            }
        });

        let stats = statistics.snapshot();
        let best = best.into_inner().unwrap_or_else(PoisonError::into_inner);
        let outcome = match best {
            Some(result)
                if result.best_score.is_feasible() && model.is_satisfied_by(&result.best_values) =>
            {
                debug!(
                    event = "best_worker",
                    worker = result.worker_index,
                    steps = result.step_count,
                );
                SolveOutcome::solved(SolveStatus::Feasible, result.best_values, stats)
            }
            _ => SolveOutcome::unsolved(SolveStatus::Timeout, stats),
        };

        info!(
            event = "solve_end",
            status = outcome.status.as_str(),
            duration_ms = outcome.statistics.duration.as_millis() as u64,
            steps = outcome.statistics.step_count,
            moves_evaluated = outcome.statistics.moves_evaluated,
        );
        outcome
    }
}

#[cfg(test)]
mod tests;
