//! Solve parameters and outcomes.

use std::time::Duration;

use crate::statistics::SolverStatistics;

/// Default wall-clock budget per solve.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(45);

/// Default number of parallel search workers.
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Outcome class of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// A solution was found and proven optimal.
    Optimal,
    /// A solution satisfying every constraint was found.
    Feasible,
    /// The constraints were proven unsatisfiable.
    Infeasible,
    /// The budget elapsed without finding a solution.
    Timeout,
}

impl SolveStatus {
    /// Returns true if the status carries a valuation.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Timeout => "timeout",
        }
    }
}

/// Per-call solver budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveParams {
    /// Hard wall-clock limit for the whole call.
    pub time_limit: Duration,
    /// Number of parallel search workers.
    pub worker_count: usize,
    /// Base seed; worker `k` uses `random_seed + k`.
    pub random_seed: u64,
    /// Optional per-worker step limit.
    pub step_limit: Option<u64>,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            worker_count: DEFAULT_WORKER_COUNT,
            random_seed: 0,
            step_limit: None,
        }
    }
}

impl SolveParams {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }

    pub fn with_step_limit(mut self, step_limit: u64) -> Self {
        self.step_limit = Some(step_limit);
        self
    }
}

/// Result of a solve call.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// One value per model variable, present when `status.has_solution()`.
    pub values: Option<Vec<bool>>,
    pub statistics: SolverStatistics,
}

impl SolveOutcome {
    pub fn solved(status: SolveStatus, values: Vec<bool>, statistics: SolverStatistics) -> Self {
        Self {
            status,
            values: Some(values),
            statistics,
        }
    }

    pub fn unsolved(status: SolveStatus, statistics: SolverStatistics) -> Self {
        Self {
            status,
            values: None,
            statistics,
        }
    }

    /// Returns the valuation if the solve succeeded.
    pub fn solution(&self) -> Option<&[bool]> {
        if self.status.has_solution() {
            self.values.as_deref()
        } else {
            None
        }
    }
}
