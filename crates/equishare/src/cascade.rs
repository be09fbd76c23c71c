//! Relaxation cascade.
//!
//! Levels are tried strictly in order, each at most once. The first level
//! whose model the solver satisfies, and whose valuation decodes to a
//! total assignment, wins.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use equishare_core::{Assignment, RelaxationLevel, Result};
use equishare_solver::{LinearSolver, SolveParams, SolveStatus};

use crate::model_builder::ConstraintModelBuilder;

/// Record of one cascade level attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelAttempt {
    pub label: String,
    pub status: SolveStatus,
    pub duration: Duration,
    /// False if the solver reported success but the valuation did not
    /// decode to a total assignment.
    pub decoded: bool,
}

impl LevelAttempt {
    pub fn succeeded(&self) -> bool {
        self.status.has_solution() && self.decoded
    }
}

/// Result of running the cascade.
#[derive(Debug)]
pub struct CascadeOutcome {
    /// The winning assignment and the label of its level.
    pub solved: Option<(Assignment, String)>,
    pub attempts: Vec<LevelAttempt>,
}

/// Runs `ladder` against `solver` until a level succeeds.
///
/// Model building errors abort the cascade; solver failures only advance
/// it.
pub fn run_cascade<S: LinearSolver + ?Sized>(
    builder: &ConstraintModelBuilder<'_>,
    ladder: &[RelaxationLevel],
    solver: &S,
    params: &SolveParams,
) -> Result<CascadeOutcome> {
    let mut attempts = Vec::with_capacity(ladder.len());

    for (index, level) in ladder.iter().enumerate() {
        info!(
            event = "level_attempt",
            level = index,
            label = %level.label,
            tolerance = level.tolerance,
            zones = level.use_zone_balancing,
        );
        let started = Instant::now();
        let batch = builder.build(level)?;
        let outcome = solver.solve(batch.model(), params);

        let decoded = outcome
            .solution()
            .map(|values| batch.decode(values, builder.clients(), builder.parties()));
        let attempt = LevelAttempt {
            label: level.label.clone(),
            status: outcome.status,
            duration: started.elapsed(),
            decoded: matches!(decoded, Some(Ok(_))),
        };
        info!(
            event = "level_result",
            level = index,
            label = %attempt.label,
            status = attempt.status.as_str(),
            duration_ms = attempt.duration.as_millis() as u64,
        );
        attempts.push(attempt);

        match decoded {
            Some(Ok(assignment)) => {
                return Ok(CascadeOutcome {
                    solved: Some((assignment, level.label.clone())),
                    attempts,
                });
            }
            Some(Err(e)) => {
                warn!(event = "level_result", label = %level.label, error = %e, "solution rejected");
            }
            None => {}
        }
    }

    Ok(CascadeOutcome {
        solved: None,
        attempts,
    })
}
