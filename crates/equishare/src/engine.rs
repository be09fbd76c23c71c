//! The assignment engine for one batch.

use std::time::Duration;

use tracing::{info, warn};

use equishare_config::{AllocationConfig, EquiShareConfig};
use equishare_core::{Assignment, AssignmentMethod, ClientRecord, PartySet, RelaxationLevel, Result};
use equishare_solver::{LinearSolver, LocalSearchSolver, SolveParams};

use crate::cascade::{run_cascade, LevelAttempt};
use crate::fallback::round_robin;
use crate::model_builder::ConstraintModelBuilder;

/// Assignment of one batch with the method that produced it.
#[derive(Debug, Clone)]
pub struct EngineResult {
    pub assignment: Assignment,
    pub method: AssignmentMethod,
    pub attempts: Vec<LevelAttempt>,
}

/// Partitions clients among parties.
///
/// Small batches are dealt round-robin; larger ones go through the
/// relaxation cascade, falling back to round-robin when every level fails.
/// The engine holds no mutable state, so one engine may serve many
/// batches and independent engines may run concurrently.
///
/// # Examples
///
/// ```
/// use equishare::AssignmentEngine;
/// use equishare_core::{AssignmentMethod, ClientRecord, PartySet};
/// use equishare_solver::LocalSearchSolver;
///
/// let parties = PartySet::new(["A", "B", "C"]).unwrap();
/// let clients: Vec<ClientRecord> = (0..5)
///     .map(|i| ClientRecord::new(format!("c{i}"), 100.0, 1, "Z", ""))
///     .collect();
///
/// let engine = AssignmentEngine::new(LocalSearchSolver::new());
/// let result = engine.assign(&clients, &parties).unwrap();
///
/// assert_eq!(result.method, AssignmentMethod::Direct);
/// assert_eq!(result.assignment.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentEngine<S> {
    solver: S,
    policy: AllocationConfig,
    params: SolveParams,
}

impl<S: LinearSolver> AssignmentEngine<S> {
    /// Creates an engine with the default policy and solver budget.
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            policy: AllocationConfig::default(),
            params: SolveParams::default(),
        }
    }

    /// Creates an engine with the policy and budget of `config`.
    pub fn from_config(solver: S, config: &EquiShareConfig) -> Self {
        let mut params = SolveParams::default()
            .with_time_limit(config.solver.time_limit())
            .with_worker_count(config.solver.worker_count)
            .with_random_seed(config.random_seed.unwrap_or_else(rand::random));
        params.step_limit = config.solver.step_limit;
        Self {
            solver,
            policy: config.allocation.clone(),
            params,
        }
    }

    pub fn with_policy(mut self, policy: AllocationConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ladder(mut self, ladder: Vec<RelaxationLevel>) -> Self {
        self.policy.ladder = ladder;
        self
    }

    pub fn with_params(mut self, params: SolveParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.params.time_limit = limit;
        self
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn policy(&self) -> &AllocationConfig {
        &self.policy
    }

    pub fn params(&self) -> &SolveParams {
        &self.params
    }

    /// Returns true if a batch of `clients` clients skips optimization.
    pub fn is_small_batch(&self, clients: usize, parties: &PartySet) -> bool {
        clients < parties.len().saturating_mul(self.policy.small_batch_factor)
    }

    /// Assigns every client of the batch to exactly one party.
    ///
    /// # Errors
    ///
    /// Fails on duplicate client ids, an invalid relaxation level, or a
    /// model that cannot be built. Solver failures never surface as errors.
    pub fn assign(&self, clients: &[ClientRecord], parties: &PartySet) -> Result<EngineResult> {
        if self.is_small_batch(clients.len(), parties) {
            info!(
                event = "small_batch",
                clients = clients.len(),
                parties = parties.len(),
            );
            return Ok(EngineResult {
                assignment: round_robin(clients, parties)?,
                method: AssignmentMethod::Direct,
                attempts: Vec::new(),
            });
        }

        let builder = ConstraintModelBuilder::new(clients, parties, &self.policy);
        let cascade = run_cascade(&builder, &self.policy.ladder, &self.solver, &self.params)?;
        match cascade.solved {
            Some((assignment, label)) => Ok(EngineResult {
                assignment,
                method: AssignmentMethod::Optimized(label),
                attempts: cascade.attempts,
            }),
            None => {
                warn!(
                    event = "cascade_exhausted",
                    clients = clients.len(),
                    levels = cascade.attempts.len(),
                    "every relaxation level failed, using round-robin",
                );
                Ok(EngineResult {
                    assignment: round_robin(clients, parties)?,
                    method: AssignmentMethod::Fallback,
                    attempts: cascade.attempts,
                })
            }
        }
    }
}

impl Default for AssignmentEngine<LocalSearchSolver> {
    fn default() -> Self {
        Self::new(LocalSearchSolver::new())
    }
}
