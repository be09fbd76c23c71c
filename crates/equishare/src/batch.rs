//! External reassignment run over a whole record set.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use equishare_config::{BatchMode, EquiShareConfig};
use equishare_core::{Assignment, AssignmentMethod, EquiShareError, PartySet, RawRecord, Result};
use equishare_solver::LinearSolver;

use crate::aggregate::{aggregate, prepare};
use crate::cascade::LevelAttempt;
use crate::engine::AssignmentEngine;
use crate::fallback::round_robin;
use crate::merge::{AssignedRecord, ResultMerger};

/// Summary of one batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Cohort of the batch; `None` for the unified batch and for rows
    /// without a cohort.
    pub cohort: Option<String>,
    pub clients: usize,
    pub records: usize,
    pub method: AssignmentMethod,
    pub attempts: Vec<LevelAttempt>,
}

/// Output of [`run_external`].
#[derive(Debug, Clone)]
pub struct ExternalRun {
    /// Locked rows first, then batch rows in batch order.
    pub rows: Vec<AssignedRecord>,
    pub batches: Vec<BatchReport>,
    pub locked: usize,
    /// Clients patched with a random party after the merge.
    pub orphans: usize,
}

impl ExternalRun {
    /// Returns true if any batch ended in fallback or emergency allocation.
    pub fn is_degraded(&self) -> bool {
        self.batches.iter().any(|b| b.method.is_degraded())
    }
}

fn split_batches(records: Vec<RawRecord>, mode: BatchMode) -> Vec<(Option<String>, Vec<RawRecord>)> {
    if records.is_empty() {
        return Vec::new();
    }
    match mode {
        BatchMode::Unified => vec![(None, records)],
        BatchMode::PerCohort => {
            // A client belongs to the cohort of its first row, so every row
            // of a client lands in one batch.
            let mut home: HashMap<String, Option<String>> = HashMap::new();
            let mut cohorts: BTreeMap<Option<String>, Vec<RawRecord>> = BTreeMap::new();
            for record in records {
                let cohort = home
                    .entry(record.client_id.clone())
                    .or_insert_with(|| record.cohort.clone())
                    .clone();
                cohorts.entry(cohort).or_default().push(record);
            }
            cohorts.into_iter().collect()
        }
    }
}

/// Reassigns every non-locked row of `records` among the configured
/// parties.
///
/// # Errors
///
/// Fails only when `config` is invalid.
pub fn run_external<S: LinearSolver>(
    records: Vec<RawRecord>,
    config: &EquiShareConfig,
    solver: S,
) -> Result<ExternalRun> {
    config
        .validate()
        .map_err(|e| EquiShareError::Config(e.to_string()))?;
    let parties = config
        .party_set()
        .map_err(|e| EquiShareError::Config(e.to_string()))?;
    let engine = AssignmentEngine::from_config(solver, config);
    let mut rng = match config.random_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };
    Ok(run_with_engine(records, &parties, &engine, config.batch_mode, &mut rng))
}

/// Runs prepared batches through `engine`.
///
/// Batches run sequentially and independently. An engine error in one
/// batch downgrades that batch to an emergency round-robin instead of
/// failing the run. `rng` patches orphan rows.
pub fn run_with_engine<S: LinearSolver, R: Rng>(
    records: Vec<RawRecord>,
    parties: &PartySet,
    engine: &AssignmentEngine<S>,
    mode: BatchMode,
    rng: &mut R,
) -> ExternalRun {
    let started = Instant::now();
    let (locked, open): (Vec<RawRecord>, Vec<RawRecord>) =
        prepare(records).into_iter().partition(|r| r.locked);
    let locked_count = locked.len();
    info!(
        event = "run_start",
        records = locked_count + open.len(),
        locked = locked_count,
        parties = parties.len(),
    );

    let mut merger = ResultMerger::new();
    merger.add_locked(locked);

    let mut batches = Vec::new();
    for (cohort, rows) in split_batches(open, mode) {
        let clients = aggregate(&rows);
        let cohort_label = cohort.as_deref().unwrap_or("*");
        info!(
            event = "batch_start",
            cohort = cohort_label,
            clients = clients.len(),
            records = rows.len(),
        );

        let (assignment, method, attempts) = match engine.assign(&clients, parties) {
            Ok(result) => (result.assignment, result.method, result.attempts),
            Err(e) => {
                warn!(
                    event = "batch_emergency",
                    cohort = cohort_label,
                    error = %e,
                    "engine failed, using emergency round-robin",
                );
                let assignment = round_robin(&clients, parties)
                    .unwrap_or_else(|_| Assignment::new(parties.clone()));
                (assignment, AssignmentMethod::Emergency, Vec::new())
            }
        };

        info!(
            event = "batch_end",
            cohort = cohort_label,
            method = %method,
            degraded = method.is_degraded(),
            assigned = assignment.len(),
        );
        batches.push(BatchReport {
            cohort,
            clients: clients.len(),
            records: rows.len(),
            method,
            attempts,
        });
        merger.add_batch(rows, &assignment);
    }

    let merged = merger.finish(parties, rng);
    info!(
        event = "run_end",
        batches = batches.len(),
        rows = merged.rows.len(),
        orphans = merged.orphans,
        duration_ms = started.elapsed().as_millis() as u64,
    );
    ExternalRun {
        rows: merged.rows,
        batches,
        locked: locked_count,
        orphans: merged.orphans,
    }
}
