//! Internal advisor rotation.
//!
//! Clients of one segment are dealt to advisors in rounds, per cohort and
//! capital tier, under a per-advisor quota. An advisor never receives a
//! client it handled before.

use std::collections::{BTreeMap, HashMap, VecDeque};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use equishare_config::{AdvisorConfig, CapitalTier};
use equishare_core::RawRecord;

use crate::aggregate::prepare;

/// A client of the rotation pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolClient {
    pub client_id: String,
    pub cohort: String,
    pub origin_party: String,
    pub capital: f64,
}

/// One client placed with an advisor.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub client_id: String,
    pub capital: f64,
    pub previous_handler: String,
    pub advisor: String,
    pub cohort: String,
    pub tier: String,
}

/// Placement counts of one (cohort, tier) pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierReport {
    pub cohort: String,
    pub tier: String,
    pub candidates: usize,
    pub placed: usize,
    pub leftover: usize,
}

/// Output of [`run_internal`].
#[derive(Debug, Clone, Default)]
pub struct InternalRun {
    /// Sorted by cohort, advisor, then descending capital.
    pub placements: Vec<Placement>,
    pub tiers: Vec<TierReport>,
}

impl InternalRun {
    pub fn leftover(&self) -> usize {
        self.tiers.iter().map(|t| t.leftover).sum()
    }
}

/// Keeps rows of `segment` and sums capital per (client, cohort, origin).
///
/// The segment match ignores surrounding whitespace and ASCII case. Output
/// is ordered by the grouping key.
pub fn pool_clients(records: &[RawRecord], segment: &str) -> Vec<PoolClient> {
    let segment = segment.trim();
    let mut grouped: BTreeMap<(&str, &str, &str), f64> = BTreeMap::new();
    for record in records {
        let in_segment = record
            .segment
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(segment));
        if !in_segment {
            continue;
        }
        let key = (
            record.client_id.as_str(),
            record.cohort.as_deref().unwrap_or(""),
            record.origin_party.as_str(),
        );
        *grouped.entry(key).or_insert(0.0) += record.capital;
    }
    grouped
        .into_iter()
        .map(|((client_id, cohort, origin), capital)| PoolClient {
            client_id: client_id.to_string(),
            cohort: cohort.to_string(),
            origin_party: origin.to_string(),
            capital,
        })
        .collect()
}

/// Per-origin FIFO queues of pool positions with an ordered head index.
///
/// Each non-empty queue has exactly one entry in `heads`, keyed by its
/// front position, so the first two heads always carry distinct origins.
#[derive(Debug)]
struct OriginQueues<'a> {
    queues: HashMap<&'a str, VecDeque<usize>>,
    heads: BTreeMap<usize, &'a str>,
}

impl<'a> OriginQueues<'a> {
    fn new(origins: &[&'a str]) -> Self {
        let mut queues: HashMap<&'a str, VecDeque<usize>> = HashMap::new();
        for (pos, &origin) in origins.iter().enumerate() {
            queues.entry(origin).or_default().push_back(pos);
        }
        let heads = queues
            .iter()
            .filter_map(|(&origin, q)| q.front().map(|&pos| (pos, origin)))
            .collect();
        Self { queues, heads }
    }

    fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Takes the first position, in pool order, whose origin is not `excluded`.
    fn take_excluding(&mut self, excluded: &str) -> Option<usize> {
        let (&pos, &origin) = self.heads.iter().find(|(_, &o)| o != excluded)?;
        self.heads.remove(&pos);
        let queue = self.queues.get_mut(origin)?;
        queue.pop_front();
        if let Some(&next) = queue.front() {
            self.heads.insert(next, origin);
        }
        Some(pos)
    }
}

/// Placements of one rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    /// `(pool position, advisor index)` in placement order.
    pub assigned: Vec<(usize, usize)>,
    pub leftover: usize,
}

/// Deals pool positions to advisors in rounds.
///
/// In each round every advisor under `quota` takes the first remaining
/// position whose origin differs from the advisor's name. Stops when a
/// round places nobody or the pool is empty.
///
/// ```
/// use equishare::advisor::rotate;
///
/// let advisors = vec!["ANA".to_string(), "LUIS".to_string()];
/// let outcome = rotate(&["ANA", "ANA", "LUIS"], &advisors, 5);
///
/// // Clients handled by ANA only ever go to LUIS.
/// assert_eq!(outcome.assigned, vec![(2, 0), (0, 1), (1, 1)]);
/// assert_eq!(outcome.leftover, 0);
/// ```
pub fn rotate(origins: &[&str], advisors: &[String], quota: usize) -> RotationOutcome {
    let mut queues = OriginQueues::new(origins);
    let mut counts = vec![0usize; advisors.len()];
    let mut assigned = Vec::new();
    let mut round = 0usize;

    while !queues.is_empty() {
        round += 1;
        let mut placed = 0usize;
        for (a, advisor) in advisors.iter().enumerate() {
            if counts[a] >= quota {
                continue;
            }
            if let Some(pos) = queues.take_excluding(advisor) {
                assigned.push((pos, a));
                counts[a] += 1;
                placed += 1;
            }
        }
        debug!(event = "advisor_round", round, placed, remaining = queues.remaining());
        if placed == 0 {
            break;
        }
    }

    RotationOutcome {
        assigned,
        leftover: queues.remaining(),
    }
}

fn rotate_tier(
    cohort: &str,
    clients: &[&PoolClient],
    tier: &CapitalTier,
    config: &AdvisorConfig,
) -> (Vec<Placement>, TierReport) {
    let mut pool: Vec<&PoolClient> = clients.iter().copied().filter(|c| tier.contains(c.capital)).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.shuffle_seed);
    pool.shuffle(&mut rng);

    let origins: Vec<&str> = pool.iter().map(|c| c.origin_party.as_str()).collect();
    let outcome = rotate(&origins, &config.names, tier.quota);
    let placements: Vec<Placement> = outcome
        .assigned
        .iter()
        .map(|&(pos, a)| {
            let client = pool[pos];
            Placement {
                client_id: client.client_id.clone(),
                capital: client.capital,
                previous_handler: client.origin_party.clone(),
                advisor: config.names[a].clone(),
                cohort: cohort.to_string(),
                tier: tier.label.clone(),
            }
        })
        .collect();

    let report = TierReport {
        cohort: cohort.to_string(),
        tier: tier.label.clone(),
        candidates: pool.len(),
        placed: placements.len(),
        leftover: outcome.leftover,
    };
    (placements, report)
}

/// Runs the advisor rotation over every cohort and tier.
pub fn run_internal(records: Vec<RawRecord>, config: &AdvisorConfig) -> InternalRun {
    let records = prepare(records);
    let clients = pool_clients(&records, &config.segment);

    let mut cohorts: BTreeMap<&str, Vec<&PoolClient>> = BTreeMap::new();
    for client in &clients {
        cohorts.entry(client.cohort.as_str()).or_default().push(client);
    }
    info!(
        event = "internal_start",
        clients = clients.len(),
        cohorts = cohorts.len(),
        advisors = config.names.len(),
    );

    let mut run = InternalRun::default();
    for (cohort, members) in &cohorts {
        for tier in &config.tiers {
            let (placements, report) = rotate_tier(cohort, members, tier, config);
            info!(
                event = "tier_end",
                cohort = %cohort,
                tier = %tier.label,
                candidates = report.candidates,
                placed = report.placed,
                leftover = report.leftover,
            );
            run.placements.extend(placements);
            run.tiers.push(report);
        }
    }

    run.placements.sort_by(|a, b| {
        a.cohort
            .cmp(&b.cohort)
            .then_with(|| a.advisor.cmp(&b.advisor))
            .then_with(|| b.capital.total_cmp(&a.capital))
    });
    info!(
        event = "internal_end",
        placed = run.placements.len(),
        leftover = run.leftover(),
    );
    run
}

#[cfg(test)]
mod tests;
