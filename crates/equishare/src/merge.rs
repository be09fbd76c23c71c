//! Joining per-client decisions back onto raw rows.

use std::collections::HashMap;

use rand::Rng;
use tracing::warn;

use equishare_core::{Assignment, PartySet, RawRecord};

/// A raw row with its final party.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedRecord {
    pub record: RawRecord,
    pub assigned_party: String,
}

/// Rows of a run with their final parties.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub rows: Vec<AssignedRecord>,
    /// Clients that had no party after the join and were given a random one.
    pub orphans: usize,
}

/// Accumulates rows of a run, then patches orphans once.
#[derive(Debug, Default)]
pub struct ResultMerger {
    rows: Vec<(RawRecord, Option<String>)>,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds locked rows, which keep their current handler.
    ///
    /// A locked row without a handler becomes an orphan.
    pub fn add_locked(&mut self, records: impl IntoIterator<Item = RawRecord>) {
        self.rows.extend(records.into_iter().map(|record| {
            let party = Some(record.origin_party.clone()).filter(|p| !p.is_empty());
            (record, party)
        }));
    }

    /// Adds the rows of one batch with the batch's assignment.
    pub fn add_batch(&mut self, records: impl IntoIterator<Item = RawRecord>, assignment: &Assignment) {
        self.rows.extend(records.into_iter().map(|record| {
            let party = assignment.party_of(&record.client_id).map(str::to_string);
            (record, party)
        }));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gives every client without a party one uniformly random party,
    /// shared by all of its rows.
    pub fn finish<R: Rng>(self, parties: &PartySet, rng: &mut R) -> MergeOutcome {
        let mut patched: HashMap<String, String> = HashMap::new();
        let rows = self
            .rows
            .into_iter()
            .map(|(record, party)| {
                let assigned_party = match party {
                    Some(party) => party,
                    None => patched
                        .entry(record.client_id.clone())
                        .or_insert_with(|| parties.rotation(rng.random_range(0..parties.len())).to_string())
                        .clone(),
                };
                AssignedRecord {
                    record,
                    assigned_party,
                }
            })
            .collect();
        let orphans = patched.len();
        if orphans > 0 {
            warn!(
                event = "orphans_patched",
                orphans,
                "clients left without a party were assigned at random",
            );
        }
        MergeOutcome { rows, orphans }
    }
}
