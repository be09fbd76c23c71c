//! Client → party assignments and their method labels.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use super::PartySet;
use crate::error::{EquiShareError, Result};

/// A write-once mapping from client id to a member of a [`PartySet`].
///
/// # Examples
///
/// ```
/// use equishare_core::{Assignment, PartySet};
///
/// let parties = PartySet::new(["A", "B"]).unwrap();
/// let mut assignment = Assignment::new(parties);
/// assignment.assign("c1", 1).unwrap();
///
/// assert_eq!(assignment.party_of("c1"), Some("B"));
/// assert!(assignment.assign("c1", 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    parties: PartySet,
    entries: BTreeMap<String, usize>,
}

impl Assignment {
    pub fn new(parties: PartySet) -> Self {
        Self {
            parties,
            entries: BTreeMap::new(),
        }
    }

    /// Assigns a client to the party at `party_index`.
    ///
    /// # Errors
    ///
    /// Fails if the client already has a party or the index is out of range.
    pub fn assign(&mut self, client_id: impl Into<String>, party_index: usize) -> Result<()> {
        if party_index >= self.parties.len() {
            return Err(EquiShareError::PartyOutOfRange {
                index: party_index,
                count: self.parties.len(),
            });
        }
        match self.entries.entry(client_id.into()) {
            Entry::Occupied(e) => Err(EquiShareError::AlreadyAssigned(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(party_index);
                Ok(())
            }
        }
    }

    pub fn parties(&self) -> &PartySet {
        &self.parties
    }

    pub fn party_index_of(&self, client_id: &str) -> Option<usize> {
        self.entries.get(client_id).copied()
    }

    pub fn party_of(&self, client_id: &str) -> Option<&str> {
        self.party_index_of(client_id)
            .and_then(|idx| self.parties.get(idx))
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.entries.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(client_id, party)` pairs in client id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(client, &idx)| {
            (client.as_str(), self.parties.as_slice()[idx].as_str())
        })
    }

    /// Number of clients per party, indexed like the party set.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.parties.len()];
        for &idx in self.entries.values() {
            counts[idx] += 1;
        }
        counts
    }
}

/// How the assignment of a batch was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignmentMethod {
    /// Small batch, distributed by descending-capital round-robin.
    Direct,
    /// Produced by the solver at the named relaxation level.
    Optimized(String),
    /// Every relaxation level failed; round-robin fallback.
    Fallback,
    /// The engine failed while building or solving; round-robin rescue.
    Emergency,
}

impl AssignmentMethod {
    /// Returns true if the constraints were enforced by the solver.
    pub fn is_optimized(&self) -> bool {
        matches!(self, AssignmentMethod::Optimized(_))
    }

    /// Returns true for outcomes produced without optimization after
    /// optimization was attempted.
    pub fn is_degraded(&self) -> bool {
        matches!(self, AssignmentMethod::Fallback | AssignmentMethod::Emergency)
    }

    pub fn label(&self) -> &str {
        match self {
            AssignmentMethod::Direct => "Direct/low-volume assignment",
            AssignmentMethod::Optimized(label) => label,
            AssignmentMethod::Fallback => "Heuristic (solver fallback)",
            AssignmentMethod::Emergency => "Emergency round-robin (engine error)",
        }
    }
}

impl fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
