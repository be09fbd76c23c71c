//! Ordered set of receiving parties.

use std::fmt;

use crate::error::{EquiShareError, Result};

/// An ordered, duplicate-free list of receiving parties.
///
/// Party indices are positions in this list; the solver model and the
/// round-robin allocators both address parties by index.
///
/// # Examples
///
/// ```
/// use equishare_core::PartySet;
///
/// let parties = PartySet::new(["ESCALL", "FINANCOBRO", "JYC"]).unwrap();
/// assert_eq!(parties.len(), 3);
/// assert_eq!(parties.index_of("JYC"), Some(2));
/// assert_eq!(parties.rotation(4), "FINANCOBRO");
///
/// assert!(PartySet::new(Vec::<String>::new()).is_err());
/// assert!(PartySet::new(["A", "A"]).is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PartySet {
    parties: Vec<String>,
}

impl PartySet {
    /// Creates a party set, rejecting empty and duplicate lists.
    pub fn new<I, S>(parties: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parties: Vec<String> = parties.into_iter().map(Into::into).collect();
        if parties.is_empty() {
            return Err(EquiShareError::EmptyPartySet);
        }
        for (i, party) in parties.iter().enumerate() {
            if parties[..i].contains(party) {
                return Err(EquiShareError::DuplicateParty(party.clone()));
            }
        }
        Ok(Self { parties })
    }

    /// Returns the number of parties (`m`).
    pub fn len(&self) -> usize {
        self.parties.len()
    }

    /// A valid party set is never empty.
    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.parties.get(index).map(String::as_str)
    }

    /// Returns the index of a party, if it is a member.
    pub fn index_of(&self, party: &str) -> Option<usize> {
        self.parties.iter().position(|p| p == party)
    }

    pub fn contains(&self, party: &str) -> bool {
        self.index_of(party).is_some()
    }

    /// Returns the party at position `k` of the endless cyclic rotation.
    pub fn rotation(&self, k: usize) -> &str {
        &self.parties[k % self.parties.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.parties.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.parties
    }
}

impl fmt::Debug for PartySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.parties).finish()
    }
}
