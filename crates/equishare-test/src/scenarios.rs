//! Reference portfolios.

use equishare_core::{ClientRecord, PartySet};

use crate::records::uniform_clients;

/// Parties `P1..=Pm`.
pub fn parties(m: usize) -> PartySet {
    PartySet::new((1..=m).map(|i| format!("P{i}"))).expect("party names are distinct")
}

/// A batch of clients together with its party set.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub clients: Vec<ClientRecord>,
    pub parties: PartySet,
}

impl Scenario {
    /// 3 parties, 45 equal clients, 10 of them held by P1.
    ///
    /// Satisfiable at the strictest level: 15 clients per party.
    pub fn balanced_45() -> Self {
        Self {
            clients: uniform_clients(45, 1_000.0, 10, "P1"),
            parties: parties(3),
        }
    }

    /// 3 parties, 40 equal clients, 10 of them held by P1.
    ///
    /// 40 does not split evenly, so only the widest level is satisfiable.
    pub fn uneven_40() -> Self {
        Self {
            clients: uniform_clients(40, 1_000.0, 10, "P1"),
            parties: parties(3),
        }
    }

    /// 3 parties, 20 clients of distinct capital; below the small-batch
    /// threshold.
    pub fn small_20() -> Self {
        let clients = (0..20)
            .map(|i| {
                crate::records::client(&format!("S{i:02}"), 100.0 * (i + 1) as f64, "P2", "SUR")
            })
            .collect();
        Self {
            clients,
            parties: parties(3),
        }
    }

    /// One party, 30 clients all held by it; the retention cap cannot hold.
    pub fn single_party_retention() -> Self {
        Self {
            clients: uniform_clients(30, 500.0, 30, "P1"),
            parties: parties(1),
        }
    }
}
