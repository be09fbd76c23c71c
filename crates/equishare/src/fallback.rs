//! Deterministic round-robin allocation.

use equishare_core::{Assignment, ClientRecord, PartySet, Result};

/// Deals clients to parties by descending capital, cycling the party
/// order. Ties keep the input order. Enforces no constraint.
///
/// ```
/// use equishare::fallback::round_robin;
/// use equishare_core::{ClientRecord, PartySet};
///
/// let parties = PartySet::new(["A", "B"]).unwrap();
/// let clients = vec![
///     ClientRecord::new("c1", 10.0, 1, "Z", ""),
///     ClientRecord::new("c2", 30.0, 1, "Z", ""),
///     ClientRecord::new("c3", 20.0, 1, "Z", ""),
/// ];
/// let assignment = round_robin(&clients, &parties).unwrap();
///
/// assert_eq!(assignment.party_of("c2"), Some("A"));
/// assert_eq!(assignment.party_of("c3"), Some("B"));
/// assert_eq!(assignment.party_of("c1"), Some("A"));
/// ```
pub fn round_robin(clients: &[ClientRecord], parties: &PartySet) -> Result<Assignment> {
    let mut order: Vec<&ClientRecord> = clients.iter().collect();
    order.sort_by(|a, b| b.capital.total_cmp(&a.capital));

    let mut assignment = Assignment::new(parties.clone());
    for (k, client) in order.into_iter().enumerate() {
        assignment.assign(client.client_id.clone(), k % parties.len())?;
    }
    Ok(assignment)
}
