//! Record builders.

use equishare_core::{ClientRecord, RawRecord};

/// A raw debt row with one account.
pub fn raw(client_id: &str, capital: f64, origin: &str, zone: &str) -> RawRecord {
    RawRecord::new(client_id, capital, origin, zone).with_account_count(1)
}

/// An aggregated client with one account.
pub fn client(client_id: &str, capital: f64, origin: &str, zone: &str) -> ClientRecord {
    ClientRecord::new(client_id, capital, 1, zone, origin)
}

/// `n` clients `C000..`, equal capital, one zone, the first `from_origin`
/// previously held by `origin`.
pub fn uniform_clients(n: usize, capital: f64, from_origin: usize, origin: &str) -> Vec<ClientRecord> {
    (0..n)
        .map(|i| {
            let holder = if i < from_origin { origin } else { "" };
            client(&format!("C{i:03}"), capital, holder, "NORTE")
        })
        .collect()
}

/// Raw rows matching [`uniform_clients`].
pub fn uniform_records(n: usize, capital: f64, from_origin: usize, origin: &str) -> Vec<RawRecord> {
    uniform_clients(n, capital, from_origin, origin)
        .into_iter()
        .map(|c| raw(&c.client_id, c.capital, &c.origin_party, &c.zone))
        .collect()
}
