//! Record preparation and client aggregation.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use equishare_core::{ClientRecord, RawRecord};

/// Normalizes raw rows before allocation.
///
/// Trims `client_id` and `origin_party`, coerces non-finite or negative
/// capital to `0`, and fills a missing `account_count` with the number of
/// rows sharing the client id.
pub fn prepare(mut records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut rows_per_client: HashMap<String, u32> = HashMap::new();
    for record in &mut records {
        let trimmed = record.client_id.trim();
        if trimmed.len() != record.client_id.len() {
            record.client_id = trimmed.to_string();
        }
        let origin = record.origin_party.trim();
        if origin.len() != record.origin_party.len() {
            record.origin_party = origin.to_string();
        }
        record.capital = clean_capital(record.capital);
        *rows_per_client.entry(record.client_id.clone()).or_insert(0) += 1;
    }
    for record in &mut records {
        if record.account_count.is_none() {
            record.account_count = rows_per_client.get(&record.client_id).copied();
        }
    }
    records
}

fn clean_capital(capital: f64) -> f64 {
    if capital.is_finite() && capital > 0.0 {
        capital
    } else {
        0.0
    }
}

struct Accumulator {
    client: ClientRecord,
    rows: u32,
    counted: bool,
}

/// Collapses raw rows into one [`ClientRecord`] per client id.
///
/// Capital is summed; zone, account count and origin come from the first
/// row seen for the client. A client whose first row carries no account
/// count gets the number of its rows. Output is ordered by client id.
///
/// ```
/// use equishare::aggregate;
/// use equishare_core::RawRecord;
///
/// let rows = vec![
///     RawRecord::new("A1", 100.0, "P1", "NORTE"),
///     RawRecord::new("A1", 200.0, "P2", "SUR"),
///     RawRecord::new("A1", 50.0, "P3", "SUR"),
/// ];
/// let clients = aggregate(&rows);
///
/// assert_eq!(clients.len(), 1);
/// assert_eq!(clients[0].capital, 350.0);
/// assert_eq!(clients[0].origin_party, "P1");
/// ```
pub fn aggregate(records: &[RawRecord]) -> Vec<ClientRecord> {
    let mut clients: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in records {
        match clients.entry(record.client_id.as_str()) {
            Entry::Occupied(mut e) => {
                let acc = e.get_mut();
                acc.client.capital += clean_capital(record.capital);
                acc.rows += 1;
            }
            Entry::Vacant(e) => {
                e.insert(Accumulator {
                    client: ClientRecord::new(
                        record.client_id.clone(),
                        clean_capital(record.capital),
                        record.account_count.unwrap_or(1),
                        record.zone.clone(),
                        record.origin_party.clone(),
                    ),
                    rows: 1,
                    counted: record.account_count.is_some(),
                });
            }
        }
    }
    clients
        .into_values()
        .map(|mut acc| {
            if !acc.counted {
                acc.client.account_count = acc.rows.max(1);
            }
            acc.client
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_cleans_rows() {
        let rows = vec![
            RawRecord::new("  A1 ", f64::NAN, " P1", "NORTE"),
            RawRecord::new("A1", -5.0, "P1", "NORTE"),
            RawRecord::new("B2", 10.0, "P2", "SUR").with_account_count(4),
        ];
        let prepared = prepare(rows);

        assert_eq!(prepared[0].client_id, "A1");
        assert_eq!(prepared[0].origin_party, "P1");
        assert_eq!(prepared[0].capital, 0.0);
        assert_eq!(prepared[1].capital, 0.0);
        assert_eq!(prepared[0].account_count, Some(2));
        assert_eq!(prepared[2].account_count, Some(4));
    }

    #[test]
    fn test_aggregate_is_ordered_by_client() {
        let rows = vec![
            RawRecord::new("Z9", 1.0, "", "SUR"),
            RawRecord::new("A1", 2.0, "", "SUR"),
            RawRecord::new("M5", 3.0, "", "SUR"),
        ];
        let ids: Vec<String> = aggregate(&rows).into_iter().map(|c| c.client_id).collect();

        assert_eq!(ids, vec!["A1", "M5", "Z9"]);
    }

    #[test]
    fn test_first_row_wins_for_representative_fields() {
        let rows = vec![
            RawRecord::new("A1", 1.0, "P1", "NORTE").with_account_count(3),
            RawRecord::new("A1", 1.0, "P2", "SUR").with_account_count(9),
        ];
        let clients = aggregate(&rows);

        assert_eq!(clients[0].account_count, 3);
        assert_eq!(clients[0].zone, "NORTE");
        assert_eq!(clients[0].origin_party, "P1");
    }

    #[test]
    fn test_missing_account_count_uses_row_count() {
        let rows = vec![
            RawRecord::new("A1", 1.0, "P1", "NORTE"),
            RawRecord::new("A1", 1.0, "P1", "NORTE"),
        ];
        assert_eq!(aggregate(&rows)[0].account_count, 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
        assert!(prepare(Vec::new()).is_empty());
    }
}
