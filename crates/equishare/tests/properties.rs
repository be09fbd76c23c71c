//! Property tests over aggregation and the deterministic allocators.

use proptest::prelude::*;

use equishare::advisor::rotate;
use equishare::model_builder::retention_cap;
use equishare::{aggregate, round_robin};
use equishare_core::{ClientRecord, RawRecord};
use equishare_test::parties;

fn arb_rows() -> impl Strategy<Value = Vec<RawRecord>> {
    prop::collection::vec((0u8..12, 0.0f64..1_000_000.0), 0..80).prop_map(|rows| {
        rows.into_iter()
            .map(|(id, capital)| RawRecord::new(format!("C{id}"), capital, "P1", "NORTE"))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn aggregation_preserves_capital(rows in arb_rows()) {
        let clients = aggregate(&rows);

        let mut ids: Vec<&str> = rows.iter().map(|r| r.client_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(clients.len(), ids.len());

        let raw_total: f64 = rows.iter().map(|r| r.capital).sum();
        let client_total: f64 = clients.iter().map(|c| c.capital).sum();
        prop_assert!((raw_total - client_total).abs() <= 1e-6 * raw_total.max(1.0));
        prop_assert!(clients.windows(2).all(|w| w[0].client_id < w[1].client_id));
    }

    #[test]
    fn round_robin_is_total_and_even(
        capitals in prop::collection::vec(0.0f64..10_000.0, 0..60),
        m in 1usize..6,
    ) {
        let clients: Vec<ClientRecord> = capitals
            .iter()
            .enumerate()
            .map(|(i, &c)| ClientRecord::new(format!("C{i}"), c, 1, "Z", ""))
            .collect();
        let assignment = round_robin(&clients, &parties(m)).unwrap();

        prop_assert_eq!(assignment.len(), clients.len());
        let counts = assignment.counts();
        let max = counts.iter().copied().max().unwrap_or(0);
        let min = counts.iter().copied().min().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn rotation_respects_handlers_and_quota(
        picks in prop::collection::vec(0usize..4, 0..120),
        quota in 1usize..12,
    ) {
        let names = ["A", "B", "C", "OUT"];
        let origins: Vec<&str> = picks.iter().map(|&k| names[k]).collect();
        let advisors: Vec<String> = names[..3].iter().map(|s| s.to_string()).collect();

        let outcome = rotate(&origins, &advisors, quota);

        prop_assert_eq!(outcome.assigned.len() + outcome.leftover, origins.len());
        let mut seen = vec![false; origins.len()];
        let mut per_advisor = [0usize; 3];
        for &(pos, a) in &outcome.assigned {
            prop_assert!(!seen[pos]);
            seen[pos] = true;
            prop_assert_ne!(origins[pos], advisors[a].as_str());
            per_advisor[a] += 1;
        }
        prop_assert!(per_advisor.iter().all(|&n| n <= quota));
    }

    #[test]
    fn retention_cap_bounds(prior in 0usize..2_000, ratio in 0.0f64..=1.0) {
        let cap = retention_cap(prior, ratio);

        prop_assert!(cap >= 0);
        prop_assert!(cap as usize <= prior);
        prop_assert!(cap as f64 >= prior as f64 * ratio - 1e-6);
    }
}
