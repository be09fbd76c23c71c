use std::collections::HashMap;

use equishare_test::raw;

use super::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn segment_row(id: &str, capital: f64, origin: &str, cohort: &str) -> RawRecord {
    raw(id, capital, origin, "Z").with_cohort(cohort).with_segment("CD+")
}

#[test]
fn test_quota_leaves_leftover() {
    let outcome = rotate(&["X"; 5], &names(&["A"]), 2);

    assert_eq!(outcome.assigned, vec![(0, 0), (1, 0)]);
    assert_eq!(outcome.leftover, 3);
}

#[test]
fn test_rotation_stalls_on_own_clients() {
    let outcome = rotate(&["A", "A", "A"], &names(&["A"]), 10);

    assert!(outcome.assigned.is_empty());
    assert_eq!(outcome.leftover, 3);
}

#[test]
fn test_rounds_deal_in_advisor_order() {
    let outcome = rotate(&["Z", "Z", "Z", "Z"], &names(&["A", "B"]), 10);

    let advisors: Vec<usize> = outcome.assigned.iter().map(|&(_, a)| a).collect();
    assert_eq!(advisors, vec![0, 1, 0, 1]);
    let positions: Vec<usize> = outcome.assigned.iter().map(|&(p, _)| p).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
}

#[test]
fn test_no_advisor_receives_own_client() {
    let advisors = names(&["A", "B", "C"]);
    let origins: Vec<&str> = (0..60)
        .map(|i| match i % 4 {
            0 => "A",
            1 => "B",
            2 => "C",
            _ => "OTHER",
        })
        .collect();
    let outcome = rotate(&origins, &advisors, 15);

    assert_eq!(outcome.assigned.len() + outcome.leftover, 60);
    for &(pos, a) in &outcome.assigned {
        assert_ne!(origins[pos], advisors[a]);
    }
    let mut per_advisor = [0usize; 3];
    for &(_, a) in &outcome.assigned {
        per_advisor[a] += 1;
    }
    assert!(per_advisor.iter().all(|&n| n <= 15));
}

#[test]
fn test_pool_filters_segment_and_groups() {
    let records = vec![
        raw("1", 100.0, "A", "Z").with_cohort("2020").with_segment(" cd+ "),
        raw("1", 50.0, "A", "Z").with_cohort("2020").with_segment("CD+"),
        raw("1", 70.0, "A", "Z").with_cohort("2021").with_segment("CD+"),
        raw("2", 10.0, "A", "Z").with_cohort("2020").with_segment("RETAIL"),
        raw("3", 10.0, "A", "Z").with_cohort("2020"),
    ];
    let pool = pool_clients(&records, "CD+");

    assert_eq!(pool.len(), 2);
    assert_eq!(pool[0].client_id, "1");
    assert_eq!(pool[0].cohort, "2020");
    assert_eq!(pool[0].capital, 150.0);
    assert_eq!(pool[1].cohort, "2021");
    assert_eq!(pool[1].capital, 70.0);
}

#[test]
fn test_tiers_split_by_capital() {
    let records = vec![
        segment_row("T1", 20_000.0, "OLD", "2020"),
        segment_row("M1", 10_000.0, "OLD", "2020"),
        segment_row("M2", 1_000.0, "OLD", "2020"),
        segment_row("S1", 500.0, "OLD", "2020"),
    ];
    let run = run_internal(records, &AdvisorConfig::default());

    let by_id: HashMap<&str, &Placement> = run.placements.iter().map(|p| (p.client_id.as_str(), p)).collect();
    assert_eq!(by_id["T1"].tier, "TOP >10k");
    assert_eq!(by_id["M1"].tier, "MID 1k-10k");
    assert_eq!(by_id["M2"].tier, "MID 1k-10k");
    assert!(!by_id.contains_key("S1"));
    assert_eq!(run.tiers.len(), 2);
    assert_eq!(run.tiers[0].candidates, 1);
    assert_eq!(run.tiers[1].candidates, 2);
    assert_eq!(run.leftover(), 0);
}

#[test]
fn test_output_is_sorted_and_deterministic() {
    let records: Vec<RawRecord> = (0..40)
        .map(|i| {
            let cohort = if i % 2 == 0 { "2021" } else { "2020" };
            let origin = format!("ASESOR_{}", i % 5 + 1);
            segment_row(&format!("C{i:02}"), 2_000.0 + f64::from(i) * 100.0, &origin, cohort)
        })
        .collect();
    let config = AdvisorConfig::default();

    let first = run_internal(records.clone(), &config);
    let second = run_internal(records, &config);

    assert_eq!(first.placements, second.placements);
    assert_eq!(first.placements.len(), 40);
    for pair in first.placements.windows(2) {
        let key = |p: &Placement| (p.cohort.clone(), p.advisor.clone());
        assert!(key(&pair[0]) <= key(&pair[1]));
        if key(&pair[0]) == key(&pair[1]) {
            assert!(pair[0].capital >= pair[1].capital);
        }
    }
    assert!(first.placements.iter().all(|p| p.advisor != p.previous_handler));
}

#[test]
fn test_quota_applies_per_cohort() {
    let config = AdvisorConfig {
        names: names(&["A"]),
        tiers: vec![CapitalTier {
            label: "ALL".to_string(),
            min_capital: 0.0,
            min_inclusive: true,
            max_capital: None,
            quota: 1,
        }],
        ..AdvisorConfig::default()
    };
    let records = vec![
        segment_row("1", 10.0, "X", "2020"),
        segment_row("2", 10.0, "X", "2020"),
        segment_row("3", 10.0, "X", "2021"),
    ];
    let run = run_internal(records, &config);

    assert_eq!(run.placements.len(), 2);
    assert_eq!(run.leftover(), 1);
    assert_eq!(run.tiers[0].cohort, "2020");
    assert_eq!(run.tiers[0].leftover, 1);
}
