use equishare_config::AllocationConfig;
use equishare_core::RelaxationLevel;
use equishare_solver::LinearConstraint;
use equishare_test::{client, Scenario};

use super::*;

fn constraint<'m>(batch: &'m BatchModel, name: &str) -> Option<&'m LinearConstraint> {
    batch.model().constraints().iter().find(|c| c.name() == name)
}

fn strict() -> RelaxationLevel {
    RelaxationLevel::standard_ladder().remove(0)
}

#[test]
fn test_variable_layout() {
    let scenario = Scenario::balanced_45();
    let policy = AllocationConfig::default();
    let builder = ConstraintModelBuilder::new(&scenario.clients, &scenario.parties, &policy);
    let batch = builder.build(&strict()).unwrap();

    assert_eq!(batch.model().num_vars(), 135);
    assert_eq!(batch.model().groups().len(), 45);
    assert_eq!(batch.model().group_of(batch.var(2, 7)), Some(7));
}

#[test]
fn test_retention_only_for_holding_parties() {
    let scenario = Scenario::uneven_40();
    let policy = AllocationConfig::default();
    let batch = ConstraintModelBuilder::new(&scenario.clients, &scenario.parties, &policy)
        .build(&strict())
        .unwrap();

    let retention = constraint(&batch, "retention[P1]").unwrap();
    assert_eq!(retention.upper(), Some(2));
    assert_eq!(retention.expr().terms().len(), 10);
    assert!(constraint(&batch, "retention[P2]").is_none());
    assert!(constraint(&batch, "retention[P3]").is_none());
}

#[test]
fn test_global_equity_bands() {
    let scenario = Scenario::balanced_45();
    let policy = AllocationConfig::default();
    let batch = ConstraintModelBuilder::new(&scenario.clients, &scenario.parties, &policy)
        .build(&strict())
        .unwrap();

    // 45 000.00 in cents over 3 parties, ±2%.
    let capital = constraint(&batch, "capital[P2]").unwrap();
    assert_eq!(capital.lower(), Some(1_470_000));
    assert_eq!(capital.upper(), Some(1_530_000));

    // 15 accounts each, ±3%.
    let accounts = constraint(&batch, "accounts[P2]").unwrap();
    assert_eq!(accounts.lower(), Some(14));
    assert_eq!(accounts.upper(), Some(15));
}

#[test]
fn test_zone_constraints_follow_level() {
    let scenario = Scenario::balanced_45();
    let policy = AllocationConfig::default();
    let builder = ConstraintModelBuilder::new(&scenario.clients, &scenario.parties, &policy);

    let zoned = builder.build(&strict()).unwrap();
    let zone = constraint(&zoned, "zone[NORTE][P3]").unwrap();
    // Zone tolerance floors at 10%: 15 ± 1.5.
    assert_eq!((zone.lower(), zone.upper()), (Some(13), Some(16)));

    let flexible = RelaxationLevel::new(0.05, false, "Flexible (5%, no zones)");
    let unzoned = builder.build(&flexible).unwrap();
    assert!(constraint(&unzoned, "zone[NORTE][P3]").is_none());
}

#[test]
fn test_small_zones_are_exempt() {
    let mut scenario = Scenario::balanced_45();
    for c in scenario.clients.iter_mut().take(5) {
        c.zone = "ISLA".to_string();
    }
    let policy = AllocationConfig::default();
    let batch = ConstraintModelBuilder::new(&scenario.clients, &scenario.parties, &policy)
        .build(&strict())
        .unwrap();

    assert!(constraint(&batch, "zone[ISLA][P1]").is_none());
    assert!(constraint(&batch, "zone[NORTE][P1]").is_some());
}

#[test]
fn test_invalid_level_rejected() {
    let scenario = Scenario::balanced_45();
    let policy = AllocationConfig::default();
    let builder = ConstraintModelBuilder::new(&scenario.clients, &scenario.parties, &policy);

    let err = builder.build(&RelaxationLevel::new(1.5, false, "Too wide")).unwrap_err();
    assert!(matches!(err, EquiShareError::InvalidTolerance { .. }));
}

#[test]
fn test_decode() {
    let clients = vec![client("A", 10.0, "", "Z"), client("B", 20.0, "", "Z")];
    let parties = equishare_test::parties(2);
    let policy = AllocationConfig::default();
    let batch = ConstraintModelBuilder::new(&clients, &parties, &policy)
        .build(&RelaxationLevel::new(1.0, false, "Any"))
        .unwrap();

    let mut values = vec![false; batch.model().num_vars()];
    values[batch.var(1, 0).index()] = true;
    values[batch.var(0, 1).index()] = true;
    let assignment = batch.decode(&values, &clients, &parties).unwrap();
    assert_eq!(assignment.party_of("A"), Some("P2"));
    assert_eq!(assignment.party_of("B"), Some("P1"));

    values[batch.var(1, 1).index()] = true;
    assert!(batch.decode(&values, &clients, &parties).is_err());

    let empty = vec![false; batch.model().num_vars()];
    assert!(batch.decode(&empty, &clients, &parties).is_err());
}

#[test]
fn test_helpers() {
    assert_eq!(scaled_capital(10.5, 100), 1050);
    assert_eq!(scaled_capital(0.006, 100), 1);
    assert_eq!(scaled_capital(-3.0, 100), 0);
    assert_eq!(retention_cap(0, 0.2), 0);
    assert_eq!(retention_cap(30, 0.2), 6);
    assert_eq!(band(100.0, 0.15), (85, 114));
}

#[test]
fn test_capital_total_overflow_is_model_error() {
    let clients = vec![
        client("A", 1e17, "", "Z"),
        client("B", 1e17, "", "Z"),
        client("C", 1e17, "", "Z"),
    ];
    let parties = equishare_test::parties(2);
    let policy = AllocationConfig::default();
    let err = ConstraintModelBuilder::new(&clients, &parties, &policy)
        .build(&strict())
        .unwrap_err();

    assert!(matches!(err, EquiShareError::Model(_)));
}
