//! Tests for EquiShare configuration.

use std::io::Write;

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        parties = ["A", "B"]
        random_seed = 7
        batch_mode = "per_cohort"

        [allocation]
        small_batch_factor = 5
        retention_ratio = 0.25

        [solver]
        time_limit_millis = 1500
        worker_count = 2

        [advisors]
        names = ["ANA", "LUIS"]
        segment = "cd+"
    "#;

    let config = EquiShareConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.parties, vec!["A", "B"]);
    assert_eq!(config.random_seed, Some(7));
    assert_eq!(config.batch_mode, BatchMode::PerCohort);
    assert_eq!(config.allocation.small_batch_factor, 5);
    assert_eq!(config.allocation.retention_ratio, 0.25);
    // Untouched allocation fields keep their defaults.
    assert_eq!(config.allocation.capital_scale, 100);
    assert_eq!(config.allocation.ladder.len(), 4);
    assert_eq!(config.solver.time_limit(), Duration::from_millis(1500));
    assert_eq!(config.advisors.names, vec!["ANA", "LUIS"]);
    assert_eq!(config.advisors.tiers.len(), 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        parties: [X, Y, Z]
        batch_mode: unified
        solver:
          time_limit_seconds: 2
          step_limit: 1000
        allocation:
          ladder:
            - tolerance: 0.1
              use_zone_balancing: true
              label: Only level
    "#;

    let config = EquiShareConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.parties.len(), 3);
    assert_eq!(config.solver.step_limit, Some(1000));
    assert_eq!(config.solver.time_limit(), Duration::from_secs(2));
    assert_eq!(config.allocation.ladder[0].label, "Only level");
}

#[test]
fn test_defaults() {
    let config = EquiShareConfig::default();
    assert_eq!(config.parties, vec!["ESCALL", "FINANCOBRO", "JYC"]);
    assert_eq!(config.batch_mode, BatchMode::Unified);
    assert_eq!(config.allocation.account_tolerance_factor, 1.5);
    assert_eq!(config.allocation.zone_tolerance_floor, 0.10);
    assert_eq!(config.allocation.zone_min_clients_factor, 2);
    assert_eq!(config.solver.time_limit(), Duration::from_secs(45));
    assert_eq!(config.solver.worker_count, 8);
    assert_eq!(config.advisors.names.len(), 11);
    assert_eq!(config.advisors.shuffle_seed, 42);
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder() {
    let config = EquiShareConfig::new()
        .with_parties(["P1", "P2"])
        .with_random_seed(123)
        .with_batch_mode(BatchMode::PerCohort)
        .with_time_limit(Duration::from_millis(250))
        .with_worker_count(2)
        .with_ladder(vec![RelaxationLevel::new(0.5, false, "Half")]);

    assert_eq!(config.random_seed, Some(123));
    assert_eq!(config.solver.time_limit(), Duration::from_millis(250));
    assert_eq!(config.party_set().unwrap().len(), 2);
    assert_eq!(config.allocation.ladder.len(), 1);
}

#[test]
fn test_validate_rejects_bad_values() {
    let duplicate = EquiShareConfig::new().with_parties(["A", "A"]);
    assert!(matches!(duplicate.validate(), Err(ConfigError::Invalid(_))));

    let empty = EquiShareConfig::new().with_parties(Vec::<String>::new());
    assert!(empty.validate().is_err());

    let bad_level = EquiShareConfig::new().with_ladder(vec![RelaxationLevel::new(0.0, true, "Zero")]);
    assert!(bad_level.validate().is_err());

    let no_ladder = EquiShareConfig::new().with_ladder(Vec::new());
    assert!(no_ladder.validate().is_err());

    let no_workers = EquiShareConfig::new().with_worker_count(0);
    assert!(no_workers.validate().is_err());

    let mut no_tiers = EquiShareConfig::new();
    no_tiers.advisors.tiers.clear();
    assert!(no_tiers.validate().is_err());

    let mut dup_advisor = EquiShareConfig::new();
    dup_advisor.advisors.names = vec!["ANA".into(), "ANA".into()];
    assert!(dup_advisor.validate().is_err());
}

#[test]
fn test_tier_bounds() {
    let tiers = AdvisorConfig::default().tiers;
    let (top, mid) = (&tiers[0], &tiers[1]);

    assert!(top.contains(10_000.01));
    assert!(!top.contains(10_000.0));
    assert!(mid.contains(10_000.0));
    assert!(mid.contains(1_000.0));
    assert!(!mid.contains(999.99));
}

#[test]
fn test_load_by_extension() {
    let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(yaml, "parties: [ONE]").unwrap();
    let config = EquiShareConfig::load(yaml.path()).unwrap();
    assert_eq!(config.parties, vec!["ONE"]);

    let mut toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(toml, "parties = [\"TWO\"]").unwrap();
    let config = EquiShareConfig::load(toml.path()).unwrap();
    assert_eq!(config.parties, vec!["TWO"]);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(EquiShareConfig::load(&path), Err(ConfigError::Io(_))));
    assert_eq!(EquiShareConfig::load_or_default(&path).unwrap(), EquiShareConfig::default());
}
