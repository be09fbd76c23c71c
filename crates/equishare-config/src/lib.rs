//! Configuration system for EquiShare.
//!
//! Load the party list, allocation policy, solver budget and advisor
//! quotas from TOML or YAML files instead of editing constants.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use equishare_config::{BatchMode, EquiShareConfig};
//! use std::time::Duration;
//!
//! let config = EquiShareConfig::from_toml_str(r#"
//!     parties = ["ESCALL", "FINANCOBRO", "JYC"]
//!     batch_mode = "per_cohort"
//!
//!     [solver]
//!     time_limit_seconds = 30
//!     worker_count = 4
//!
//!     [[allocation.ladder]]
//!     tolerance = 0.05
//!     use_zone_balancing = false
//!     label = "Loose (5%)"
//! "#).unwrap();
//!
//! assert_eq!(config.batch_mode, BatchMode::PerCohort);
//! assert_eq!(config.solver.time_limit(), Duration::from_secs(30));
//! assert_eq!(config.allocation.ladder.len(), 1);
//! assert!(config.validate().is_ok());
//! ```
//!
//! Use defaults when the file is missing:
//!
//! ```
//! use equishare_config::EquiShareConfig;
//!
//! let config = EquiShareConfig::load_or_default("equishare.toml").unwrap();
//! assert_eq!(config.parties.len(), 3);
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use equishare_core::{PartySet, RelaxationLevel};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level EquiShare configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EquiShareConfig {
    /// Receiving parties of the external reassignment, in order.
    #[serde(default = "default_parties")]
    pub parties: Vec<String>,

    /// Seed for solver workers and orphan patching.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// How records are split into independent batches.
    #[serde(default)]
    pub batch_mode: BatchMode,

    /// Allocation policy.
    #[serde(default)]
    pub allocation: AllocationConfig,

    /// Solver budget.
    #[serde(default)]
    pub solver: SolverConfig,

    /// Internal advisor rotation.
    #[serde(default)]
    pub advisors: AdvisorConfig,
}

fn default_parties() -> Vec<String> {
    ["ESCALL", "FINANCOBRO", "JYC"].map(String::from).to_vec()
}

impl Default for EquiShareConfig {
    fn default() -> Self {
        Self {
            parties: default_parties(),
            random_seed: None,
            batch_mode: BatchMode::default(),
            allocation: AllocationConfig::default(),
            solver: SolverConfig::default(),
            advisors: AdvisorConfig::default(),
        }
    }
}

impl EquiShareConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, choosing YAML for `.yaml`/`.yml`
    /// extensions and TOML otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Like [`EquiShareConfig::load`], but a missing file yields defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the receiving parties.
    pub fn with_parties<I, S>(mut self, parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parties = parties.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_batch_mode(mut self, batch_mode: BatchMode) -> Self {
        self.batch_mode = batch_mode;
        self
    }

    /// Replaces the relaxation ladder.
    pub fn with_ladder(mut self, ladder: Vec<RelaxationLevel>) -> Self {
        self.allocation.ladder = ladder;
        self
    }

    /// Sets the solver wall-clock budget per cascade level.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.solver.time_limit_seconds = None;
        self.solver.time_limit_millis = Some(limit.as_millis() as u64);
        self
    }

    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.solver.worker_count = workers;
        self
    }

    /// Returns the validated party set.
    pub fn party_set(&self) -> Result<PartySet, ConfigError> {
        PartySet::new(self.parties.iter().cloned()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Checks every section for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.party_set()?;
        self.allocation.validate()?;
        self.solver.validate()?;
        self.advisors.validate()
    }
}

/// Batch splitting mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Every non-locked record forms one batch.
    #[default]
    Unified,

    /// One batch per cohort, processed sequentially.
    PerCohort,
}

/// Allocation policy of the external reassignment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AllocationConfig {
    /// Batches with fewer than `parties × small_batch_factor` clients skip
    /// optimization.
    pub small_batch_factor: usize,

    /// Share of its previous clients a party may keep.
    pub retention_ratio: f64,

    /// Account band width relative to the capital tolerance.
    pub account_tolerance_factor: f64,

    /// Smallest zone tolerance.
    pub zone_tolerance_floor: f64,

    /// Zones need at least `parties × zone_min_clients_factor` clients to be
    /// balanced.
    pub zone_min_clients_factor: usize,

    /// Integer units per currency unit handed to the solver.
    pub capital_scale: u32,

    /// Relaxation levels, strictest first.
    pub ladder: Vec<RelaxationLevel>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            small_batch_factor: 10,
            retention_ratio: 0.20,
            account_tolerance_factor: 1.5,
            zone_tolerance_floor: 0.10,
            zone_min_clients_factor: 2,
            capital_scale: 100,
            ladder: RelaxationLevel::standard_ladder(),
        }
    }
}

impl AllocationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ladder.is_empty() {
            return Err(ConfigError::Invalid("relaxation ladder is empty".into()));
        }
        for level in &self.ladder {
            level.validate().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if !(0.0..=1.0).contains(&self.retention_ratio) {
            return Err(ConfigError::Invalid(format!(
                "retention_ratio {} outside [0, 1]",
                self.retention_ratio
            )));
        }
        if !(self.account_tolerance_factor > 0.0) {
            return Err(ConfigError::Invalid(
                "account_tolerance_factor must be positive".into(),
            ));
        }
        if !(self.zone_tolerance_floor >= 0.0) {
            return Err(ConfigError::Invalid(
                "zone_tolerance_floor must not be negative".into(),
            ));
        }
        if self.capital_scale == 0 {
            return Err(ConfigError::Invalid("capital_scale must be at least 1".into()));
        }
        Ok(())
    }
}

/// Solver budget per cascade level.
///
/// Every level of the ladder gets the full budget, so a batch that only
/// solves at the last of the four standard levels can take four times
/// `time_limit()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    /// Seconds per solve.
    pub time_limit_seconds: Option<u64>,

    /// Milliseconds per solve, added to `time_limit_seconds`.
    pub time_limit_millis: Option<u64>,

    /// Parallel search workers.
    pub worker_count: usize,

    /// Size of the late acceptance history.
    pub late_acceptance_size: usize,

    /// Accepted moves collected per step.
    pub accepted_count_limit: usize,

    /// Maximum steps per worker.
    pub step_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: None,
            time_limit_millis: None,
            worker_count: 8,
            late_acceptance_size: 400,
            accepted_count_limit: 4,
            step_limit: None,
        }
    }
}

impl SolverConfig {
    /// Default budget when no limit is configured.
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(45);

    /// Returns the configured time limit, or 45 seconds.
    pub fn time_limit(&self) -> Duration {
        let millis = self.time_limit_seconds.unwrap_or(0).saturating_mul(1000)
            + self.time_limit_millis.unwrap_or(0);
        if millis > 0 {
            Duration::from_millis(millis)
        } else {
            Self::DEFAULT_TIME_LIMIT
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid("worker_count must be at least 1".into()));
        }
        Ok(())
    }
}

/// Internal advisor rotation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AdvisorConfig {
    /// Advisors in rotation order.
    pub names: Vec<String>,

    /// Portfolio segment the rotation applies to.
    pub segment: String,

    /// Seed of the pool shuffle.
    pub shuffle_seed: u64,

    /// Capital tiers, each rotated separately.
    pub tiers: Vec<CapitalTier>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            names: (1..=11).map(|i| format!("ASESOR_{i}")).collect(),
            segment: "CD+".to_string(),
            shuffle_seed: 42,
            tiers: vec![
                CapitalTier {
                    label: "TOP >10k".to_string(),
                    min_capital: 10_000.0,
                    min_inclusive: false,
                    max_capital: None,
                    quota: 10,
                },
                CapitalTier {
                    label: "MID 1k-10k".to_string(),
                    min_capital: 1_000.0,
                    min_inclusive: true,
                    max_capital: Some(10_000.0),
                    quota: 10,
                },
            ],
        }
    }
}

impl AdvisorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.names.is_empty() {
            return Err(ConfigError::Invalid("advisor list is empty".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ConfigError::Invalid(format!("duplicate advisor: {dup}")));
        }
        if self.tiers.is_empty() {
            return Err(ConfigError::Invalid("advisor tiers are empty".into()));
        }
        Ok(())
    }
}

/// A capital band with its per-advisor quota.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CapitalTier {
    pub label: String,

    /// Lower capital bound.
    pub min_capital: f64,

    /// Whether `min_capital` itself belongs to the tier.
    #[serde(default)]
    pub min_inclusive: bool,

    /// Inclusive upper capital bound, open when absent.
    #[serde(default)]
    pub max_capital: Option<f64>,

    /// Clients one advisor may receive from this tier per cohort.
    pub quota: usize,
}

impl CapitalTier {
    /// Returns true if `capital` falls in this tier.
    pub fn contains(&self, capital: f64) -> bool {
        let above = if self.min_inclusive {
            capital >= self.min_capital
        } else {
            capital > self.min_capital
        };
        above && self.max_capital.map_or(true, |max| capital <= max)
    }
}

#[cfg(test)]
mod tests;
