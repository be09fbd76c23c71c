//! Constraint model of one batch at one relaxation level.
//!
//! One boolean `x[j][i]` per (party, client) with four constraint
//! families: coverage (an exactly-one group per client), the retention
//! cap, global capital/account equity, and per-zone account equity.

use std::collections::BTreeMap;

use equishare_config::AllocationConfig;
use equishare_core::{Assignment, ClientRecord, EquiShareError, PartySet, RelaxationLevel, Result};
use equishare_solver::{BoolVar, LinearConstraint, LinearExpr, Model, ModelError};

/// Slack for float error in `ratio × count` before taking the ceiling.
const CEIL_EPSILON: f64 = 1e-9;

fn model_error(e: ModelError) -> EquiShareError {
    EquiShareError::Model(e.to_string())
}

fn checked_total(values: &[i64], what: &str) -> Result<i64> {
    values
        .iter()
        .try_fold(0i64, |acc, &v| acc.checked_add(v))
        .ok_or_else(|| EquiShareError::Model(format!("{what} total does not fit in i64")))
}

/// Capital in integer units of `1 / scale`, rounded to nearest.
pub fn scaled_capital(capital: f64, scale: u32) -> i64 {
    (capital.max(0.0) * scale as f64).round() as i64
}

/// Maximum prior clients a party may keep.
///
/// ```
/// use equishare::model_builder::retention_cap;
///
/// assert_eq!(retention_cap(10, 0.20), 2);
/// assert_eq!(retention_cap(11, 0.20), 3);
/// assert_eq!(retention_cap(5, 0.20), 1);
/// ```
pub fn retention_cap(prior_clients: usize, ratio: f64) -> i64 {
    (prior_clients as f64 * ratio - CEIL_EPSILON).ceil().max(0.0) as i64
}

/// `[trunc(ideal × (1 − t)), trunc(ideal × (1 + t))]`.
pub fn band(ideal: f64, tolerance: f64) -> (i64, i64) {
    (
        (ideal * (1.0 - tolerance)).trunc() as i64,
        (ideal * (1.0 + tolerance)).trunc() as i64,
    )
}

/// Builds per-level models for one batch.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintModelBuilder<'a> {
    clients: &'a [ClientRecord],
    parties: &'a PartySet,
    policy: &'a AllocationConfig,
}

impl<'a> ConstraintModelBuilder<'a> {
    pub fn new(clients: &'a [ClientRecord], parties: &'a PartySet, policy: &'a AllocationConfig) -> Self {
        Self {
            clients,
            parties,
            policy,
        }
    }

    pub fn clients(&self) -> &'a [ClientRecord] {
        self.clients
    }

    pub fn parties(&self) -> &'a PartySet {
        self.parties
    }

    /// Builds the model for `level`.
    pub fn build(&self, level: &RelaxationLevel) -> Result<BatchModel> {
        level.validate()?;
        let n = self.clients.len();
        let m = self.parties.len();
        let mut model = Model::new();

        let vars: Vec<Vec<BoolVar>> = (0..m)
            .map(|j| (0..n).map(|i| model.new_bool_var(format!("x_{i}_{j}"))).collect())
            .collect();

        for i in 0..n {
            let group: Vec<BoolVar> = vars.iter().map(|row| row[i]).collect();
            model.add_exactly_one(&group).map_err(model_error)?;
        }

        self.add_retention(&mut model, &vars)?;
        self.add_global_equity(&mut model, &vars, level.tolerance)?;
        if level.use_zone_balancing {
            self.add_zone_equity(&mut model, &vars, level.tolerance)?;
        }

        Ok(BatchModel { model, vars })
    }

    fn add_retention(&self, model: &mut Model, vars: &[Vec<BoolVar>]) -> Result<()> {
        for (j, party) in self.parties.iter().enumerate() {
            let prior: Vec<BoolVar> = self
                .clients
                .iter()
                .enumerate()
                .filter(|(_, c)| c.origin_party == party)
                .map(|(i, _)| vars[j][i])
                .collect();
            if prior.is_empty() {
                continue;
            }
            let cap = retention_cap(prior.len(), self.policy.retention_ratio);
            model
                .add_constraint(
                    LinearConstraint::new(format!("retention[{party}]"), LinearExpr::sum(&prior))
                        .at_most(cap),
                )
                .map_err(model_error)?;
        }
        Ok(())
    }

    fn add_global_equity(&self, model: &mut Model, vars: &[Vec<BoolVar>], tolerance: f64) -> Result<()> {
        let m = self.parties.len() as i64;
        let capitals: Vec<i64> = self
            .clients
            .iter()
            .map(|c| scaled_capital(c.capital, self.policy.capital_scale))
            .collect();
        let accounts: Vec<i64> = self.clients.iter().map(|c| c.account_count as i64).collect();

        let ideal_capital = checked_total(&capitals, "capital")? / m;
        let ideal_accounts = checked_total(&accounts, "account")? / m;
        let (cap_lo, cap_hi) = band(ideal_capital as f64, tolerance);
        let (acc_lo, acc_hi) = band(
            ideal_accounts as f64,
            tolerance * self.policy.account_tolerance_factor,
        );

        for (j, party) in self.parties.iter().enumerate() {
            let capital = LinearExpr::weighted_sum(&vars[j], &capitals);
            model
                .add_constraint(
                    LinearConstraint::new(format!("capital[{party}]"), capital).between(cap_lo, cap_hi),
                )
                .map_err(model_error)?;
            let count = LinearExpr::weighted_sum(&vars[j], &accounts);
            model
                .add_constraint(
                    LinearConstraint::new(format!("accounts[{party}]"), count).between(acc_lo, acc_hi),
                )
                .map_err(model_error)?;
        }
        Ok(())
    }

    fn add_zone_equity(&self, model: &mut Model, vars: &[Vec<BoolVar>], tolerance: f64) -> Result<()> {
        let m = self.parties.len();
        let min_clients = m * self.policy.zone_min_clients_factor;
        let zone_tolerance = (2.0 * tolerance).max(self.policy.zone_tolerance_floor);

        let mut zones: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, client) in self.clients.iter().enumerate() {
            zones.entry(client.zone.as_str()).or_default().push(i);
        }

        for (zone, members) in zones.into_iter().filter(|(_, idx)| idx.len() >= min_clients) {
            let weights: Vec<i64> = members
                .iter()
                .map(|&i| self.clients[i].account_count as i64)
                .collect();
            let ideal = weights.iter().sum::<i64>() as f64 / m as f64;
            let (lo, hi) = band(ideal, zone_tolerance);
            for (j, party) in self.parties.iter().enumerate() {
                let zone_vars: Vec<BoolVar> = members.iter().map(|&i| vars[j][i]).collect();
                let expr = LinearExpr::weighted_sum(&zone_vars, &weights);
                model
                    .add_constraint(
                        LinearConstraint::new(format!("zone[{zone}][{party}]"), expr).between(lo, hi),
                    )
                    .map_err(model_error)?;
            }
        }
        Ok(())
    }
}

/// A built model plus the variable layout needed to decode it.
#[derive(Debug)]
pub struct BatchModel {
    model: Model,
    /// `vars[party][client]`.
    vars: Vec<Vec<BoolVar>>,
}

impl BatchModel {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn var(&self, party: usize, client: usize) -> BoolVar {
        self.vars[party][client]
    }

    /// Reads an assignment off a valuation.
    ///
    /// Fails if a client is not given exactly one party.
    pub fn decode(
        &self,
        values: &[bool],
        clients: &[ClientRecord],
        parties: &PartySet,
    ) -> Result<Assignment> {
        let mut assignment = Assignment::new(parties.clone());
        for (i, client) in clients.iter().enumerate() {
            let mut chosen = self
                .vars
                .iter()
                .enumerate()
                .filter(|(_, row)| values.get(row[i].index()).copied().unwrap_or(false))
                .map(|(j, _)| j);
            match (chosen.next(), chosen.next()) {
                (Some(j), None) => assignment.assign(client.client_id.clone(), j)?,
                _ => {
                    return Err(EquiShareError::Model(format!(
                        "valuation does not give client {} exactly one party",
                        client.client_id
                    )))
                }
            }
        }
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests;
