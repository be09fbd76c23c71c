//! Incremental violation scoring.
//!
//! The director keeps the left-hand side of every constraint for the
//! working valuation and re-scores only the constraints a move touches.

use smallvec::SmallVec;

use equishare_core::SimpleScore;

use crate::model::{BoolVar, LinearConstraint, Model};
use crate::moves::SearchMove;

/// Penalty of a violation equal to the constraint's own magnitude.
const PENALTY_UNIT: i128 = 1_000;

/// Upper bound of a single constraint's penalty.
const MAX_PENALTY: i128 = 1 << 40;

/// Normalized penalty; any positive violation costs at least 1.
fn penalty(violation: i64, scale: i64) -> i64 {
    if violation <= 0 {
        return 0;
    }
    let scale = scale.max(1) as i128;
    let p = (violation as i128 * PENALTY_UNIT + scale - 1) / scale;
    p.min(MAX_PENALTY) as i64
}

/// Variable → constraint incidence, shared by every worker of a solve.
pub(crate) struct ConstraintIndex {
    var_terms: Vec<SmallVec<[(usize, i64); 4]>>,
    scales: Vec<i64>,
}

impl ConstraintIndex {
    pub(crate) fn build(model: &Model) -> Self {
        let mut var_terms: Vec<SmallVec<[(usize, i64); 4]>> =
            vec![SmallVec::new(); model.num_vars()];
        for (ci, constraint) in model.constraints().iter().enumerate() {
            for &(var, coef) in constraint.expr().terms() {
                let terms = &mut var_terms[var.index()];
                match terms.iter_mut().find(|(c, _)| *c == ci) {
                    Some((_, existing)) => *existing += coef,
                    None => terms.push((ci, coef)),
                }
            }
        }
        let scales = model.constraints().iter().map(LinearConstraint::scale).collect();
        Self { var_terms, scales }
    }

    /// Sum of normalized coefficient magnitudes of a variable.
    pub(crate) fn weight(&self, var: BoolVar) -> i64 {
        self.var_terms[var.index()]
            .iter()
            .map(|&(c, coef)| penalty(coef.saturating_abs(), self.scales[c]))
            .fold(0i64, i64::saturating_add)
    }
}

pub(crate) struct Director<'a> {
    model: &'a Model,
    index: &'a ConstraintIndex,
    values: Vec<bool>,
    choice: Vec<Option<usize>>,
    lhs: Vec<i64>,
    penalties: Vec<i64>,
    total: i64,
    delta: Vec<i64>,
    touched: Vec<usize>,
    is_touched: Vec<bool>,
}

impl<'a> Director<'a> {
    /// Starts from the all-false valuation with every group unassigned.
    pub(crate) fn new(model: &'a Model, index: &'a ConstraintIndex) -> Self {
        let n_constraints = model.constraints().len();
        let lhs = vec![0i64; n_constraints];
        let penalties: Vec<i64> = model
            .constraints()
            .iter()
            .enumerate()
            .map(|(ci, c)| penalty(c.violation(0), index.scales[ci]))
            .collect();
        let total = penalties.iter().fold(0i64, |acc, &p| acc.saturating_add(p));
        Self {
            model,
            index,
            values: vec![false; model.num_vars()],
            choice: vec![None; model.groups().len()],
            lhs,
            penalties,
            total,
            delta: vec![0; n_constraints],
            touched: Vec::new(),
            is_touched: vec![false; n_constraints],
        }
    }

    pub(crate) fn score(&self) -> SimpleScore {
        SimpleScore::of_violation(self.total)
    }

    pub(crate) fn values(&self) -> &[bool] {
        &self.values
    }

    pub(crate) fn choice(&self) -> &[Option<usize>] {
        &self.choice
    }

    /// Variable flips a move performs, or `None` if it is not doable.
    fn changes(&self, mv: SearchMove) -> Option<SmallVec<[(BoolVar, bool); 4]>> {
        let groups = self.model.groups();
        let mut changes = SmallVec::new();
        match mv {
            SearchMove::Assign { group, to } => {
                let options = groups.get(group)?;
                let target = *options.get(to)?;
                let current = self.choice[group];
                if current == Some(to) {
                    return None;
                }
                if let Some(old) = current {
                    changes.push((options[old], false));
                }
                changes.push((target, true));
            }
            SearchMove::Swap { left, right } => {
                if left == right {
                    return None;
                }
                let a = self.choice.get(left).copied().flatten()?;
                let b = self.choice.get(right).copied().flatten()?;
                if a == b {
                    return None;
                }
                let left_options = &groups[left];
                let right_options = &groups[right];
                let left_target = *left_options.get(b)?;
                let right_target = *right_options.get(a)?;
                changes.push((left_options[a], false));
                changes.push((left_target, true));
                changes.push((right_options[b], false));
                changes.push((right_target, true));
            }
            SearchMove::Flip { var } => {
                if self.model.group_of(var).is_some() {
                    return None;
                }
                changes.push((var, !self.values[var.index()]));
            }
        }
        Some(changes)
    }

    fn accumulate(&mut self, changes: &[(BoolVar, bool)]) {
        for &(var, value) in changes {
            let sign = if value { 1 } else { -1 };
            for &(c, coef) in &self.index.var_terms[var.index()] {
                if !self.is_touched[c] {
                    self.is_touched[c] = true;
                    self.touched.push(c);
                }
                self.delta[c] += sign * coef;
            }
        }
    }

    fn touched_total(&self) -> i64 {
        let constraints = self.model.constraints();
        self.touched.iter().fold(self.total, |total, &c| {
            let new_lhs = self.lhs[c].saturating_add(self.delta[c]);
            let new_penalty = penalty(constraints[c].violation(new_lhs), self.index.scales[c]);
            total.saturating_add(new_penalty - self.penalties[c])
        })
    }

    fn clear_touched(&mut self) {
        for &c in &self.touched {
            self.delta[c] = 0;
            self.is_touched[c] = false;
        }
        self.touched.clear();
    }

    /// Score the working valuation would have after `mv`.
    pub(crate) fn evaluate(&mut self, mv: SearchMove) -> Option<SimpleScore> {
        let changes = self.changes(mv)?;
        self.accumulate(&changes);
        let total = self.touched_total();
        self.clear_touched();
        Some(SimpleScore::of_violation(total))
    }

    /// Applies `mv`, returning false if it was not doable.
    pub(crate) fn apply(&mut self, mv: SearchMove) -> bool {
        let Some(changes) = self.changes(mv) else {
            return false;
        };
        self.accumulate(&changes);
        self.total = self.touched_total();
        let constraints = self.model.constraints();
        for &c in &self.touched {
            self.lhs[c] = self.lhs[c].saturating_add(self.delta[c]);
            self.penalties[c] = penalty(constraints[c].violation(self.lhs[c]), self.index.scales[c]);
        }
        self.clear_touched();

        for &(var, value) in &changes {
            self.values[var.index()] = value;
        }
        match mv {
            SearchMove::Assign { group, to } => self.choice[group] = Some(to),
            SearchMove::Swap { left, right } => self.choice.swap(left, right),
            SearchMove::Flip { .. } => {}
        }
        true
    }

    /// Recomputes the total violation from scratch.
    #[cfg(test)]
    pub(crate) fn recompute_total(&self) -> i64 {
        self.model
            .constraints()
            .iter()
            .enumerate()
            .map(|(ci, c)| {
                let lhs = c.expr().evaluate(&self.values);
                penalty(c.violation(lhs), self.index.scales[ci])
            })
            .sum()
    }
}
