//! Bound presolve.
//!
//! Each exactly-one group contributes exactly one of its option
//! coefficients to a constraint, and each free variable contributes its
//! coefficient or nothing. That gives every constraint a reachable
//! interval; a constraint whose bounds miss that interval can never hold.

use std::collections::{BTreeMap, HashMap};

use crate::model::{BoolVar, LinearConstraint, Model};

/// Reachable `[min, max]` of a constraint's left-hand side.
pub(crate) fn reachable_range(model: &Model, constraint: &LinearConstraint) -> (i64, i64) {
    let mut coefs: HashMap<BoolVar, i64> = HashMap::new();
    for &(var, coef) in constraint.expr().terms() {
        *coefs.entry(var).or_insert(0) += coef;
    }

    let mut min = 0i64;
    let mut max = 0i64;
    let mut touched_groups: BTreeMap<usize, ()> = BTreeMap::new();

    for (&var, &coef) in &coefs {
        match model.group_of(var) {
            Some(group) => {
                touched_groups.insert(group, ());
            }
            None => {
                min = min.saturating_add(coef.min(0));
                max = max.saturating_add(coef.max(0));
            }
        }
    }

    for &group in touched_groups.keys() {
        let options = model.groups()[group]
            .iter()
            .map(|var| coefs.get(var).copied().unwrap_or(0));
        let (lo, hi) = options.fold((i64::MAX, i64::MIN), |(lo, hi), c| (lo.min(c), hi.max(c)));
        min = min.saturating_add(lo);
        max = max.saturating_add(hi);
    }

    (min, max)
}

/// Returns the first constraint that no valuation can satisfy.
pub(crate) fn find_infeasible(model: &Model) -> Option<&LinearConstraint> {
    model.constraints().iter().find(|c| {
        let (min, max) = reachable_range(model, c);
        let below = c.upper().is_some_and(|hi| min > hi);
        let above = c.lower().is_some_and(|lo| max < lo);
        let crossed = matches!((c.lower(), c.upper()), (Some(lo), Some(hi)) if lo > hi);
        below || above || crossed
    })
}
