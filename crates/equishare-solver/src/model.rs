//! Boolean linear model.
//!
//! A [`Model`] holds boolean decision variables, exactly-one groups over
//! those variables, and named linear constraints `lo <= Σ coef·var <= hi`.
//!
//! # Examples
//!
//! ```
//! use equishare_solver::{LinearConstraint, LinearExpr, Model};
//!
//! let mut model = Model::new();
//! let a = model.new_bool_var("a");
//! let b = model.new_bool_var("b");
//! model.add_exactly_one(&[a, b]).unwrap();
//! model
//!     .add_constraint(LinearConstraint::new("cap", LinearExpr::weighted_sum(&[a, b], &[3, 5])).at_most(4))
//!     .unwrap();
//!
//! assert!(model.is_satisfied_by(&[true, false]));
//! assert!(!model.is_satisfied_by(&[false, true]));
//! ```

use std::fmt;

use thiserror::Error;

/// Errors raised while building a model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Variable index {0} does not belong to this model")]
    UnknownVariable(usize),

    #[error("Exactly-one group must contain at least one variable")]
    EmptyGroup,

    #[error("Variable '{0}' already belongs to an exactly-one group")]
    OverlappingGroups(String),

    #[error("Constraint '{name}': {len} variables but {weights} weights")]
    WeightMismatch {
        name: String,
        len: usize,
        weights: usize,
    },
}

/// Handle to a boolean decision variable of a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(usize);

impl BoolVar {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A weighted sum of boolean variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(BoolVar, i64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables with unit weights.
    pub fn sum(vars: &[BoolVar]) -> Self {
        Self {
            terms: vars.iter().map(|&v| (v, 1)).collect(),
        }
    }

    /// Weighted sum; `vars` and `weights` are zipped, so the shorter
    /// slice bounds the expression. Use [`LinearExpr::try_weighted_sum`]
    /// to reject mismatched lengths.
    pub fn weighted_sum(vars: &[BoolVar], weights: &[i64]) -> Self {
        Self {
            terms: vars.iter().copied().zip(weights.iter().copied()).collect(),
        }
    }

    pub fn try_weighted_sum(
        name: &str,
        vars: &[BoolVar],
        weights: &[i64],
    ) -> Result<Self, ModelError> {
        if vars.len() != weights.len() {
            return Err(ModelError::WeightMismatch {
                name: name.to_string(),
                len: vars.len(),
                weights: weights.len(),
            });
        }
        Ok(Self::weighted_sum(vars, weights))
    }

    pub fn add_term(&mut self, var: BoolVar, coef: i64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    pub fn terms(&self) -> &[(BoolVar, i64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression under a full valuation.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(v, _)| values.get(v.0).copied().unwrap_or(false))
            .map(|&(_, coef)| coef)
            .sum()
    }
}

/// A named linear constraint `lower <= expr <= upper`.
///
/// A missing bound leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    name: String,
    expr: LinearExpr,
    lower: Option<i64>,
    upper: Option<i64>,
}

impl LinearConstraint {
    pub fn new(name: impl Into<String>, expr: LinearExpr) -> Self {
        Self {
            name: name.into(),
            expr,
            lower: None,
            upper: None,
        }
    }

    pub fn at_least(mut self, lower: i64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn at_most(mut self, upper: i64) -> Self {
        self.upper = Some(upper);
        self
    }

    pub fn between(self, lower: i64, upper: i64) -> Self {
        self.at_least(lower).at_most(upper)
    }

    pub fn equal_to(self, value: i64) -> Self {
        self.between(value, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn lower(&self) -> Option<i64> {
        self.lower
    }

    pub fn upper(&self) -> Option<i64> {
        self.upper
    }

    /// Distance of `lhs` outside the bounds, zero when satisfied.
    pub fn violation(&self, lhs: i64) -> i64 {
        if let Some(lo) = self.lower {
            if lhs < lo {
                return lo.saturating_sub(lhs);
            }
        }
        if let Some(hi) = self.upper {
            if lhs > hi {
                return lhs.saturating_sub(hi);
            }
        }
        0
    }

    /// Magnitude used to normalize violations of this constraint.
    pub(crate) fn scale(&self) -> i64 {
        let lo = self.lower.map(i64::unsigned_abs).unwrap_or(0);
        let hi = self.upper.map(i64::unsigned_abs).unwrap_or(0);
        lo.max(hi).clamp(1, i64::MAX as u64) as i64
    }
}

/// Boolean variables, exactly-one groups and linear constraints.
#[derive(Clone, Default)]
pub struct Model {
    var_names: Vec<String>,
    group_of: Vec<Option<usize>>,
    groups: Vec<Vec<BoolVar>>,
    constraints: Vec<LinearConstraint>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.var_names.push(name.into());
        self.group_of.push(None);
        BoolVar(self.var_names.len() - 1)
    }

    /// Requires exactly one of `vars` to be true.
    ///
    /// Groups define the search neighbourhood, so a variable may join at
    /// most one group.
    pub fn add_exactly_one(&mut self, vars: &[BoolVar]) -> Result<usize, ModelError> {
        if vars.is_empty() {
            return Err(ModelError::EmptyGroup);
        }
        for &var in vars {
            self.check_var(var)?;
            if self.group_of[var.0].is_some() {
                return Err(ModelError::OverlappingGroups(self.var_names[var.0].clone()));
            }
        }
        let group = self.groups.len();
        for &var in vars {
            self.group_of[var.0] = Some(group);
        }
        self.groups.push(vars.to_vec());
        Ok(group)
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) -> Result<usize, ModelError> {
        for &(var, _) in constraint.expr.terms() {
            self.check_var(var)?;
        }
        self.constraints.push(constraint);
        Ok(self.constraints.len() - 1)
    }

    fn check_var(&self, var: BoolVar) -> Result<(), ModelError> {
        if var.0 < self.var_names.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownVariable(var.0))
        }
    }

    pub fn num_vars(&self) -> usize {
        self.var_names.len()
    }

    pub fn var_name(&self, var: BoolVar) -> &str {
        &self.var_names[var.0]
    }

    pub fn groups(&self) -> &[Vec<BoolVar>] {
        &self.groups
    }

    pub fn group_of(&self, var: BoolVar) -> Option<usize> {
        self.group_of.get(var.0).copied().flatten()
    }

    /// Variables outside every exactly-one group.
    pub fn free_vars(&self) -> impl Iterator<Item = BoolVar> + '_ {
        self.group_of
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_none())
            .map(|(i, _)| BoolVar(i))
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Checks a full valuation against every group and constraint.
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        if values.len() != self.num_vars() {
            return false;
        }
        let groups_ok = self
            .groups
            .iter()
            .all(|g| g.iter().filter(|v| values[v.0]).count() == 1);
        groups_ok
            && self
                .constraints
                .iter()
                .all(|c| c.violation(c.expr.evaluate(values)) == 0)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("vars", &self.var_names.len())
            .field("groups", &self.groups.len())
            .field("constraints", &self.constraints.len())
            .finish()
    }
}
