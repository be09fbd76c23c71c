//! Score-based termination.

use equishare_core::Score;

use super::Termination;
use crate::scope::SearchScope;

/// Terminates once the best score is feasible.
#[derive(Debug, Clone, Default)]
pub struct BestScoreFeasibleTermination;

impl BestScoreFeasibleTermination {
    pub fn new() -> Self {
        Self
    }
}

impl Termination for BestScoreFeasibleTermination {
    fn is_terminated(&self, scope: &SearchScope) -> bool {
        scope.best_score().is_some_and(|s| s.is_feasible())
    }
}
