//! Late acceptance acceptor.

use std::fmt::Debug;

use equishare_core::Score;

use super::Acceptor;

/// Late acceptance acceptor - accepts moves that improve on a historical score.
///
/// Maintains a circular buffer of recent step scores and accepts moves
/// that are at least as good as the score from N steps ago.
///
/// # Example
///
/// ```
/// use equishare_core::SimpleScore;
/// use equishare_solver::{Acceptor, LateAcceptanceAcceptor};
///
/// let mut acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(400);
/// acceptor.phase_started(&SimpleScore::of(-10));
/// assert!(acceptor.is_accepted(&SimpleScore::of(-10), &SimpleScore::of(-10)));
/// ```
#[derive(Clone)]
pub struct LateAcceptanceAcceptor<Sc> {
    late_acceptance_size: usize,
    score_history: Vec<Option<Sc>>,
    current_index: usize,
}

impl<Sc> Debug for LateAcceptanceAcceptor<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LateAcceptanceAcceptor")
            .field("late_acceptance_size", &self.late_acceptance_size)
            .field("current_index", &self.current_index)
            .finish()
    }
}

impl<Sc: Score> LateAcceptanceAcceptor<Sc> {
    /// Creates a new late acceptance acceptor.
    ///
    /// A size of zero is treated as one.
    pub fn new(late_acceptance_size: usize) -> Self {
        let late_acceptance_size = late_acceptance_size.max(1);
        Self {
            late_acceptance_size,
            score_history: vec![None; late_acceptance_size],
            current_index: 0,
        }
    }
}

impl<Sc: Score> Default for LateAcceptanceAcceptor<Sc> {
    fn default() -> Self {
        Self::new(400)
    }
}

impl<Sc: Score> Acceptor<Sc> for LateAcceptanceAcceptor<Sc> {
    fn is_accepted(&self, last_step_score: &Sc, move_score: &Sc) -> bool {
        if move_score >= last_step_score {
            return true;
        }
        match &self.score_history[self.current_index] {
            Some(late_score) => move_score >= late_score,
            None => true,
        }
    }

    fn phase_started(&mut self, initial_score: &Sc) {
        for slot in &mut self.score_history {
            *slot = Some(*initial_score);
        }
        self.current_index = 0;
    }

    fn step_ended(&mut self, step_score: &Sc) {
        self.score_history[self.current_index] = Some(*step_score);
        self.current_index = (self.current_index + 1) % self.late_acceptance_size;
    }
}
