//! Acceptors for local search move acceptance.
//!
//! An acceptor decides whether a move is taken by comparing the score it
//! leads to with the score of the last step.

mod late_acceptance;

use std::fmt::Debug;

use equishare_core::Score;

pub use late_acceptance::LateAcceptanceAcceptor;

/// Trait for accepting or rejecting moves in local search.
pub trait Acceptor<Sc: Score>: Send + Debug {
    /// Returns true if a move resulting in `move_score` should be accepted,
    /// given the previous step's score.
    fn is_accepted(&self, last_step_score: &Sc, move_score: &Sc) -> bool;

    /// Called when the search starts.
    fn phase_started(&mut self, _initial_score: &Sc) {}

    /// Called when a step ends with an accepted move.
    fn step_ended(&mut self, _step_score: &Sc) {}
}

#[cfg(test)]
mod tests;
