//! Tests for acceptors.

use equishare_core::SimpleScore;

use super::*;

#[test]
fn test_late_acceptance_as_trait_object() {
    let mut acceptor: Box<dyn Acceptor<SimpleScore>> = Box::new(LateAcceptanceAcceptor::<SimpleScore>::new(4));
    acceptor.phase_started(&SimpleScore::of(-10));
    assert!(acceptor.is_accepted(&SimpleScore::of(-10), &SimpleScore::of(-5)));
}

#[test]
fn test_late_acceptance_history() {
    let mut acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(3);
    acceptor.phase_started(&SimpleScore::of(-10));

    // Worse than the last step but equal to the late score.
    assert!(acceptor.is_accepted(&SimpleScore::of(-8), &SimpleScore::of(-10)));
    assert!(!acceptor.is_accepted(&SimpleScore::of(-8), &SimpleScore::of(-11)));
}

#[test]
fn test_late_acceptance_buffer_rotates() {
    let mut acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(2);
    acceptor.phase_started(&SimpleScore::of(-10));

    acceptor.step_ended(&SimpleScore::of(-4));
    acceptor.step_ended(&SimpleScore::of(-3));

    // Late score is now the one recorded two steps ago.
    assert!(acceptor.is_accepted(&SimpleScore::of(-3), &SimpleScore::of(-4)));
    assert!(!acceptor.is_accepted(&SimpleScore::of(-3), &SimpleScore::of(-5)));
}

#[test]
fn test_late_acceptance_zero_size() {
    let mut acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(0);
    acceptor.phase_started(&SimpleScore::of(-1));
    acceptor.step_ended(&SimpleScore::of(-1));
    assert!(acceptor.is_accepted(&SimpleScore::of(-1), &SimpleScore::of(-1)));
}
