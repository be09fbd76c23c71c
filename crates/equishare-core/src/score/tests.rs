//! Tests for score types.

use super::*;

#[test]
fn test_simple_score_ordering() {
    let worse = SimpleScore::of_violation(10);
    let better = SimpleScore::of_violation(2);

    assert!(better > worse);
    assert!(better.is_better_than(&worse));
}

#[test]
fn test_simple_score_feasibility() {
    assert!(SimpleScore::zero().is_feasible());
    assert!(!SimpleScore::of_violation(1).is_feasible());
    assert_eq!(SimpleScore::of_violation(7).violation(), 7);
}

#[test]
fn test_simple_score_arithmetic() {
    let a = SimpleScore::of(-5);
    let b = SimpleScore::of(-3);

    assert_eq!(a + b, SimpleScore::of(-8));
    assert_eq!(a - b, SimpleScore::of(-2));
    assert_eq!(-a, SimpleScore::of(5));
    assert_eq!(SimpleScore::of(i64::MIN) + SimpleScore::of(-1), SimpleScore::of(i64::MIN));
}

#[test]
fn test_simple_score_display() {
    assert_eq!(format!("{}", SimpleScore::of(-42)), "-42");
    assert_eq!(format!("{:?}", SimpleScore::of(0)), "SimpleScore(0)");
}
