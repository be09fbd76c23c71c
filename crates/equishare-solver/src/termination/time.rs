//! Time-based termination.

use std::time::{Duration, Instant};

use super::Termination;
use crate::scope::SearchScope;

/// Terminates after a time limit.
///
/// With [`TimeTermination::until`] every worker sharing the deadline stops
/// at the same instant, however late it was scheduled.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use equishare_solver::termination::TimeTermination;
///
/// let term = TimeTermination::seconds(30);
/// let term = TimeTermination::millis(500);
/// let term = TimeTermination::until(Instant::now() + Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
    deadline: Option<Instant>,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            deadline: None,
        }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Terminates at an absolute instant.
    pub fn until(deadline: Instant) -> Self {
        Self {
            limit: Duration::ZERO,
            deadline: Some(deadline),
        }
    }
}

impl Termination for TimeTermination {
    fn is_terminated(&self, scope: &SearchScope) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => scope.elapsed() >= self.limit,
        }
    }
}
