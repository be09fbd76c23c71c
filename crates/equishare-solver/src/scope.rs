//! Per-worker search scope.

use std::time::{Duration, Instant};

use equishare_core::SimpleScore;

/// Progress of one search worker, inspected by terminations.
#[derive(Debug, Clone)]
pub struct SearchScope {
    worker_index: usize,
    start_time: Instant,
    step_count: u64,
    best_score: Option<SimpleScore>,
}

impl SearchScope {
    pub fn new(worker_index: usize) -> Self {
        Self {
            worker_index,
            start_time: Instant::now(),
            step_count: 0,
            best_score: None,
        }
    }

    pub fn worker_index(&self) -> usize {
        self.worker_index
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.step_count += 1;
        self.step_count
    }

    pub fn best_score(&self) -> Option<SimpleScore> {
        self.best_score
    }

    /// Records `score` if it improves on the best so far.
    ///
    /// Returns true when the best score changed.
    pub fn offer_best_score(&mut self, score: SimpleScore) -> bool {
        match self.best_score {
            Some(best) if best >= score => false,
            _ => {
                self.best_score = Some(score);
                true
            }
        }
    }
}
