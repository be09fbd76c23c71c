//! Solver statistics collection.
//!
//! Workers share one [`StatisticsCollector`]; counters are atomic so the
//! collector needs no locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Statistics for one solve call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Wall-clock time of the call.
    pub duration: Duration,
    /// Steps taken across all workers.
    pub step_count: u64,
    /// Moves evaluated across all workers.
    pub moves_evaluated: u64,
    /// Moves accepted across all workers.
    pub moves_accepted: u64,
    /// Workers that ran.
    pub worker_count: usize,
}

impl SolverStatistics {
    /// Returns the acceptance rate (accepted / evaluated).
    pub fn acceptance_rate(&self) -> f64 {
        if self.moves_evaluated == 0 {
            0.0
        } else {
            self.moves_accepted as f64 / self.moves_evaluated as f64
        }
    }

    /// Move evaluations per second.
    pub fn moves_per_sec(&self) -> u64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            (self.moves_evaluated as f64 / secs) as u64
        } else {
            0
        }
    }
}

/// Thread-safe collector for solver statistics.
pub struct StatisticsCollector {
    start_time: Instant,
    moves_evaluated: AtomicU64,
    moves_accepted: AtomicU64,
    step_count: AtomicU64,
    workers: AtomicU64,
}

impl StatisticsCollector {
    /// Creates a collector; the start time is recorded now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            moves_evaluated: AtomicU64::new(0),
            moves_accepted: AtomicU64::new(0),
            step_count: AtomicU64::new(0),
            workers: AtomicU64::new(0),
        }
    }

    pub fn record_move(&self, accepted: bool) {
        self.moves_evaluated.fetch_add(1, Ordering::Relaxed);
        if accepted {
            self.moves_accepted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_step(&self) {
        self.step_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_worker(&self) {
        self.workers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Takes a snapshot of the current counters.
    pub fn snapshot(&self) -> SolverStatistics {
        SolverStatistics {
            duration: self.elapsed(),
            step_count: self.step_count.load(Ordering::Relaxed),
            moves_evaluated: self.moves_evaluated.load(Ordering::Relaxed),
            moves_accepted: self.moves_accepted.load(Ordering::Relaxed),
            worker_count: self.workers.load(Ordering::Relaxed) as usize,
        }
    }
}

impl Default for StatisticsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_thread_safety() {
        let collector = StatisticsCollector::new();

        rayon::scope(|s| {
            for _ in 0..4 {
                s.spawn(|_| {
                    collector.record_worker();
                    for i in 0..1000 {
                        collector.record_move(i % 2 == 0);
                        collector.record_step();
                    }
                });
            }
        });

        let stats = collector.snapshot();
        assert_eq!(stats.moves_evaluated, 4000);
        assert_eq!(stats.moves_accepted, 2000);
        assert_eq!(stats.step_count, 4000);
        assert_eq!(stats.worker_count, 4);
        assert!((stats.acceptance_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = SolverStatistics::default();
        assert_eq!(stats.acceptance_rate(), 0.0);
        assert_eq!(stats.moves_per_sec(), 0);
    }
}
