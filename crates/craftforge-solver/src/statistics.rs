//! Solver statistics collection and reporting.
//!
//! Counters are atomics so workers on the pool can record without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of a run's counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverStatistics {
    /// Time since the collector was created.
    pub duration: Duration,
    /// Single-step simulations performed.
    pub states_simulated: u64,
    /// Search nodes expanded (layers, frontier entries, generations).
    pub nodes_expanded: u64,
    /// Complete candidates scored against the best record.
    pub candidates_scored: u64,
    /// Times the best record improved.
    pub improvements: u64,
}

impl SolverStatistics {
    /// Simulations per second over the whole run.
    pub fn states_per_second(&self) -> u64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            (self.states_simulated as f64 / secs) as u64
        } else {
            0
        }
    }
}

/// Thread-safe collector for solver statistics.
#[derive(Debug)]
pub struct StatisticsCollector {
    start_time: Instant,
    states_simulated: AtomicU64,
    nodes_expanded: AtomicU64,
    candidates_scored: AtomicU64,
    improvements: AtomicU64,
}

impl StatisticsCollector {
    /// Creates a collector; the start time is recorded now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            states_simulated: AtomicU64::new(0),
            nodes_expanded: AtomicU64::new(0),
            candidates_scored: AtomicU64::new(0),
            improvements: AtomicU64::new(0),
        }
    }

    pub fn record_simulated(&self, count: u64) {
        self.states_simulated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_expanded(&self) {
        self.nodes_expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_candidate(&self) {
        self.candidates_scored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_improvement(&self) {
        self.improvements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn states_simulated(&self) -> u64 {
        self.states_simulated.load(Ordering::Relaxed)
    }

    pub fn nodes_expanded(&self) -> u64 {
        self.nodes_expanded.load(Ordering::Relaxed)
    }

    pub fn improvements(&self) -> u64 {
        self.improvements.load(Ordering::Relaxed)
    }

    /// Captures the current counters without stopping collection.
    pub fn snapshot(&self) -> SolverStatistics {
        SolverStatistics {
            duration: self.elapsed(),
            states_simulated: self.states_simulated(),
            nodes_expanded: self.nodes_expanded(),
            candidates_scored: self.candidates_scored.load(Ordering::Relaxed),
            improvements: self.improvements(),
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
    fn test_collector_snapshot() {
        let collector = StatisticsCollector::new();
        collector.record_simulated(5);
        collector.record_expanded();
        collector.record_candidate();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.states_simulated, 5);
        assert_eq!(snapshot.nodes_expanded, 1);
        assert_eq!(snapshot.candidates_scored, 1);
        assert_eq!(snapshot.improvements, 0);

        // Can still use collector after snapshot
        collector.record_simulated(1);
        assert_eq!(collector.states_simulated(), 6);
    }

    #[test]
    fn test_collector_thread_safety() {
        let collector = StatisticsCollector::new();

        rayon::scope(|s| {
            for _ in 0..4 {
                s.spawn(|_| {
                    for _ in 0..1000 {
                        collector.record_simulated(1);
                        collector.record_expanded();
                    }
                });
            }
        });

        assert_eq!(collector.states_simulated(), 4000);
        assert_eq!(collector.nodes_expanded(), 4000);
    }

    #[test]
    fn test_states_per_second() {
        let stats = SolverStatistics {
            duration: Duration::from_secs(2),
            states_simulated: 1000,
            ..Default::default()
        };
        assert_eq!(stats.states_per_second(), 500);
        assert_eq!(SolverStatistics::default().states_per_second(), 0);
    }
}
