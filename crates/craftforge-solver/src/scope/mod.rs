//! Per-run shared context handed to a strategy.
//!
//! The scope owns everything workers share: the best record behind a
//! mutex, the perfect flag, audit and statistics counters, and the
//! outbound improvement channel. It is `Sync`, so strategies pass `&scope`
//! into the worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::debug;

use craftforge_core::{ActionId, CraftContext, CraftState};
use craftforge_scoring::{AuditChain, AuditStats};

use crate::pool::WorkerPool;
use crate::solution::ScoredSequence;
use crate::statistics::StatisticsCollector;
use crate::termination::Termination;

/// Caller-supplied progress sink, callable from any worker.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// What happened to a candidate offered to the best record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Incomplete, infeasible or rejected by the full audit chain.
    Rejected,
    /// Valid, but no better than the current record.
    NotBetter,
    /// Replaced the record.
    Improved,
}

impl OfferOutcome {
    /// The candidate is a valid solution, whether or not it improved.
    pub fn is_valid(self) -> bool {
        self != OfferOutcome::Rejected
    }

    pub fn is_improvement(self) -> bool {
        self == OfferOutcome::Improved
    }
}

/// Sent through the improvement channel each time the best record moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    pub actions: Vec<ActionId>,
    pub score: f64,
    pub perfect: bool,
    pub elapsed: Duration,
}

pub struct SearchScope<'a> {
    ctx: &'a CraftContext,
    pool: &'a WorkerPool,
    terminations: &'a [Box<dyn Termination>],
    full_chain: AuditChain,
    audit_stats: AuditStats,
    statistics: StatisticsCollector,
    best: Mutex<Option<ScoredSequence>>,
    perfect: AtomicBool,
    stopped: AtomicBool,
    seed: u64,
    sink: Option<&'a LogSink>,
    sender: Option<&'a mpsc::UnboundedSender<Improvement>>,
}

impl<'a> SearchScope<'a> {
    /// A scope with no terminations, no sink and a random seed.
    pub fn new(ctx: &'a CraftContext, pool: &'a WorkerPool) -> Self {
        Self {
            ctx,
            pool,
            terminations: &[],
            full_chain: AuditChain::full(),
            audit_stats: AuditStats::new(),
            statistics: StatisticsCollector::new(),
            best: Mutex::new(None),
            perfect: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            seed: rand::random(),
            sink: None,
            sender: None,
        }
    }

    pub fn with_terminations(mut self, terminations: &'a [Box<dyn Termination>]) -> Self {
        self.terminations = terminations;
        self
    }

    /// Fixes the base seed; `None` keeps the random one.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self
    }

    pub fn with_sink(mut self, sink: Option<&'a LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_sender(mut self, sender: Option<&'a mpsc::UnboundedSender<Improvement>>) -> Self {
        self.sender = sender;
        self
    }

    #[inline]
    pub fn ctx(&self) -> &'a CraftContext {
        self.ctx
    }

    #[inline]
    pub fn pool(&self) -> &'a WorkerPool {
        self.pool
    }

    pub fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }

    pub fn audit_stats(&self) -> &AuditStats {
        &self.audit_stats
    }

    pub fn elapsed(&self) -> Duration {
        self.statistics.elapsed()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Deterministic generator for one independent stream of work.
    pub fn rng(&self, stream: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(stream);
        rng
    }

    pub fn is_perfect_found(&self) -> bool {
        self.perfect.load(Ordering::Relaxed)
    }

    /// True once a perfect sequence is recorded or any termination fires.
    ///
    /// Latches: after the first `true` every later call is a flag read.
    pub fn should_terminate(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) || self.is_perfect_found() {
            return true;
        }
        if self.terminations.iter().any(|t| t.is_terminated(self)) {
            self.stopped.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Offers a complete candidate to the best record.
    ///
    /// The candidate must reach the progress target and pass the full audit
    /// chain.
    pub fn offer(&self, actions: &[ActionId], state: &CraftState, score: f64) -> OfferOutcome {
        if score < 0.0 || !self.ctx.is_complete(state) {
            return OfferOutcome::Rejected;
        }
        self.statistics.record_candidate();
        if !self.full_chain.passes(actions, self.ctx, &self.audit_stats) {
            return OfferOutcome::Rejected;
        }

        let candidate = ScoredSequence::new(actions.to_vec(), state.clone(), score);
        {
            let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
            if best.as_ref().is_some_and(|current| !candidate.beats(current)) {
                return OfferOutcome::NotBetter;
            }
            *best = Some(candidate);
        }

        let perfect = self.ctx.is_perfect(state);
        if perfect {
            self.perfect.store(true, Ordering::Relaxed);
        }
        self.statistics.record_improvement();
        let elapsed = self.elapsed();

        debug!(
            event = "improvement",
            score = score,
            length = actions.len(),
            quality = state.quality,
            perfect = perfect,
            elapsed_ms = elapsed.as_millis() as u64,
        );
        self.log_with(|| {
            format!(
                "new best: score {:.4}, {} actions, quality {}{}",
                score,
                actions.len(),
                state.quality,
                if perfect { " (perfect)" } else { "" }
            )
        });
        if let Some(sender) = self.sender {
            let _ = sender.send(Improvement {
                actions: actions.to_vec(),
                score,
                perfect,
                elapsed,
            });
        }
        OfferOutcome::Improved
    }

    /// Current best record.
    pub fn best(&self) -> Option<ScoredSequence> {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_best(self) -> Option<ScoredSequence> {
        self.best
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Forwards a line to the caller's sink, if any.
    pub fn log(&self, line: &str) {
        if let Some(sink) = self.sink {
            sink(line);
        }
    }

    /// Like [`log`](Self::log), formatting only when a sink is present.
    pub fn log_with(&self, line: impl FnOnce() -> String) {
        if let Some(sink) = self.sink {
            sink(&line());
        }
    }
}

#[cfg(test)]
mod tests;
