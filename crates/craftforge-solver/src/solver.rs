//! The orchestrator: one strategy, one pool, one best record.
//!
//! Logging levels:
//! - **INFO**: solve start and end with the final score
//! - **DEBUG**: strategy progress, improvements, audit rejections

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use craftforge_config::SolverConfig;
use craftforge_core::{simulate, simulate_sequence, ActionId, CraftContext};

use crate::builder::{StrategyBuilder, TerminationBuilder};
use crate::error::SolveResult;
use crate::pool::{ThreadCount, WorkerPool};
use crate::scope::{Improvement, LogSink, SearchScope};
use crate::solution::Solution;
use crate::strategy::Strategy;
use crate::termination::{ExternalTermination, Termination};

/// Runs one strategy against a craft and returns the best sequence.
///
/// # Example
///
/// ```
/// use craftforge_solver::{CraftSolver, ThreadCount};
/// use craftforge_solver::strategy::DecomposeSearch;
///
/// let mut solver = CraftSolver::new(Box::new(DecomposeSearch::default()))
///     .with_thread_count(ThreadCount::Specific(2))
///     .with_seed(7);
/// # let _ = &mut solver;
/// ```
pub struct CraftSolver {
    strategy: Box<dyn Strategy>,
    thread_count: ThreadCount,
    seed: Option<u64>,
    terminations: Vec<Box<dyn Termination>>,
    sink: Option<LogSink>,
}

impl CraftSolver {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            strategy,
            thread_count: ThreadCount::default(),
            seed: None,
            terminations: Vec::new(),
            sink: None,
        }
    }

    /// Builds the strategy, weights, thread count and limits from `config`.
    pub fn from_config(config: &SolverConfig) -> SolveResult<Self> {
        config.validate()?;
        let strategy = StrategyBuilder::build(&config.strategy, config.weights.as_ref());
        let mut solver = Self::new(strategy).with_thread_count(config.thread_count.into());
        solver.seed = config.random_seed;
        solver.terminations = TerminationBuilder::build(config.termination.as_ref());
        Ok(solver)
    }

    pub fn with_thread_count(mut self, count: ThreadCount) -> Self {
        self.thread_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_termination(mut self, termination: impl Termination + 'static) -> Self {
        self.terminations.push(Box::new(termination));
        self
    }

    /// Stops the search once `flag` is set from another thread.
    pub fn with_terminate(self, flag: Arc<AtomicBool>) -> Self {
        self.with_termination(ExternalTermination::new(flag))
    }

    /// Receives human-readable progress lines from any worker.
    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Searches `ctx` and returns the best sequence, or `None` if nothing
    /// reaches the progress target.
    ///
    /// # Errors
    ///
    /// Fails before searching when the strategy's parameters cannot work
    /// for `ctx` or the worker pool cannot start.
    pub fn solve(&mut self, ctx: &CraftContext) -> SolveResult<Option<Solution>> {
        self.run(ctx, None)
    }

    /// Like [`solve`](Self::solve), sending every improvement through `sender`.
    pub fn solve_with_channel(
        &mut self,
        ctx: &CraftContext,
        sender: mpsc::UnboundedSender<Improvement>,
    ) -> SolveResult<Option<Solution>> {
        self.run(ctx, Some(&sender))
    }

    fn run(
        &mut self,
        ctx: &CraftContext,
        sender: Option<&mpsc::UnboundedSender<Improvement>>,
    ) -> SolveResult<Option<Solution>> {
        let name = self.strategy.name();
        if ctx.allowed().is_empty() {
            info!(event = "solve_end", strategy = name, found = false, reason = "no usable actions");
            return Ok(None);
        }
        self.strategy.validate(ctx)?;
        let pool = WorkerPool::new(self.thread_count)?;

        info!(
            event = "solve_start",
            strategy = name,
            actor = %ctx.actor().name,
            recipe = %ctx.recipe().name,
            actions = ctx.allowed().len(),
            difficulty = ctx.difficulty(),
            quality_target = ctx.quality_target(),
            threads = pool.threads(),
        );

        let scope = SearchScope::new(ctx, &pool)
            .with_terminations(&self.terminations)
            .with_seed(self.seed)
            .with_sink(self.sink.as_ref())
            .with_sender(sender);

        debug!(event = "strategy_start", strategy = name, seed = scope.seed());
        self.strategy.solve(&scope)?;
        let statistics = scope.statistics().snapshot();
        debug!(
            event = "strategy_end",
            strategy = name,
            states_simulated = statistics.states_simulated,
            nodes_expanded = statistics.nodes_expanded,
            audits_checked = scope.audit_stats().checked(),
            audits_rejected = scope.audit_stats().total_rejections(),
        );

        let Some(mut best) = scope.into_best() else {
            info!(
                event = "solve_end",
                strategy = name,
                found = false,
                duration_ms = statistics.duration.as_millis() as u64,
            );
            return Ok(None);
        };

        let trimmed = trim_to_completion(ctx, &best.actions);
        if trimmed.len() < best.actions.len() {
            if let Some(state) = simulate_sequence(ctx, &trimmed) {
                best.state = state;
                best.actions = trimmed;
            }
        }

        let perfect = ctx.is_perfect(&best.state);
        let solution = Solution::new(best, perfect, name, ctx.shared_catalog(), statistics);
        info!(
            event = "solve_end",
            strategy = name,
            found = true,
            score = solution.score(),
            length = solution.len(),
            quality = solution.state().quality,
            perfect = perfect,
            states_simulated = solution.statistics().states_simulated,
            states_per_sec = solution.statistics().states_per_second(),
            duration_ms = solution.statistics().duration.as_millis() as u64,
        );
        Ok(Some(solution))
    }
}

impl fmt::Debug for CraftSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CraftSolver")
            .field("strategy", &self.strategy)
            .field("thread_count", &self.thread_count)
            .field("seed", &self.seed)
            .field("terminations", &self.terminations)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

/// Shortest prefix of `actions` that reaches the progress target.
///
/// Returns the whole sequence when no prefix completes.
pub fn trim_to_completion(ctx: &CraftContext, actions: &[ActionId]) -> Vec<ActionId> {
    let mut state = ctx.initial_state();
    for (i, &id) in actions.iter().enumerate() {
        match simulate(ctx, &state, id) {
            Ok(next) if ctx.is_complete(&next) => return actions[..=i].to_vec(),
            Ok(next) => state = next,
            Err(_) => break,
        }
    }
    actions.to_vec()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::error::SolveError;
    use crate::strategy::{DecomposeSearch, ExhaustiveSearch};
    use crate::termination::TimeTermination;
    use craftforge_config::{ExhaustiveConfig, StrategyConfig, WorkerThreadCount};
    use craftforge_core::standard::*;
    use craftforge_test::training;

    fn exhaustive(depth: usize) -> Box<dyn Strategy> {
        Box::new(ExhaustiveSearch::new(ExhaustiveConfig {
            max_depth: depth,
            node_limit: None,
        }))
    }

    #[test]
    fn test_solve_returns_perfect_solution() {
        let ctx = training::context();
        let mut solver = CraftSolver::new(exhaustive(4)).with_thread_count(ThreadCount::Specific(1));
        let solution = solver.solve(&ctx).unwrap().unwrap();

        assert!(solution.is_perfect());
        assert_eq!(solution.len(), 4);
        assert_eq!(solution.strategy(), "Exhaustive");
        assert!(solution.statistics().states_simulated > 0);
        assert_eq!(solution.names().len(), 4);
    }

    #[test]
    fn test_no_usable_actions_is_none() {
        let ctx = training::context().restrict_to(&[]);
        let mut solver = CraftSolver::new(Box::new(DecomposeSearch::default()));
        assert!(solver.solve(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_immediate_termination_finds_nothing() {
        let ctx = training::context();
        let mut solver = CraftSolver::new(exhaustive(4))
            .with_thread_count(ThreadCount::Specific(1))
            .with_termination(TimeTermination::new(Duration::ZERO));
        assert!(solver.solve(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_terminate_flag() {
        let ctx = training::context();
        let flag = Arc::new(AtomicBool::new(true));
        let mut solver = CraftSolver::new(exhaustive(4)).with_terminate(flag);
        assert!(solver.solve(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_invalid_strategy_setup_errors() {
        let ctx = training::context();
        let mut solver = CraftSolver::new(exhaustive(0));
        assert!(matches!(solver.solve(&ctx), Err(SolveError::Setup(_))));
    }

    #[test]
    fn test_from_config_validates() {
        let config = SolverConfig::new().with_thread_count(WorkerThreadCount::Count(0));
        assert!(matches!(CraftSolver::from_config(&config), Err(SolveError::Config(_))));

        let config = SolverConfig::new()
            .with_random_seed(3)
            .with_strategy(StrategyConfig::Exhaustive(ExhaustiveConfig {
                max_depth: 4,
                node_limit: None,
            }));
        let solver = CraftSolver::from_config(&config).unwrap();
        assert_eq!(solver.strategy_name(), "Exhaustive");
    }

    #[test]
    fn test_channel_and_sink_receive_progress() {
        let ctx = training::context();
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let captured = Arc::clone(&lines);
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let mut solver = CraftSolver::new(exhaustive(4))
            .with_thread_count(ThreadCount::Specific(1))
            .with_sink(Arc::new(move |line: &str| {
                captured.lock().unwrap().push(line.to_string());
            }));
        let solution = solver.solve_with_channel(&ctx, sender).unwrap().unwrap();

        let mut last = None;
        while let Ok(improvement) = receiver.try_recv() {
            last = Some(improvement);
        }
        let last = last.unwrap();
        assert_eq!(last.actions, solution.actions());
        assert!(last.perfect);
        assert!(!lines.lock().unwrap().is_empty());
    }

    #[test]
    fn test_trim_to_completion() {
        let ctx = training::context();
        let padded = [BASIC_SYNTHESIS, BASIC_SYNTHESIS, BASIC_TOUCH];
        assert_eq!(
            trim_to_completion(&ctx, &padded),
            vec![BASIC_SYNTHESIS, BASIC_SYNTHESIS]
        );
        let incomplete = [BASIC_TOUCH];
        assert_eq!(trim_to_completion(&ctx, &incomplete), vec![BASIC_TOUCH]);
    }
}
