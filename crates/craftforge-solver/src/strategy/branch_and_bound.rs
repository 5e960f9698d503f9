//! Branch-and-bound over presolved windows.
//!
//! Each macro-step extends every frontier path by one whole window. Workers
//! expand frontier entries in parallel and keep their own top `N`; the
//! merged successors are cut to the global top `N` by partial score,
//! deduplicated by state. Kept paths then retreat by `R` actions so the
//! next macro-step can revise the tail. Dropped branches are released from
//! the shared arena, and entries that produced nothing are forgotten.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use craftforge_config::BranchAndBoundConfig;
use craftforge_core::{simulate, ActionId, CraftContext, CraftState, StateKey};
use craftforge_scoring::{AuditChain, ScoreWeights, Scorer};

use super::presolve::{skip_shared_prefix, Window, WindowTable};
use super::{step, Strategy};
use crate::error::{SolveError, SolveResult};
use crate::scope::SearchScope;
use crate::tree::{ActionTree, NodeId};

#[derive(Debug, Clone, Copy)]
struct Entry {
    node: NodeId,
    depth: usize,
}

/// A frontier entry extended by one window; its node is held.
#[derive(Debug)]
struct Successor {
    node: NodeId,
    key: StateKey,
    score: f64,
}

struct Candidate<'w> {
    window: &'w Window,
    key: StateKey,
    score: f64,
}

/// Macro-step search over presolved windows.
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    config: BranchAndBoundConfig,
    weights: ScoreWeights,
}

impl BranchAndBound {
    pub fn new(config: BranchAndBoundConfig) -> Self {
        Self {
            config,
            weights: ScoreWeights::branch_and_bound(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &BranchAndBoundConfig {
        &self.config
    }
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self::new(BranchAndBoundConfig::default())
    }
}

/// Shared, read-only inputs of one macro-step.
struct Expander<'s, 'a> {
    scope: &'s SearchScope<'a>,
    table: &'s WindowTable,
    arena: &'s Mutex<ActionTree>,
    scorer: Scorer,
    chain: &'s AuditChain,
    config: &'s BranchAndBoundConfig,
}

impl Expander<'_, '_> {
    fn expand(&self, entry: &Entry) -> Vec<Successor> {
        let ctx = self.scope.ctx();
        let width = self.table.length();
        if entry.depth + width > self.config.max_depth {
            return Vec::new();
        }
        self.scope.statistics().record_expanded();

        let (path, start) = {
            let tree = lock(self.arena);
            (tree.path(entry.node), tree.state(entry.node).clone())
        };
        let mut sequence = path.clone();
        let mut candidates: Vec<Candidate<'_>> = Vec::new();

        for group in self.table.groups() {
            if self.scope.should_terminate() {
                break;
            }
            let mut index = 0;
            while index < group.len() {
                let window = &group[index];
                let mut state = start.clone();
                let mut stopped_at = None;

                for (pos, &id) in window.iter().enumerate() {
                    match step(self.scope, ctx, &state, id) {
                        Err(_) => {
                            stopped_at = Some(pos);
                            break;
                        }
                        Ok(next) if ctx.is_complete(&next) => {
                            sequence.truncate(path.len());
                            sequence.extend_from_slice(&window[..=pos]);
                            let score = self.scorer.score_complete(&next);
                            self.scope.offer(&sequence, &next, score);
                            stopped_at = Some(pos);
                            break;
                        }
                        Ok(next) => state = next,
                    }
                }

                if let Some(pos) = stopped_at {
                    index = skip_shared_prefix(group, index, pos);
                    continue;
                }
                index += 1;

                sequence.truncate(path.len());
                sequence.extend_from_slice(window);
                if !self.chain.passes(&sequence, ctx, self.scope.audit_stats()) {
                    continue;
                }
                candidates.push(Candidate {
                    window,
                    key: state.key(),
                    score: self.scorer.score_partial(&state),
                });
            }
        }

        let kept: Vec<_> =
            top_unique(candidates, self.config.frontier_width, |c| (c.score, c.key))
                .into_iter()
                .filter_map(|c| Some((replay(ctx, &start, c.window)?, c.key, c.score)))
                .collect();

        let mut tree = lock(self.arena);
        kept.into_iter()
            .map(|(steps, key, score)| Successor {
                node: tree.push_path(entry.node, steps),
                key,
                score,
            })
            .collect()
    }
}

/// Re-simulates a kept window, pairing each action with its state.
fn replay(
    ctx: &CraftContext,
    start: &CraftState,
    window: &Window,
) -> Option<Vec<(ActionId, CraftState)>> {
    let mut state = start.clone();
    window
        .iter()
        .map(|&id| {
            state = simulate(ctx, &state, id).ok()?;
            Some((id, state.clone()))
        })
        .collect()
}

fn lock(arena: &Mutex<ActionTree>) -> std::sync::MutexGuard<'_, ActionTree> {
    arena.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Best `limit` items by score with distinct keys, stable among equals.
fn top_unique<T>(mut items: Vec<T>, limit: usize, rank: impl Fn(&T) -> (f64, StateKey)) -> Vec<T> {
    items.sort_by(|a, b| rank(b).0.total_cmp(&rank(a).0));
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(rank(item).1))
        .take(limit)
        .collect()
}

impl BranchAndBound {
    /// Merges worker results into the next frontier, releasing the rest.
    fn advance(&self, arena: &Mutex<ActionTree>, successors: Vec<Successor>) -> Vec<Entry> {
        let mut ranked = successors;
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut tree = lock(arena);
        let mut seen_states = HashSet::new();
        let mut seen_nodes = HashSet::new();
        let mut frontier = Vec::new();
        for successor in ranked {
            let keep = frontier.len() < self.config.frontier_width && seen_states.insert(successor.key);
            if !keep {
                tree.release(successor.node);
                continue;
            }
            let anchor = tree.ancestor(successor.node, self.config.retreat);
            if seen_nodes.insert(anchor) {
                tree.hold(anchor);
                frontier.push(Entry {
                    node: anchor,
                    depth: tree.depth(anchor),
                });
            }
            tree.release(successor.node);
        }
        frontier
    }
}

impl Strategy for BranchAndBound {
    fn name(&self) -> &'static str {
        "Branch and Bound"
    }

    fn validate(&self, _ctx: &CraftContext) -> SolveResult<()> {
        if self.config.window_length == 0 || self.config.frontier_width == 0 {
            return Err(SolveError::Setup(
                "window length and frontier width must be at least 1".into(),
            ));
        }
        if self.config.retreat >= self.config.window_length {
            return Err(SolveError::Setup("retreat must be shorter than the window".into()));
        }
        Ok(())
    }

    fn solve(&mut self, scope: &SearchScope<'_>) -> SolveResult<()> {
        self.validate(scope.ctx())?;
        if scope.should_terminate() {
            return Ok(());
        }
        let ctx = scope.ctx();
        let table = WindowTable::presolve(ctx, self.config.window_length)?;
        scope.log_with(|| {
            format!(
                "presolved {} windows of length {}",
                table.len(),
                table.length()
            )
        });
        if table.is_empty() {
            return Ok(());
        }

        let arena = Mutex::new(ActionTree::new(ctx.initial_state()));
        let chain = AuditChain::prefix();
        let expander = Expander {
            scope,
            table: &table,
            arena: &arena,
            scorer: Scorer::new(ctx, self.weights),
            chain: &chain,
            config: &self.config,
        };

        let root = lock(&arena).root();
        let mut frontier = vec![Entry { node: root, depth: 0 }];

        for macro_step in 0..self.config.max_macro_steps {
            if frontier.is_empty() || scope.should_terminate() {
                break;
            }
            let expanded: Vec<NodeId> = frontier.iter().map(|e| e.node).collect();
            let results = scope.pool().map(frontier, |entry| expander.expand(&entry));
            {
                let mut tree = lock(&arena);
                for (node, result) in expanded.iter().zip(&results) {
                    if result.is_empty() {
                        tree.mark_exhausted(*node);
                    }
                }
            }

            frontier = self.advance(&arena, results.into_iter().flatten().collect());
            {
                let mut tree = lock(&arena);
                for node in expanded {
                    if tree.is_exhausted(node) {
                        tree.forget(node);
                    } else {
                        tree.release(node);
                    }
                }
            }

            let live = lock(&arena).live_count();
            debug!(
                event = "macro_step",
                step = macro_step,
                frontier = frontier.len(),
                arena_nodes = live,
                depth = frontier.iter().map(|e| e.depth).max().unwrap_or(0),
            );
            scope.log_with(|| {
                format!(
                    "macro-step {macro_step}: {} paths kept, {live} arena nodes",
                    frontier.len()
                )
            });
        }
        Ok(())
    }
}
