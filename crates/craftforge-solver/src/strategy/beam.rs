//! Discrepancy-bounded beam search.
//!
//! Each probe walks the tree one layer at a time. A layer's successors are
//! deduplicated by [`StateKey`], ranked by partial score and cut into
//! slices of the beam width. With no discrepancies left a probe follows
//! slice 0 only; otherwise it first spends one discrepancy on every later
//! slice, then continues down slice 0 with the same budget. Probes run for
//! budgets `0..=max_discrepancies`.
//!
//! Each probe keeps its nodes in an [`ActionTree`]. A slice is forgotten as
//! soon as it is fully explored or skipped, so only the live branch and its
//! unexplored siblings stay in memory.

use std::collections::HashSet;

use tracing::debug;

use craftforge_config::BeamConfig;
use craftforge_core::StateKey;
use craftforge_scoring::{AuditChain, ScoreWeights, Scorer};

use super::{step, Strategy};
use crate::error::SolveResult;
use crate::scope::SearchScope;
use crate::tree::{ActionTree, NodeId};

#[derive(Debug, Clone, Copy)]
struct BeamNode {
    node: NodeId,
    score: f64,
}

/// Why a probe stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeEnd {
    /// Ran out of layers, depth or successors.
    Exhausted,
    /// The visited set would pass the node limit.
    NodeLimit,
    /// The scope asked to stop.
    Terminated,
}

struct Probe<'s, 'a> {
    scope: &'s SearchScope<'a>,
    scorer: Scorer,
    chain: AuditChain,
    config: &'s BeamConfig,
    tree: ActionTree,
    visited: HashSet<StateKey>,
    found: bool,
}

impl Probe<'_, '_> {
    fn run(&mut self, layer: &[BeamNode], depth: usize, budget: usize) -> ProbeEnd {
        if self.scope.should_terminate() {
            return ProbeEnd::Terminated;
        }
        if layer.is_empty() || depth >= self.config.max_depth {
            return ProbeEnd::Exhausted;
        }

        let successors = match self.expand(layer) {
            Some(s) => s,
            None => return ProbeEnd::NodeLimit,
        };
        if successors.is_empty() {
            return ProbeEnd::Exhausted;
        }

        let width = self.config.beam_width.max(1);
        let mut slices: Vec<Vec<BeamNode>> = Vec::new();
        let mut iter = successors.into_iter().peekable();
        while iter.peek().is_some() {
            slices.push(iter.by_ref().take(width).collect());
        }
        let mut slices = slices.into_iter();
        let first = slices.next().unwrap_or_default();

        for slice in slices {
            if budget > 0 {
                match self.run(&slice, depth + 1, budget - 1) {
                    ProbeEnd::Exhausted => {}
                    end => return end,
                }
            }
            self.forget(&slice);
        }
        let end = self.run(&first, depth + 1, budget);
        if end == ProbeEnd::Exhausted {
            self.forget(&first);
        }
        end
    }

    fn forget(&mut self, slice: &[BeamNode]) {
        for node in slice {
            self.tree.forget(node.node);
        }
    }

    /// Ranked, deduplicated successors of `layer`, or `None` past the limit.
    fn expand(&mut self, layer: &[BeamNode]) -> Option<Vec<BeamNode>> {
        let scope = self.scope;
        let ctx = scope.ctx();
        let mut successors = Vec::new();
        for parent in layer {
            scope.statistics().record_expanded();
            let mut path = self.tree.path(parent.node);
            let base = path.len();
            let start = self.tree.state(parent.node).clone();
            for &id in ctx.allowed() {
                let Ok(state) = step(scope, ctx, &start, id) else {
                    continue;
                };
                path.truncate(base);
                path.push(id);

                if ctx.is_complete(&state) {
                    let score = self.scorer.score_complete(&state);
                    if scope.offer(&path, &state, score).is_valid() {
                        self.found = true;
                    }
                    continue;
                }
                if !self.visited.insert(state.key()) {
                    continue;
                }
                if !self.chain.passes(&path, ctx, scope.audit_stats()) {
                    continue;
                }
                let score = self.scorer.score_partial(&state);
                let node = self.tree.push_child(parent.node, id, state);
                successors.push(BeamNode { node, score });
            }
        }
        if self.visited.len() > self.config.node_limit {
            return None;
        }
        successors.sort_by(|a, b| b.score.total_cmp(&a.score));
        Some(successors)
    }
}

/// Beam search with limited discrepancy backtracking.
#[derive(Debug, Clone)]
pub struct BeamSearch {
    config: BeamConfig,
    weights: ScoreWeights,
}

impl BeamSearch {
    pub fn new(config: BeamConfig) -> Self {
        Self {
            config,
            weights: ScoreWeights::beam(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }
}

impl Default for BeamSearch {
    fn default() -> Self {
        Self::new(BeamConfig::default())
    }
}

impl Strategy for BeamSearch {
    fn name(&self) -> &'static str {
        "Beam"
    }

    fn solve(&mut self, scope: &SearchScope<'_>) -> SolveResult<()> {
        let ctx = scope.ctx();
        let scorer = Scorer::new(ctx, self.weights);
        let start = ctx.initial_state();
        let root_score = scorer.score_partial(&start);

        for budget in 0..=self.config.max_discrepancies {
            let mut probe = Probe {
                scope,
                scorer,
                chain: AuditChain::prefix(),
                config: &self.config,
                tree: ActionTree::new(start.clone()),
                visited: HashSet::new(),
                found: false,
            };
            let root = BeamNode {
                node: probe.tree.root(),
                score: root_score,
            };
            let end = probe.run(&[root], 0, budget);

            debug!(
                event = "probe",
                discrepancies = budget,
                visited = probe.visited.len(),
                arena_slots = probe.tree.capacity(),
                found = probe.found,
                end = ?end,
            );
            scope.log_with(|| {
                format!(
                    "probe with {budget} discrepancies visited {} states{}",
                    probe.visited.len(),
                    if probe.found { ", found a solution" } else { "" }
                )
            });

            if end == ProbeEnd::Terminated {
                break;
            }
            if probe.found && !self.config.exhaust_discrepancies {
                break;
            }
        }
        Ok(())
    }
}
