//! Results handed back to callers.

use std::fmt;
use std::sync::Arc;

use craftforge_core::{ActionCatalog, ActionDescriptor, ActionId, CraftState};

use crate::statistics::SolverStatistics;

/// A complete sequence with its final state and score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSequence {
    pub actions: Vec<ActionId>,
    pub state: CraftState,
    pub score: f64,
}

impl ScoredSequence {
    pub fn new(actions: Vec<ActionId>, state: CraftState, score: f64) -> Self {
        Self {
            actions,
            state,
            score,
        }
    }

    /// Higher score wins; ties go to the shorter, then lexicographically
    /// smaller sequence so parallel runs agree on one answer.
    pub fn beats(&self, other: &ScoredSequence) -> bool {
        const TIE: f64 = 1e-12;
        if (self.score - other.score).abs() > TIE {
            return self.score > other.score;
        }
        (self.actions.len(), &self.actions) < (other.actions.len(), &other.actions)
    }
}

/// Best sequence found by a run.
#[derive(Debug, Clone)]
pub struct Solution {
    actions: Vec<ActionId>,
    state: CraftState,
    score: f64,
    perfect: bool,
    strategy: &'static str,
    catalog: Arc<ActionCatalog>,
    statistics: SolverStatistics,
}

impl Solution {
    pub(crate) fn new(
        best: ScoredSequence,
        perfect: bool,
        strategy: &'static str,
        catalog: Arc<ActionCatalog>,
        statistics: SolverStatistics,
    ) -> Self {
        Self {
            actions: best.actions,
            state: best.state,
            score: best.score,
            perfect,
            strategy,
            catalog,
            statistics,
        }
    }

    /// Ordered action ids.
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Descriptor of the action at `index`.
    pub fn descriptor(&self, index: usize) -> Option<&ActionDescriptor> {
        self.actions.get(index).and_then(|id| self.catalog.get(*id))
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.iter().filter_map(|id| self.catalog.get(*id))
    }

    pub fn names(&self) -> Vec<String> {
        self.catalog.names(&self.actions)
    }

    /// State after the last action.
    pub fn state(&self) -> &CraftState {
        &self.state
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_perfect(&self) -> bool {
        self.perfect
    }

    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names().iter().enumerate() {
            writeln!(f, "{:>3}. {}", i + 1, name)?;
        }
        write!(
            f,
            "progress {} | quality {} | durability {} | cp {} | score {:.4}",
            self.state.progress, self.state.quality, self.state.durability, self.state.cp, self.score
        )
    }
}
