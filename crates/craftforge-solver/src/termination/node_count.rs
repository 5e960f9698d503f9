//! Simulation count termination.

use super::Termination;
use crate::scope::SearchScope;

/// Terminates after a number of single-step simulations.
#[derive(Debug, Clone)]
pub struct NodeCountTermination {
    limit: u64,
}

impl NodeCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for NodeCountTermination {
    fn is_terminated(&self, scope: &SearchScope<'_>) -> bool {
        scope.statistics().states_simulated() >= self.limit
    }
}
