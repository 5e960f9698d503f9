//! Termination conditions checked opportunistically by strategies.

mod external;
mod node_count;
mod time;

use std::fmt::Debug;

use crate::scope::SearchScope;

pub use external::ExternalTermination;
pub use node_count::NodeCountTermination;
pub use time::TimeTermination;

/// Trait for determining when to stop searching.
///
/// Implementations are read from worker threads, so they must be cheap and
/// free of side effects.
pub trait Termination: Send + Sync + Debug {
    /// Returns true if the search should stop.
    fn is_terminated(&self, scope: &SearchScope<'_>) -> bool;
}

#[cfg(test)]
mod tests;
