//! Search strategies.
//!
//! Every strategy explores action sequences for one [`SearchScope`] and
//! offers complete candidates to its best record. They differ only in how
//! they walk the space:
//!
//! - [`ExhaustiveSearch`]: fixed-depth odometer with subtree skipping
//! - [`GeneticSearch`]: evolving fixed-length chromosomes
//! - [`BeamSearch`]: discrepancy-bounded beam probes
//! - [`BranchAndBound`]: macro-steps over presolved windows
//! - [`DecomposeSearch`]: progress/quality split, interleaving and repair

mod beam;
mod branch_and_bound;
mod decompose;
mod exhaustive;
mod genetic;
mod presolve;

use std::fmt::Debug;

use craftforge_core::{simulate, ActionId, CraftContext, CraftState, IllegalStep};

use crate::error::SolveResult;
use crate::scope::SearchScope;

pub use beam::BeamSearch;
pub use branch_and_bound::BranchAndBound;
pub use decompose::DecomposeSearch;
pub use exhaustive::ExhaustiveSearch;
pub use genetic::GeneticSearch;
pub use presolve::WindowTable;

/// A search over action sequences.
pub trait Strategy: Send + Debug {
    /// Human-readable name used in logs and solutions.
    fn name(&self) -> &'static str;

    /// Rejects parameters that cannot work for `ctx` before search starts.
    fn validate(&self, _ctx: &CraftContext) -> SolveResult<()> {
        Ok(())
    }

    /// Runs the search, recording results in `scope`.
    fn solve(&mut self, scope: &SearchScope<'_>) -> SolveResult<()>;
}

/// One simulation step, counted in the run statistics.
#[inline]
pub(crate) fn step(
    scope: &SearchScope<'_>,
    ctx: &CraftContext,
    state: &CraftState,
    id: ActionId,
) -> Result<CraftState, IllegalStep> {
    scope.statistics().record_simulated(1);
    simulate(ctx, state, id)
}
