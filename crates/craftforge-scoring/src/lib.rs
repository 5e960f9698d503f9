//! Scoring and legality audits for CraftForge.
//!
//! This crate provides the two judgements every search strategy shares:
//! - [`Scorer`]: a scalar desirability for complete or partial states
//! - [`AuditChain`]: composable legality rules over action sequences
//!
//! Rejection counters live in an [`AuditStats`] owned by the run, never in
//! process-wide statics.

pub mod audit;
pub mod score;

pub use audit::{
    AllowedActions, Audit, AuditChain, AuditKind, AuditStats, CpBudget, DurabilityBudget,
    EndsOnProgress, FinisherDiscipline, NoBannedPairs, NoRepeatedBuff, NoWastedActions,
    ObservationPrecedes,
};
pub use score::{ScoreWeights, Scorer, INFEASIBLE, QUALITY_OVERSHOOT};

#[cfg(test)]
mod tests;
