//! Legality audits over whole or partial action sequences.
//!
//! Audits catch domain rules the step simulator does not: ordering rules,
//! wasted buffs, and cheap resource pre-checks. Strategies compose the
//! subset that matches what they search over.

mod rules;

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};

use craftforge_core::{ActionId, CraftContext};

pub use rules::{
    AllowedActions, CpBudget, DurabilityBudget, EndsOnProgress, FinisherDiscipline,
    NoBannedPairs, NoRepeatedBuff, NoWastedActions, ObservationPrecedes,
};

/// Identity of an audit rule, used to bucket rejection counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditKind {
    AllowedActions,
    NoRepeatedBuff,
    FinisherDiscipline,
    ObservationPrecedes,
    EndsOnProgress,
    CpBudget,
    DurabilityBudget,
    NoWastedActions,
    NoBannedPairs,
}

impl AuditKind {
    pub const COUNT: usize = 9;

    pub const ALL: [AuditKind; Self::COUNT] = [
        AuditKind::AllowedActions,
        AuditKind::NoRepeatedBuff,
        AuditKind::FinisherDiscipline,
        AuditKind::ObservationPrecedes,
        AuditKind::EndsOnProgress,
        AuditKind::CpBudget,
        AuditKind::DurabilityBudget,
        AuditKind::NoWastedActions,
        AuditKind::NoBannedPairs,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            AuditKind::AllowedActions => "allowed_actions",
            AuditKind::NoRepeatedBuff => "no_repeated_buff",
            AuditKind::FinisherDiscipline => "finisher_discipline",
            AuditKind::ObservationPrecedes => "observation_precedes",
            AuditKind::EndsOnProgress => "ends_on_progress",
            AuditKind::CpBudget => "cp_budget",
            AuditKind::DurabilityBudget => "durability_budget",
            AuditKind::NoWastedActions => "no_wasted_actions",
            AuditKind::NoBannedPairs => "no_banned_pairs",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A legality predicate over a candidate sequence.
pub trait Audit: Send + Sync + Debug {
    fn kind(&self) -> AuditKind;

    /// Returns true if `sequence` passes this rule for the given context.
    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool;
}

/// Per-run rejection counters.
///
/// Lives in the search scope and is shared by reference with every worker.
#[derive(Debug, Default)]
pub struct AuditStats {
    checked: AtomicU64,
    rejected: [AtomicU64; AuditKind::COUNT],
}

impl AuditStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_checked(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self, kind: AuditKind) {
        self.rejected[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn checked(&self) -> u64 {
        self.checked.load(Ordering::Relaxed)
    }

    pub fn rejections(&self, kind: AuditKind) -> u64 {
        self.rejected[kind.index()].load(Ordering::Relaxed)
    }

    pub fn total_rejections(&self) -> u64 {
        self.rejected.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Non-zero rejection counts, in rule order.
    pub fn snapshot(&self) -> Vec<(AuditKind, u64)> {
        AuditKind::ALL
            .iter()
            .map(|&k| (k, self.rejections(k)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// An ordered list of audits that must all pass.
#[derive(Debug, Default)]
pub struct AuditChain {
    audits: Vec<Box<dyn Audit>>,
}

impl AuditChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, audit: impl Audit + 'static) -> Self {
        self.audits.push(Box::new(audit));
        self
    }

    pub fn len(&self) -> usize {
        self.audits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audits.is_empty()
    }

    pub fn kinds(&self) -> Vec<AuditKind> {
        self.audits.iter().map(|a| a.kind()).collect()
    }

    /// Rules for a complete candidate solution.
    pub fn full() -> Self {
        Self::new()
            .with(AllowedActions)
            .with(NoRepeatedBuff)
            .with(FinisherDiscipline)
            .with(ObservationPrecedes::strict())
            .with(EndsOnProgress)
            .with(CpBudget)
            .with(DurabilityBudget)
            .with(NoWastedActions)
    }

    /// Rules that hold for every prefix of a valid candidate.
    pub fn prefix() -> Self {
        Self::new()
            .with(AllowedActions)
            .with(NoRepeatedBuff)
            .with(FinisherDiscipline)
            .with(ObservationPrecedes::open_ended())
            .with(CpBudget)
            .with(DurabilityBudget)
    }

    /// Prefix rules for the progress half of a decomposed search.
    pub fn progress_only() -> Self {
        Self::new()
            .with(AllowedActions)
            .with(NoRepeatedBuff)
            .with(ObservationPrecedes::open_ended())
            .with(NoBannedPairs::derived())
            .with(CpBudget)
    }

    /// Prefix rules for the quality half of a decomposed search.
    pub fn quality_only() -> Self {
        Self::new()
            .with(AllowedActions)
            .with(NoRepeatedBuff)
            .with(FinisherDiscipline)
            .with(ObservationPrecedes::open_ended())
            .with(NoBannedPairs::derived())
            .with(CpBudget)
    }

    /// Rules for a short window checked in isolation.
    pub fn window() -> Self {
        Self::new()
            .with(NoRepeatedBuff)
            .with(ObservationPrecedes::window())
            .with(NoBannedPairs::derived())
    }

    /// Rules for normalised genetic chromosomes.
    pub fn genetic() -> Self {
        Self::new()
            .with(AllowedActions)
            .with(NoRepeatedBuff)
            .with(FinisherDiscipline)
            .with(ObservationPrecedes::open_ended())
            .with(CpBudget)
            .with(NoWastedActions)
    }

    /// Runs every audit in order, recording the first rejection.
    pub fn passes(&self, sequence: &[ActionId], ctx: &CraftContext, stats: &AuditStats) -> bool {
        stats.record_checked();
        match self.first_failure(sequence, ctx) {
            None => true,
            Some(kind) => {
                stats.record_rejection(kind);
                false
            }
        }
    }

    /// Kind of the first audit that rejects `sequence`, if any.
    pub fn first_failure(&self, sequence: &[ActionId], ctx: &CraftContext) -> Option<AuditKind> {
        self.audits
            .iter()
            .find(|a| !a.check(sequence, ctx))
            .map(|a| a.kind())
    }
}
