//! Per-path craft state.

mod key;

use std::fmt;

use crate::action::{ActionId, MAX_ACTIONS};

pub use key::{StateKey, MAX_ENCODED_ACCUMULATOR, MAX_ENCODED_RESOURCE};

/// Upper bound of the quality stack counter.
pub const MAX_STACKS: u8 = 10;

/// Remaining lifetime of one count-down buff.
///
/// `triggered` is set on the step the buff was used, after its remaining
/// count has already been decremented, so end-of-step bookkeeping knows not
/// to decrement it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct BuffTimer {
    pub remaining: u8,
    pub triggered: bool,
}

impl BuffTimer {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }
}

/// Why an action produced nothing useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasteCause {
    /// Stack finisher with an empty stack counter.
    FinisherWithoutStacks,
    /// Quality action taken with quality already at maximum.
    QualityOverCap,
    /// Durability restored past the cap.
    RestoreOverflow,
}

impl WasteCause {
    pub const ALL: [WasteCause; 3] = [
        WasteCause::FinisherWithoutStacks,
        WasteCause::QualityOverCap,
        WasteCause::RestoreOverflow,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Wasted-action counts by cause.
///
/// Diagnostic only; scoring ignores it, audits read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct WasteTally {
    counts: [u8; 3],
}

impl WasteTally {
    pub fn record(&mut self, cause: WasteCause) {
        let slot = &mut self.counts[cause.index()];
        *slot = slot.saturating_add(1);
    }

    pub fn count(&self, cause: WasteCause) -> u8 {
        self.counts[cause.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// State of one craft after some number of actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CraftState {
    pub step: u32,
    pub progress: i32,
    pub quality: i32,
    pub durability: i32,
    pub cp: i32,
    pub timers: [BuffTimer; MAX_ACTIONS],
    pub stacks: u8,
    pub last_action: Option<ActionId>,
    pub prev_action: Option<ActionId>,
    pub waste: WasteTally,
}

impl CraftState {
    /// Root state for a fresh craft.
    pub fn new(quality: i32, durability: i32, cp: i32) -> Self {
        Self {
            step: 0,
            progress: 0,
            quality,
            durability,
            cp,
            timers: [BuffTimer::default(); MAX_ACTIONS],
            stacks: 0,
            last_action: None,
            prev_action: None,
            waste: WasteTally::default(),
        }
    }

    /// Timer of the buff installed by `id`.
    #[inline]
    pub fn timer(&self, id: ActionId) -> BuffTimer {
        self.timers[id.index()]
    }

    #[inline]
    pub fn is_active(&self, id: ActionId) -> bool {
        self.timers[id.index()].is_active()
    }

    /// Ids of every currently active buff.
    pub fn active_buffs(&self) -> impl Iterator<Item = (ActionId, u8)> + '_ {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_active())
            .map(|(i, t)| (ActionId(i as u8), t.remaining))
    }

    /// True when durability and CP are both non-negative.
    pub fn is_alive(&self) -> bool {
        self.durability >= 0 && self.cp >= 0
    }

    pub fn key(&self) -> StateKey {
        StateKey::encode(self)
    }
}

impl fmt::Display for CraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} | progress {} | quality {} | durability {} | cp {} | stacks {}",
            self.step, self.progress, self.quality, self.durability, self.cp, self.stacks
        )
    }
}

#[cfg(test)]
mod tests;
