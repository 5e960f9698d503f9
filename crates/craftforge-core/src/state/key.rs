//! Compact fixed-width encoding of a craft state for deduplication.
//!
//! Layout:
//! - word 0: progress (24 bits) | quality (24) | durability (16)
//! - word 1: cp (16) | step (16) | stacks (4) | last action + 1 (6) | previous action + 1 (6)
//! - words 2-3: 32 buff timers, 4 bits each
//!
//! Only live states between steps are encoded, so every value is
//! non-negative and no timer carries a triggered flag. The waste tally is
//! diagnostic and not part of the key.

use crate::action::{ActionId, MAX_ACTIONS};

use super::{BuffTimer, CraftState};

const MASK_24: u64 = (1 << 24) - 1;
const MASK_16: u64 = (1 << 16) - 1;
const MASK_6: u64 = (1 << 6) - 1;
const MASK_4: u64 = (1 << 4) - 1;

/// Largest progress or quality value that survives encoding.
pub const MAX_ENCODED_ACCUMULATOR: i32 = MASK_24 as i32;
/// Largest durability, CP or step value that survives encoding.
pub const MAX_ENCODED_RESOURCE: i32 = MASK_16 as i32;

/// Hashable compact form of a [`CraftState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(pub [u64; 4]);

impl StateKey {
    pub fn encode(state: &CraftState) -> Self {
        let word0 = clamp(state.progress, MASK_24)
            | (clamp(state.quality, MASK_24) << 24)
            | (clamp(state.durability, MASK_16) << 48);

        let word1 = clamp(state.cp, MASK_16)
            | ((state.step as u64 & MASK_16) << 16)
            | ((state.stacks as u64 & MASK_4) << 32)
            | (action_bits(state.last_action) << 36)
            | (action_bits(state.prev_action) << 42);

        let mut timers = [0u64; 2];
        for (i, timer) in state.timers.iter().enumerate() {
            let word = i / 16;
            let shift = (i % 16) * 4;
            timers[word] |= (timer.remaining as u64 & MASK_4) << shift;
        }

        Self([word0, word1, timers[0], timers[1]])
    }

    pub fn decode(&self) -> CraftState {
        let [word0, word1, t0, t1] = self.0;

        let mut timers = [BuffTimer::default(); MAX_ACTIONS];
        for (i, timer) in timers.iter_mut().enumerate() {
            let word = if i < 16 { t0 } else { t1 };
            let shift = (i % 16) * 4;
            timer.remaining = ((word >> shift) & MASK_4) as u8;
        }

        CraftState {
            step: ((word1 >> 16) & MASK_16) as u32,
            progress: (word0 & MASK_24) as i32,
            quality: ((word0 >> 24) & MASK_24) as i32,
            durability: ((word0 >> 48) & MASK_16) as i32,
            cp: (word1 & MASK_16) as i32,
            timers,
            stacks: ((word1 >> 32) & MASK_4) as u8,
            last_action: action_from_bits(word1 >> 36),
            prev_action: action_from_bits(word1 >> 42),
            waste: Default::default(),
        }
    }
}

#[inline]
fn clamp(value: i32, mask: u64) -> u64 {
    (value.max(0) as u64).min(mask)
}

#[inline]
fn action_bits(action: Option<ActionId>) -> u64 {
    action.map_or(0, |a| (a.0 as u64 + 1) & MASK_6)
}

#[inline]
fn action_from_bits(bits: u64) -> Option<ActionId> {
    match bits & MASK_6 {
        0 => None,
        n => Some(ActionId((n - 1) as u8)),
    }
}
