//! Action descriptors and the closed catalog they live in.
//!
//! Every action is identified by a small dense [`ActionId`], which doubles
//! as an index into per-state timer arrays and per-catalog lookup tables.

mod catalog;
pub mod standard;

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::CraftError;

pub use catalog::ActionCatalog;

/// Maximum number of actions a catalog may hold.
///
/// Bounded by the fixed timer array in [`CraftState`](crate::CraftState)
/// and by the 4-bit-per-timer packing in [`StateKey`](crate::StateKey).
pub const MAX_ACTIONS: usize = 32;

/// Longest count-down duration a descriptor may declare.
pub const MAX_ACTIVE_TURNS: u8 = 15;

/// Stable small integer identity of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u8);

impl ActionId {
    /// Returns the id as an array index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an action interacts with time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimingClass {
    /// Takes effect immediately and leaves nothing behind.
    #[default]
    Instant,
    /// Feeds the accumulating stack counter.
    CountUp,
    /// Installs a buff that lasts a fixed number of further actions.
    CountDown,
}

impl FromStr for TimingClass {
    type Err = CraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "instant" => Ok(Self::Instant),
            "countup" => Ok(Self::CountUp),
            "countdown" => Ok(Self::CountDown),
            _ => Err(CraftError::UnknownTimingClass(s.to_string())),
        }
    }
}

impl fmt::Display for TimingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingClass::Instant => write!(f, "instant"),
            TimingClass::CountUp => write!(f, "count-up"),
            TimingClass::CountDown => write!(f, "count-down"),
        }
    }
}

/// Special behaviour attached to an action.
///
/// Buff effects apply while the action's own count-down timer is active;
/// the others apply on the step the action is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionEffect {
    #[default]
    None,
    /// +1 progress multiplier on the next progress action, then consumed.
    DoubleProgressNext,
    /// +0.5 progress multiplier while active.
    ProgressBoost,
    /// +1 quality multiplier on the next quality action, then consumed.
    DoubleQualityNext,
    /// +0.5 quality multiplier while active.
    QualityBoost,
    /// Halves durability cost (rounded up) while active.
    ConserveDurability,
    /// Zeroes the next durability cost, then consumed.
    NoDurabilityCost,
    /// Restores the given durability after each step while active.
    Regenerate(i32),
    /// Restores the given durability immediately.
    RestoreDurability(i32),
    /// Consumes the stack counter for a scaled quality gain.
    StackFinisher,
    /// Sets the stack counter to the given value.
    StackSeed(u8),
    /// Adds the given amount to the stack counter.
    StackBuilder(u8),
    /// Quality gain equals the recipe's maximum quality.
    MaxQuality,
    /// Enables the next requires-observe action.
    Observe,
}

impl ActionEffect {
    /// Effects that alter durability accounting.
    pub fn is_durability(&self) -> bool {
        matches!(
            self,
            ActionEffect::ConserveDurability
                | ActionEffect::NoDurabilityCost
                | ActionEffect::Regenerate(_)
                | ActionEffect::RestoreDurability(_)
        )
    }

    /// Effects consumed by the first action that benefits from them.
    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            ActionEffect::DoubleProgressNext
                | ActionEffect::DoubleQualityNext
                | ActionEffect::NoDurabilityCost
        )
    }
}

/// Cost discount applied when the immediately preceding actions match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboRule {
    /// Required predecessors, oldest first.
    pub predecessors: SmallVec<[ActionId; 2]>,
    /// CP cost when the chain matches.
    pub cost: i32,
}

impl ComboRule {
    pub fn new(predecessors: &[ActionId], cost: i32) -> Self {
        Self {
            predecessors: SmallVec::from_slice(predecessors),
            cost,
        }
    }

    /// Returns true if `prev` then `last` (most recent) complete the chain.
    pub fn matches(&self, prev: Option<ActionId>, last: Option<ActionId>) -> bool {
        match self.predecessors.as_slice() {
            [only] => last == Some(*only),
            [first, second] => prev == Some(*first) && last == Some(*second),
            _ => false,
        }
    }
}

/// Immutable description of one action.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDescriptor {
    pub id: ActionId,
    pub name: String,
    pub level: u32,
    pub cp_cost: i32,
    pub durability_cost: i32,
    pub progress: f64,
    pub quality: f64,
    pub timing: TimingClass,
    /// Declared duration for count-down actions, zero otherwise.
    pub active_turns: u8,
    pub success_rate: f64,
    pub effect: ActionEffect,
    pub first_turn_only: bool,
    pub requires_observe: bool,
    pub min_stacks: u8,
    pub combo: Option<ComboRule>,
    /// May be re-cast while its own buff is still active.
    pub renewable: bool,
    /// Illegal while a conserve buff is active.
    pub blocked_by_conserve: bool,
    /// Halved progress when durability is below the action's cost.
    pub weak_at_low_durability: bool,
    /// Only usable when the actor out-levels the recipe's mastery band.
    pub requires_mastery: bool,
}

impl ActionDescriptor {
    /// Creates an instant action with no cost beyond CP.
    pub fn new(id: u8, name: impl Into<String>, level: u32, cp_cost: i32) -> Self {
        Self {
            id: ActionId(id),
            name: name.into(),
            level,
            cp_cost,
            durability_cost: 0,
            progress: 0.0,
            quality: 0.0,
            timing: TimingClass::Instant,
            active_turns: 0,
            success_rate: 1.0,
            effect: ActionEffect::None,
            first_turn_only: false,
            requires_observe: false,
            min_stacks: 0,
            combo: None,
            renewable: false,
            blocked_by_conserve: false,
            weak_at_low_durability: false,
            requires_mastery: false,
        }
    }

    pub fn with_durability(mut self, cost: i32) -> Self {
        self.durability_cost = cost;
        self
    }

    pub fn with_progress(mut self, multiplier: f64) -> Self {
        self.progress = multiplier;
        self
    }

    pub fn with_quality(mut self, multiplier: f64) -> Self {
        self.quality = multiplier;
        self
    }

    pub fn with_effect(mut self, effect: ActionEffect) -> Self {
        self.effect = effect;
        match effect {
            ActionEffect::StackSeed(_) | ActionEffect::StackBuilder(_) => {
                if self.timing == TimingClass::Instant {
                    self.timing = TimingClass::CountUp;
                }
            }
            _ => {}
        }
        self
    }

    /// Makes this a count-down action lasting `turns` further actions.
    pub fn count_down(mut self, turns: u8) -> Self {
        self.timing = TimingClass::CountDown;
        self.active_turns = turns;
        self
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.success_rate = rate;
        self
    }

    pub fn first_turn_only(mut self) -> Self {
        self.first_turn_only = true;
        self
    }

    pub fn requires_observe(mut self) -> Self {
        self.requires_observe = true;
        self
    }

    pub fn with_min_stacks(mut self, stacks: u8) -> Self {
        self.min_stacks = stacks;
        self
    }

    pub fn with_combo(mut self, predecessors: &[ActionId], cost: i32) -> Self {
        self.combo = Some(ComboRule::new(predecessors, cost));
        self
    }

    pub fn renewable(mut self) -> Self {
        self.renewable = true;
        self
    }

    pub fn blocked_by_conserve(mut self) -> Self {
        self.blocked_by_conserve = true;
        self
    }

    pub fn weak_at_low_durability(mut self) -> Self {
        self.weak_at_low_durability = true;
        self
    }

    pub fn requires_mastery(mut self) -> Self {
        self.requires_mastery = true;
        self
    }

    #[inline]
    pub fn is_count_down(&self) -> bool {
        self.timing == TimingClass::CountDown
    }

    #[inline]
    pub fn has_progress(&self) -> bool {
        self.progress > 0.0
    }

    #[inline]
    pub fn has_quality(&self) -> bool {
        self.quality > 0.0 || self.effect == ActionEffect::MaxQuality
    }

    /// A count-down action that changes neither accumulator by itself.
    pub fn is_buff(&self) -> bool {
        self.is_count_down() && !self.has_progress() && !self.has_quality()
    }

    /// Actions that exist only to manage durability.
    pub fn is_durability_action(&self) -> bool {
        self.effect.is_durability() && !self.has_progress() && !self.has_quality()
    }

    /// Belongs to the progress half of a decomposed search.
    pub fn is_progress_action(&self) -> bool {
        self.has_progress()
            || matches!(
                self.effect,
                ActionEffect::ProgressBoost | ActionEffect::DoubleProgressNext
            )
    }

    /// Belongs to the quality half of a decomposed search.
    pub fn is_quality_action(&self) -> bool {
        (self.has_quality() && !self.has_progress())
            || matches!(
                self.effect,
                ActionEffect::QualityBoost
                    | ActionEffect::DoubleQualityNext
                    | ActionEffect::StackSeed(_)
            )
    }

    /// Declared CP cost after applying a combo discount, if any.
    pub fn cost_after(&self, prev: Option<ActionId>, last: Option<ActionId>) -> i32 {
        match &self.combo {
            Some(rule) if rule.matches(prev, last) => rule.cost,
            _ => self.cp_cost,
        }
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests;
