//! Deterministic single-step simulator.
//!
//! [`simulate`] applies one action to a state and either returns the
//! successor or the reason the action is illegal there. It never mutates
//! its input and holds no shared state, so any worker may call it freely.
//!
//! Within a step, effects apply in a fixed order: progress multiplier,
//! quality multiplier, accumulator gains, combo discount, durability,
//! stack counter, buff timers, then step and CP.

use thiserror::Error;

use crate::action::{ActionDescriptor, ActionEffect, ActionId};
use crate::context::CraftContext;
use crate::state::{BuffTimer, CraftState, WasteCause, MAX_STACKS};

/// Tolerance added before flooring gains.
///
/// Gains are `floor(base * efficiency * multiplier)` over exact decimals.
/// In `f64` some exact integers land just below themselves: `45 * 1.0 * 1.4`
/// evaluates to `62.999...`. The nudge keeps those at the decimal result.
/// No product of the catalog's one- or two-decimal factors sits within
/// `1e-9` below an integer without being that integer, so no other floor
/// moves.
const FLOOR_EPSILON: f64 = 1e-9;

/// Why an action cannot be applied to a state.
///
/// Expected and frequent; callers treat it as a pruned branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum IllegalStep {
    #[error("action is not in the catalog")]
    UnknownAction,
    #[error("actor level too low for this action")]
    LevelTooLow,
    #[error("progress already reached the target")]
    AlreadyComplete,
    #[error("durability already depleted")]
    DurabilityDepleted,
    #[error("not enough CP")]
    InsufficientCp,
    #[error("first-turn action after the first turn")]
    NotFirstTurn,
    #[error("not enough stacks")]
    InsufficientStacks,
    #[error("blocked while a conserve buff is active")]
    ConserveConflict,
    #[error("buff is still active")]
    BuffStillActive,
    #[error("durability already at maximum")]
    DurabilityFull,
    #[error("durability dropped below zero")]
    DurabilityExhausted,
    #[error("a buff expired without being used")]
    BuffExpiredUnused,
}

/// Index and reason of the first illegal step in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePoint {
    pub index: usize,
    pub reason: IllegalStep,
}

/// Result of folding a sequence until it fails.
#[derive(Debug, Clone)]
pub struct SequenceOutcome {
    /// State after the last legal action.
    pub state: CraftState,
    /// Number of actions applied.
    pub applied: usize,
    pub failure: Option<FailurePoint>,
}

impl SequenceOutcome {
    pub fn is_complete_run(&self) -> bool {
        self.failure.is_none()
    }
}

/// Applies `id` to `state`.
pub fn simulate(
    ctx: &CraftContext,
    state: &CraftState,
    id: ActionId,
) -> Result<CraftState, IllegalStep> {
    let action = ctx.action(id).ok_or(IllegalStep::UnknownAction)?;
    let durability_on = ctx.durability_enabled();

    let conserve = find_active(ctx, state, |e| e == ActionEffect::ConserveDurability);
    let free = find_active(ctx, state, |e| e == ActionEffect::NoDurabilityCost);
    let cp_cost = action.cost_after(state.prev_action, state.last_action);

    check_preconditions(ctx, state, action, cp_cost, conserve.is_some())?;

    let mut next = state.clone();

    let effective_cost = if action.durability_cost <= 0 || free.is_some() {
        0
    } else if conserve.is_some() {
        (action.durability_cost + 1) / 2
    } else {
        action.durability_cost
    };

    // Progress multiplier.
    let mut progress_mult = 0.0;
    if action.has_progress() {
        progress_mult = 1.0;
        if let Some(buff) = find_active(ctx, state, |e| e == ActionEffect::DoubleProgressNext) {
            progress_mult += 1.0;
            consume(&mut next, buff);
        }
        if let Some(buff) = find_active(ctx, state, |e| e == ActionEffect::ProgressBoost) {
            progress_mult += 0.5;
            trigger(&mut next, buff);
        }
        if action.weak_at_low_durability && durability_on && state.durability < effective_cost {
            progress_mult *= 0.5;
        }
    }

    // Quality multiplier.
    let mut quality_mult = 0.0;
    if action.quality > 0.0 {
        quality_mult = 1.0;
        if let Some(buff) = find_active(ctx, state, |e| e == ActionEffect::DoubleQualityNext) {
            quality_mult += 1.0;
            consume(&mut next, buff);
        }
        if let Some(buff) = find_active(ctx, state, |e| e == ActionEffect::QualityBoost) {
            quality_mult += 0.5;
            trigger(&mut next, buff);
        }
        if action.effect == ActionEffect::StackFinisher {
            if state.stacks == 0 {
                quality_mult = 0.0;
                next.waste.record(WasteCause::FinisherWithoutStacks);
            } else {
                quality_mult *= (1.0 + 0.2 * state.stacks as f64).min(3.0);
            }
        }
        quality_mult *= 1.0 + 0.1 * state.stacks as f64;
    }

    // Gains.
    let progress_gain =
        (ctx.base_progress() as f64 * action.progress * progress_mult + FLOOR_EPSILON).floor() as i32;
    let quality_gain = if action.effect == ActionEffect::MaxQuality {
        ctx.recipe().max_quality
    } else {
        (ctx.base_quality() as f64 * action.quality * quality_mult + FLOOR_EPSILON).floor() as i32
    };
    if action.has_quality() && state.quality >= ctx.recipe().max_quality {
        next.waste.record(WasteCause::QualityOverCap);
    }
    next.progress = (state.progress + progress_gain).min(ctx.difficulty());
    next.quality = (state.quality + quality_gain).min(ctx.recipe().max_quality);

    // Durability.
    if durability_on {
        let max = ctx.recipe().max_durability;
        let mut durability = state.durability;
        if action.durability_cost > 0 {
            if let Some(buff) = free {
                consume(&mut next, buff);
            } else if let Some(buff) = conserve {
                trigger(&mut next, buff);
            }
            durability -= effective_cost;
        }
        if let ActionEffect::RestoreDurability(amount) = action.effect {
            if durability + amount > max {
                next.waste.record(WasteCause::RestoreOverflow);
            }
            durability = (durability + amount).min(max);
        }
        if let Some(buff) = find_active(ctx, state, |e| matches!(e, ActionEffect::Regenerate(_))) {
            if buff != id && durability > 0 {
                if let Some(ActionEffect::Regenerate(amount)) = ctx.action(buff).map(|a| a.effect) {
                    durability = (durability + amount).min(max);
                }
                trigger(&mut next, buff);
            }
        }
        next.durability = durability;
    } else {
        for (buff, _) in state.active_buffs() {
            let is_durability_buff = ctx.action(buff).is_some_and(|a| a.effect.is_durability());
            if is_durability_buff && buff != id && !next.timers[buff.index()].triggered {
                trigger(&mut next, buff);
            }
        }
    }

    // Stack counter.
    let stacks = match action.effect {
        ActionEffect::StackFinisher => 0,
        ActionEffect::StackSeed(n) => n,
        ActionEffect::StackBuilder(n) => state.stacks.saturating_add(n),
        _ if action.quality > 0.0 => state.stacks.saturating_add(1),
        _ => state.stacks,
    };
    next.stacks = stacks.min(MAX_STACKS);

    // Buff timers.
    let completes = next.progress >= ctx.difficulty();
    for (index, timer) in next.timers.iter_mut().enumerate() {
        if action.is_count_down() && index == id.index() {
            continue;
        }
        if timer.triggered {
            timer.triggered = false;
        } else if timer.remaining > 0 {
            timer.remaining -= 1;
            if timer.remaining == 0 && !completes {
                return Err(IllegalStep::BuffExpiredUnused);
            }
        }
    }
    if action.is_count_down() {
        next.timers[id.index()] = BuffTimer {
            remaining: action.active_turns,
            triggered: false,
        };
    }

    // Step and CP.
    next.step += 1;
    next.cp = (state.cp - cp_cost).min(ctx.actor().cp);
    next.prev_action = state.last_action;
    next.last_action = Some(id);

    if durability_on && next.durability < 0 {
        return Err(IllegalStep::DurabilityExhausted);
    }

    Ok(next)
}

fn check_preconditions(
    ctx: &CraftContext,
    state: &CraftState,
    action: &ActionDescriptor,
    cp_cost: i32,
    conserve_active: bool,
) -> Result<(), IllegalStep> {
    if state.progress >= ctx.difficulty() {
        return Err(IllegalStep::AlreadyComplete);
    }
    if !ctx.can_use(action) {
        return Err(IllegalStep::LevelTooLow);
    }
    if ctx.durability_enabled() && state.durability <= 0 {
        return Err(IllegalStep::DurabilityDepleted);
    }
    if state.cp < cp_cost {
        return Err(IllegalStep::InsufficientCp);
    }
    if action.first_turn_only && state.step > 0 {
        return Err(IllegalStep::NotFirstTurn);
    }
    if state.stacks < action.min_stacks {
        return Err(IllegalStep::InsufficientStacks);
    }
    if action.blocked_by_conserve && conserve_active {
        return Err(IllegalStep::ConserveConflict);
    }
    if let ActionEffect::RestoreDurability(_) = action.effect {
        if ctx.durability_enabled() && state.durability >= ctx.recipe().max_durability {
            return Err(IllegalStep::DurabilityFull);
        }
    }
    if action.is_count_down() && state.is_active(action.id) && !action.renewable {
        return Err(IllegalStep::BuffStillActive);
    }
    Ok(())
}

/// First active buff whose effect satisfies `pred`.
fn find_active(
    ctx: &CraftContext,
    state: &CraftState,
    pred: impl Fn(ActionEffect) -> bool,
) -> Option<ActionId> {
    state
        .active_buffs()
        .map(|(id, _)| id)
        .find(|id| ctx.action(*id).is_some_and(|a| pred(a.effect)))
}

/// Uses one turn of a buff now; bookkeeping will not decrement it again.
fn trigger(state: &mut CraftState, buff: ActionId) {
    let timer = &mut state.timers[buff.index()];
    if timer.triggered || timer.remaining == 0 {
        return;
    }
    timer.remaining -= 1;
    timer.triggered = true;
}

/// Removes a one-shot buff.
fn consume(state: &mut CraftState, buff: ActionId) {
    state.timers[buff.index()] = BuffTimer::default();
}

/// Folds `actions` from `start`.
pub fn simulate_from(
    ctx: &CraftContext,
    start: &CraftState,
    actions: &[ActionId],
) -> Result<CraftState, FailurePoint> {
    let mut state = start.clone();
    for (index, &id) in actions.iter().enumerate() {
        state = simulate(ctx, &state, id).map_err(|reason| FailurePoint { index, reason })?;
    }
    Ok(state)
}

/// Folds `actions` from the initial state, `None` on the first illegal step.
pub fn simulate_sequence(ctx: &CraftContext, actions: &[ActionId]) -> Option<CraftState> {
    simulate_from(ctx, &ctx.initial_state(), actions).ok()
}

/// Folds `actions` from the initial state, stopping at the first illegal step.
pub fn simulate_to_failure(ctx: &CraftContext, actions: &[ActionId]) -> SequenceOutcome {
    let mut state = ctx.initial_state();
    for (index, &id) in actions.iter().enumerate() {
        match simulate(ctx, &state, id) {
            Ok(next) => state = next,
            Err(reason) => {
                return SequenceOutcome {
                    state,
                    applied: index,
                    failure: Some(FailurePoint { index, reason }),
                }
            }
        }
    }
    SequenceOutcome {
        state,
        applied: actions.len(),
        failure: None,
    }
}
