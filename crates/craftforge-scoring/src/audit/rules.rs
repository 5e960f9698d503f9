use std::mem::discriminant;

use craftforge_core::{
    simulate_to_failure, ActionDescriptor, ActionEffect, ActionId, CraftContext, MAX_ACTIONS,
};

use super::{Audit, AuditKind};

/// Every action is in the actor's allowed set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowedActions;

impl Audit for AllowedActions {
    fn kind(&self) -> AuditKind {
        AuditKind::AllowedActions
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        sequence.iter().all(|&id| ctx.is_allowed(id))
    }
}

/// No count-down buff is cast twice in immediate succession.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRepeatedBuff;

impl Audit for NoRepeatedBuff {
    fn kind(&self) -> AuditKind {
        AuditKind::NoRepeatedBuff
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        sequence.windows(2).all(|pair| {
            pair[0] != pair[1] || !ctx.action(pair[0]).is_some_and(|a| a.is_count_down())
        })
    }
}

/// At most one stack finisher, and only after something built the stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinisherDiscipline;

fn builds_stack(action: &ActionDescriptor) -> bool {
    match action.effect {
        ActionEffect::StackFinisher => false,
        ActionEffect::StackSeed(_) | ActionEffect::StackBuilder(_) => true,
        _ => action.quality > 0.0,
    }
}

impl Audit for FinisherDiscipline {
    fn kind(&self) -> AuditKind {
        AuditKind::FinisherDiscipline
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        let mut built = false;
        let mut finished = false;
        for &id in sequence {
            let Some(action) = ctx.action(id) else {
                return false;
            };
            if action.effect == ActionEffect::StackFinisher {
                if finished || !built {
                    return false;
                }
                finished = true;
                built = false;
            } else if builds_stack(action) {
                built = true;
            }
        }
        true
    }
}

/// Observe and its dependants come in adjacent pairs.
///
/// A requires-observe action must directly follow Observe, and Observe must
/// directly precede a requires-observe action. Sequence edges can be relaxed
/// for prefixes and for windows that will be stitched to neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationPrecedes {
    /// A requires-observe action may open the sequence.
    pub allow_leading: bool,
    /// Observe may close the sequence.
    pub allow_trailing: bool,
}

impl ObservationPrecedes {
    pub fn strict() -> Self {
        Self {
            allow_leading: false,
            allow_trailing: false,
        }
    }

    pub fn open_ended() -> Self {
        Self {
            allow_leading: false,
            allow_trailing: true,
        }
    }

    pub fn window() -> Self {
        Self {
            allow_leading: true,
            allow_trailing: true,
        }
    }
}

impl Audit for ObservationPrecedes {
    fn kind(&self) -> AuditKind {
        AuditKind::ObservationPrecedes
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        let is_observe = |id: ActionId| {
            ctx.action(id)
                .is_some_and(|a| a.effect == ActionEffect::Observe)
        };
        let needs_observe = |id: ActionId| ctx.action(id).is_some_and(|a| a.requires_observe);

        for (i, &id) in sequence.iter().enumerate() {
            if needs_observe(id) {
                let preceded = if i == 0 {
                    self.allow_leading
                } else {
                    is_observe(sequence[i - 1])
                };
                if !preceded {
                    return false;
                }
            }
            if is_observe(id) {
                let followed = match sequence.get(i + 1) {
                    Some(&next) => needs_observe(next),
                    None => self.allow_trailing,
                };
                if !followed {
                    return false;
                }
            }
        }
        true
    }
}

/// The final action contributes progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndsOnProgress;

impl Audit for EndsOnProgress {
    fn kind(&self) -> AuditKind {
        AuditKind::EndsOnProgress
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        sequence
            .last()
            .and_then(|&id| ctx.action(id))
            .is_some_and(|a| a.has_progress())
    }
}

/// Combo-aware declared CP cost fits the actor's pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpBudget;

impl Audit for CpBudget {
    fn kind(&self) -> AuditKind {
        AuditKind::CpBudget
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        let mut prev = None;
        let mut last = None;
        let mut total = 0i64;
        for &id in sequence {
            let Some(action) = ctx.action(id) else {
                return false;
            };
            total += action.cost_after(prev, last) as i64;
            prev = last;
            last = Some(id);
        }
        total <= ctx.actor().cp as i64
    }
}

/// Optimistic durability trace never runs dry before the end.
///
/// Tracks conserve, free-cost and regeneration windows by their declared
/// lengths and assumes regeneration always lands. A sequence this rejects
/// is certainly illegal; one it accepts may still fail in simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurabilityBudget;

impl Audit for DurabilityBudget {
    fn kind(&self) -> AuditKind {
        AuditKind::DurabilityBudget
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        if !ctx.durability_enabled() {
            return true;
        }

        let max = ctx.recipe().max_durability;
        let mut durability = ctx.recipe().start_durability;
        let mut windows = [0u8; MAX_ACTIONS];

        for &id in sequence {
            let Some(action) = ctx.action(id) else {
                return false;
            };
            if durability <= 0 {
                return false;
            }

            let active = |effect: fn(&ActionEffect) -> bool| {
                windows.iter().enumerate().find_map(|(i, &turns)| {
                    let buff = ctx.action(ActionId(i as u8))?;
                    (turns > 0 && effect(&buff.effect)).then_some(buff)
                })
            };
            let free = active(|e| *e == ActionEffect::NoDurabilityCost).map(|a| a.id);
            let conserve = active(|e| *e == ActionEffect::ConserveDurability).is_some();
            let regen = active(|e| matches!(e, ActionEffect::Regenerate(_))).and_then(|a| {
                match a.effect {
                    ActionEffect::Regenerate(amount) if a.id != id => Some(amount),
                    _ => None,
                }
            });

            let mut cost = action.durability_cost;
            if cost > 0 {
                if let Some(buff) = free {
                    windows[buff.index()] = 0;
                    cost = 0;
                } else if conserve {
                    cost = (cost + 1) / 2;
                }
            }
            durability -= cost;
            if let ActionEffect::RestoreDurability(amount) = action.effect {
                durability = (durability + amount).min(max);
            }
            if let Some(amount) = regen {
                durability = (durability + amount).min(max);
            }
            if durability < 0 {
                return false;
            }

            for (i, turns) in windows.iter_mut().enumerate() {
                if *turns > 0 && i != id.index() {
                    *turns -= 1;
                }
            }
            if action.is_count_down() {
                windows[id.index()] = action.active_turns;
            }
        }
        true
    }
}

/// Simulating the sequence wastes no action.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWastedActions;

impl Audit for NoWastedActions {
    fn kind(&self) -> AuditKind {
        AuditKind::NoWastedActions
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        simulate_to_failure(ctx, sequence).state.waste.is_empty()
    }
}

/// Forbids listed adjacent pairs.
///
/// In derived mode it also forbids two different buffs with the same
/// effect back to back, and two durability restores back to back.
#[derive(Debug, Clone, Default)]
pub struct NoBannedPairs {
    pairs: Vec<(ActionId, ActionId)>,
    derive_from_catalog: bool,
}

impl NoBannedPairs {
    pub fn new(pairs: Vec<(ActionId, ActionId)>) -> Self {
        Self {
            pairs,
            derive_from_catalog: false,
        }
    }

    pub fn derived() -> Self {
        Self {
            pairs: Vec::new(),
            derive_from_catalog: true,
        }
    }

    pub fn with_pair(mut self, first: ActionId, second: ActionId) -> Self {
        self.pairs.push((first, second));
        self
    }

    fn derived_ban(a: &ActionDescriptor, b: &ActionDescriptor) -> bool {
        if a.is_buff() && b.is_buff() && discriminant(&a.effect) == discriminant(&b.effect) {
            return true;
        }
        matches!(a.effect, ActionEffect::RestoreDurability(_))
            && matches!(b.effect, ActionEffect::RestoreDurability(_))
    }
}

impl Audit for NoBannedPairs {
    fn kind(&self) -> AuditKind {
        AuditKind::NoBannedPairs
    }

    fn check(&self, sequence: &[ActionId], ctx: &CraftContext) -> bool {
        sequence.windows(2).all(|pair| {
            let (first, second) = (pair[0], pair[1]);
            if self.pairs.contains(&(first, second)) {
                return false;
            }
            if !self.derive_from_catalog {
                return true;
            }
            match (ctx.action(first), ctx.action(second)) {
                (Some(a), Some(b)) => !Self::derived_ban(a, b),
                _ => false,
            }
        })
    }
}
