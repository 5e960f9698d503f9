//! Decompose and merge.
//!
//! Progress and quality rarely interact beyond CP and durability, so each
//! half is searched alone with durability accounting switched off. Quality
//! lists only get the CP left after the cheapest progress list and the
//! durability repairs that list needs on its own. The cheapest progress lists and the strongest quality lists are then paired,
//! interleaved in every order that keeps first-turn actions first and ends
//! on progress, and replayed with durability on. Interleavings that run out
//! of durability get durability actions inserted before the failure.

use std::collections::HashSet;

use tracing::debug;

use craftforge_config::DecomposeConfig;
use craftforge_core::{
    simulate_to_failure, ActionDescriptor, ActionEffect, ActionId, CraftContext, CraftState,
    IllegalStep, StateKey,
};
use craftforge_scoring::{AuditChain, ScoreWeights, Scorer};

use super::{step, Strategy};
use crate::error::{SolveError, SolveResult};
use crate::scope::SearchScope;

/// Interleavings tried between termination checks.
const CHECK_INTERVAL: u64 = 256;

/// One half of a decomposed plan.
#[derive(Debug, Clone)]
pub(crate) struct HalfPlan {
    pub(crate) actions: Vec<ActionId>,
    pub(crate) state: CraftState,
    /// CP actually spent, combos included.
    pub(crate) cp: i32,
    pub(crate) durability_cost: i32,
}

/// Which half a sub-search explores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Half {
    Progress,
    Quality,
}

/// Bounded depth-first search inside one half.
struct Subspace<'s, 'a> {
    scope: &'s SearchScope<'a>,
    ctx: CraftContext,
    chain: AuditChain,
    half: Half,
    max_length: usize,
    node_limit: usize,
    visited: HashSet<StateKey>,
    plans: Vec<HalfPlan>,
}

impl Subspace<'_, '_> {
    fn run(&mut self) -> Vec<HalfPlan> {
        let start = self.ctx.initial_state();
        let mut path = Vec::with_capacity(self.max_length);
        if self.half == Half::Quality {
            self.record(&path, &start);
        }
        self.descend(&start, &mut path);
        std::mem::take(&mut self.plans)
    }

    fn descend(&mut self, state: &CraftState, path: &mut Vec<ActionId>) {
        if path.len() >= self.max_length
            || self.visited.len() >= self.node_limit
            || self.scope.should_terminate()
        {
            return;
        }
        self.scope.statistics().record_expanded();
        let allowed = self.ctx.allowed().to_vec();
        for id in allowed {
            let Ok(next) = step(self.scope, &self.ctx, state, id) else {
                continue;
            };
            path.push(id);
            if self.chain.passes(path, &self.ctx, self.scope.audit_stats()) {
                let complete = self.ctx.is_complete(&next);
                match self.half {
                    Half::Progress if complete => self.record(path, &next),
                    Half::Quality if !complete => self.record(path, &next),
                    _ => {}
                }
                if !complete && self.visited.insert(next.key()) {
                    self.descend(&next, path);
                }
            }
            path.pop();
        }
    }

    fn record(&mut self, path: &[ActionId], state: &CraftState) {
        let durability_cost = path
            .iter()
            .filter_map(|&id| self.ctx.action(id))
            .map(|a| a.durability_cost.max(0))
            .sum();
        self.plans.push(HalfPlan {
            actions: path.to_vec(),
            state: state.clone(),
            cp: self.ctx.actor().cp - state.cp,
            durability_cost,
        });
    }
}

/// Splits the allowed set into its progress and quality halves.
///
/// Observe joins a half only when that half holds a requires-observe action.
pub(crate) fn split_actions(ctx: &CraftContext) -> (Vec<ActionId>, Vec<ActionId>) {
    let pick = |belongs: fn(&ActionDescriptor) -> bool| {
        let mut ids: Vec<ActionId> = ctx
            .allowed()
            .iter()
            .copied()
            .filter(|&id| ctx.action(id).is_some_and(belongs))
            .collect();
        let needs_observe = ids
            .iter()
            .any(|&id| ctx.action(id).is_some_and(|a| a.requires_observe));
        if needs_observe {
            ids.extend(
                ctx.allowed()
                    .iter()
                    .copied()
                    .filter(|&id| ctx.action(id).is_some_and(|a| a.effect == ActionEffect::Observe)),
            );
        }
        ids
    };
    (
        pick(ActionDescriptor::is_progress_action),
        pick(ActionDescriptor::is_quality_action),
    )
}

/// Cheapest declared CP that restores `deficit` durability, if any action can.
pub(crate) fn repair_reserve(ctx: &CraftContext, deficit: i32) -> Option<i32> {
    if deficit <= 0 {
        return Some(0);
    }
    ctx.allowed()
        .iter()
        .filter_map(|&id| ctx.action(id))
        .filter_map(|a| {
            let per_use = match a.effect {
                ActionEffect::RestoreDurability(amount) => amount,
                ActionEffect::Regenerate(amount) => amount * i32::from(a.active_turns),
                _ => return None,
            };
            (per_use > 0).then(|| (deficit + per_use - 1) / per_use * a.cp_cost)
        })
        .min()
}

/// Next integer with the same number of set bits.
pub(crate) fn next_combination(x: u64) -> u64 {
    let lowest = x & x.wrapping_neg();
    let ripple = x + lowest;
    (((ripple ^ x) >> 2) / lowest) | ripple
}

/// Masks over `len` positions with `ones` progress slots, the last one set.
pub(crate) fn interleavings(len: usize, ones: usize) -> impl Iterator<Item = u64> {
    let free = len.saturating_sub(1);
    let pick = ones.saturating_sub(1);
    let end = 1u64 << free;
    let last = 1u64 << free;
    let mut current = if pick == 0 { Some(0) } else { Some((1u64 << pick) - 1) };
    std::iter::from_fn(move || {
        let mask = current?;
        current = if pick == 0 {
            None
        } else {
            let next = next_combination(mask);
            (next < end).then_some(next)
        };
        Some(mask | last)
    })
}

pub(crate) fn merge(progress: &[ActionId], quality: &[ActionId], mask: u64) -> Vec<ActionId> {
    let mut p = progress.iter();
    let mut q = quality.iter();
    (0..progress.len() + quality.len())
        .filter_map(|i| {
            if mask & (1 << i) != 0 {
                p.next().copied()
            } else {
                q.next().copied()
            }
        })
        .collect()
}

fn is_durability_failure(reason: IllegalStep) -> bool {
    matches!(
        reason,
        IllegalStep::DurabilityDepleted | IllegalStep::DurabilityExhausted
    )
}

/// Pairs one progress list with every quality list.
struct Merger<'s, 'a> {
    scope: &'s SearchScope<'a>,
    scorer: Scorer,
    config: &'s DecomposeConfig,
    repairs: Vec<ActionId>,
}

impl Merger<'_, '_> {
    fn merge_all(&self, progress: &HalfPlan, qualities: &[HalfPlan]) -> u64 {
        let ctx = self.scope.ctx();
        let first_turn = |id: ActionId| ctx.action(id).is_some_and(|a| a.first_turn_only);
        let mut tried = 0u64;

        for quality in qualities {
            let deficit = progress.durability_cost + quality.durability_cost
                - ctx.recipe().start_durability;
            let Some(reserve) = repair_reserve(ctx, deficit) else {
                continue;
            };
            if progress.cp + quality.cp + reserve > ctx.actor().cp {
                continue;
            }

            let need_progress_first = progress.actions.first().is_some_and(|&id| first_turn(id));
            let need_quality_first = quality.actions.first().is_some_and(|&id| first_turn(id));
            if need_progress_first && need_quality_first {
                continue;
            }

            let len = progress.actions.len() + quality.actions.len();
            let masks = interleavings(len, progress.actions.len())
                .filter(|mask| {
                    let leads_progress = mask & 1 != 0;
                    (!need_progress_first || leads_progress)
                        && (!need_quality_first || !leads_progress)
                })
                .take(self.config.max_interleavings as usize);

            for mask in masks {
                tried += 1;
                if tried % CHECK_INTERVAL == 0 && self.scope.should_terminate() {
                    return tried;
                }
                let merged = merge(&progress.actions, &quality.actions, mask);
                self.try_sequence(merged, 0);
            }
        }
        tried
    }

    /// Replays `sequence`, offering it or repairing its durability.
    fn try_sequence(&self, sequence: Vec<ActionId>, depth: usize) -> Option<usize> {
        let ctx = self.scope.ctx();
        let outcome = simulate_to_failure(ctx, &sequence);
        self.scope
            .statistics()
            .record_simulated((outcome.applied + usize::from(outcome.failure.is_some())) as u64);

        if ctx.is_complete(&outcome.state) {
            let score = self.scorer.score_complete(&outcome.state);
            self.scope
                .offer(&sequence[..outcome.applied], &outcome.state, score);
            return None;
        }
        let failure = outcome.failure?;
        if !is_durability_failure(failure.reason) {
            return None;
        }
        if depth < self.config.repair_depth {
            self.repair(&sequence, failure.index, depth);
        }
        Some(failure.index)
    }

    /// Inserts each durability action at each point up to `failed_at`.
    ///
    /// Recurses on the insertion that pushes the failure furthest.
    fn repair(&self, sequence: &[ActionId], failed_at: usize, depth: usize) {
        let ctx = self.scope.ctx();
        let mut furthest: Option<(usize, Vec<ActionId>)> = None;

        for &repair in &self.repairs {
            for at in 0..=failed_at.min(sequence.len()) {
                let mut patched = Vec::with_capacity(sequence.len() + 1);
                patched.extend_from_slice(&sequence[..at]);
                patched.push(repair);
                patched.extend_from_slice(&sequence[at..]);

                let outcome = simulate_to_failure(ctx, &patched);
                self.scope.statistics().record_simulated(
                    (outcome.applied + usize::from(outcome.failure.is_some())) as u64,
                );
                if ctx.is_complete(&outcome.state) {
                    let score = self.scorer.score_complete(&outcome.state);
                    self.scope
                        .offer(&patched[..outcome.applied], &outcome.state, score);
                    continue;
                }
                let Some(failure) = outcome.failure else {
                    continue;
                };
                let improved = is_durability_failure(failure.reason)
                    && failure.index > failed_at + 1
                    && furthest.as_ref().map_or(true, |(index, _)| failure.index > *index);
                if improved {
                    furthest = Some((failure.index, patched));
                }
            }
        }

        if let Some((_, patched)) = furthest {
            self.try_sequence(patched, depth + 1);
        }
    }
}

/// Searches progress and quality separately, then merges.
#[derive(Debug, Clone)]
pub struct DecomposeSearch {
    config: DecomposeConfig,
    weights: ScoreWeights,
}

impl DecomposeSearch {
    pub fn new(config: DecomposeConfig) -> Self {
        Self {
            config,
            weights: ScoreWeights::decompose(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &DecomposeConfig {
        &self.config
    }

    /// Plans of one half spending at most `cp_cap` CP.
    pub(crate) fn search_half(
        &self,
        scope: &SearchScope<'_>,
        ids: &[ActionId],
        half: Half,
        cp_cap: i32,
    ) -> Vec<HalfPlan> {
        let ctx = scope
            .ctx()
            .without_durability()
            .restrict_to(ids)
            .with_cp_limit(cp_cap);
        let (chain, max_length) = match half {
            Half::Progress => (AuditChain::progress_only(), self.config.max_progress_length),
            Half::Quality => (AuditChain::quality_only(), self.config.max_quality_length),
        };
        let mut search = Subspace {
            scope,
            ctx,
            chain,
            half,
            max_length,
            node_limit: self.config.subspace_node_limit,
            visited: HashSet::new(),
            plans: Vec::new(),
        };
        search.run()
    }
}

impl Default for DecomposeSearch {
    fn default() -> Self {
        Self::new(DecomposeConfig::default())
    }
}

impl Strategy for DecomposeSearch {
    fn name(&self) -> &'static str {
        "Decompose"
    }

    fn validate(&self, _ctx: &CraftContext) -> SolveResult<()> {
        if self.config.max_progress_length == 0 {
            return Err(SolveError::Setup("progress lists need at least one action".into()));
        }
        if self.config.max_progress_length + self.config.max_quality_length > 63 {
            return Err(SolveError::Setup(
                "merged sequences must fit a 64-bit interleaving mask".into(),
            ));
        }
        Ok(())
    }

    fn solve(&mut self, scope: &SearchScope<'_>) -> SolveResult<()> {
        self.validate(scope.ctx())?;
        let ctx = scope.ctx();
        let (progress_ids, quality_ids) = split_actions(ctx);
        if progress_ids.is_empty() {
            return Ok(());
        }

        let budget = ctx.actor().cp;
        let start_durability = ctx.recipe().start_durability;
        // CP a progress list needs before any quality action is added.
        let floor_of = |plan: &HalfPlan| {
            repair_reserve(ctx, plan.durability_cost - start_durability).map(|r| plan.cp + r)
        };

        // The empty quality list always merges, so progress gets the full pool.
        let mut progress = self.search_half(scope, &progress_ids, Half::Progress, budget);
        progress.retain(|plan| floor_of(plan).is_some_and(|floor| floor <= budget));
        progress.sort_by(|a, b| {
            a.cp.cmp(&b.cp)
                .then_with(|| a.actions.len().cmp(&b.actions.len()))
                .then_with(|| a.actions.cmp(&b.actions))
        });
        progress.truncate(self.config.progress_candidates);

        let Some(floor) = progress.iter().filter_map(floor_of).min() else {
            return Ok(());
        };
        let mut quality = self.search_half(scope, &quality_ids, Half::Quality, budget - floor);
        let cap = f64::from(ctx.quality_target()) * 1.1;
        let capped = |plan: &HalfPlan| f64::from(plan.state.quality).min(cap);
        quality.sort_by(|a, b| {
            capped(b)
                .total_cmp(&capped(a))
                .then_with(|| a.cp.cmp(&b.cp))
                .then_with(|| a.actions.len().cmp(&b.actions.len()))
                .then_with(|| a.actions.cmp(&b.actions))
        });
        quality.truncate(self.config.quality_candidates);

        debug!(
            event = "decompose_halves",
            progress_lists = progress.len(),
            quality_lists = quality.len(),
            quality_cp = budget - floor,
        );
        scope.log_with(|| {
            format!(
                "merging {} progress lists with {} quality lists",
                progress.len(),
                quality.len()
            )
        });
        let merger = Merger {
            scope,
            scorer: Scorer::new(ctx, self.weights),
            config: &self.config,
            repairs: ctx
                .allowed()
                .iter()
                .copied()
                .filter(|&id| ctx.action(id).is_some_and(|a| a.is_durability_action()))
                .collect(),
        };
        let qualities = &quality;
        let tried: u64 = scope
            .pool()
            .map(progress, |plan| {
                if scope.should_terminate() {
                    return 0;
                }
                merger.merge_all(&plan, qualities)
            })
            .into_iter()
            .sum();

        debug!(event = "decompose_done", interleavings = tried);
        Ok(())
    }
}
