//! Read-only bundle of everything a simulation needs.

use std::sync::Arc;

use crate::action::{ActionCatalog, ActionDescriptor, ActionId};
use crate::error::{CraftError, Result};
use crate::profile::{ActorProfile, RecipeTarget};
use crate::state::{CraftState, MAX_ENCODED_ACCUMULATOR, MAX_ENCODED_RESOURCE};

/// Catalog, actor and recipe for one run, plus derived values.
///
/// Cheap to clone: the catalog is shared.
#[derive(Debug, Clone)]
pub struct CraftContext {
    catalog: Arc<ActionCatalog>,
    actor: ActorProfile,
    recipe: RecipeTarget,
    base_progress: i32,
    base_quality: i32,
    durability_enabled: bool,
    allowed: Vec<ActionId>,
    allowed_mask: u32,
}

impl CraftContext {
    /// Validates the pairing and derives base gains and the allowed set.
    ///
    /// # Errors
    ///
    /// Fails if the actor names an action outside the catalog, or a value
    /// exceeds what [`StateKey`](crate::StateKey) can encode.
    pub fn new(
        catalog: Arc<ActionCatalog>,
        actor: ActorProfile,
        recipe: RecipeTarget,
    ) -> Result<Self> {
        check_range("recipe.difficulty", recipe.difficulty, 1, MAX_ENCODED_ACCUMULATOR)?;
        check_range("recipe.max_quality", recipe.max_quality, 1, MAX_ENCODED_ACCUMULATOR)?;
        check_range("recipe.start_quality", recipe.start_quality, 0, recipe.max_quality)?;
        check_range("recipe.quality_target", recipe.target_quality(), 1, MAX_ENCODED_ACCUMULATOR)?;
        check_range("recipe.max_durability", recipe.max_durability, 1, MAX_ENCODED_RESOURCE)?;
        check_range("recipe.start_durability", recipe.start_durability, 1, recipe.max_durability)?;
        check_range("actor.cp", actor.cp, 0, MAX_ENCODED_RESOURCE)?;
        if recipe.progress_divider <= 0.0 {
            return Err(CraftError::OutOfRange {
                field: "recipe.progress_divider",
                value: recipe.progress_divider as i64,
            });
        }
        if recipe.quality_divider <= 0.0 {
            return Err(CraftError::OutOfRange {
                field: "recipe.quality_divider",
                value: recipe.quality_divider as i64,
            });
        }

        for id in &actor.actions {
            catalog.require(*id)?;
        }

        let base_progress = ((actor.craftsmanship as f64 * 10.0 / recipe.progress_divider + 2.0)
            * recipe.progress_modifier
            / 100.0)
            .floor() as i32;
        let base_quality = ((actor.control as f64 * 10.0 / recipe.quality_divider + 35.0)
            * recipe.quality_modifier
            / 100.0)
            .floor() as i32;

        let mut ctx = Self {
            catalog,
            actor,
            recipe,
            base_progress,
            base_quality,
            durability_enabled: true,
            allowed: Vec::new(),
            allowed_mask: 0,
        };
        let allowed: Vec<ActionId> = ctx.actor.actions.clone();
        ctx.set_allowed(allowed);
        Ok(ctx)
    }

    /// Overrides the derived base gains.
    pub fn with_base_values(mut self, progress: i32, quality: i32) -> Self {
        self.base_progress = progress;
        self.base_quality = quality;
        self
    }

    /// A copy that skips durability accounting entirely.
    pub fn without_durability(&self) -> Self {
        let mut ctx = self.clone();
        ctx.durability_enabled = false;
        ctx
    }

    /// A copy whose CP pool is lowered to `cp`, never raised.
    pub fn with_cp_limit(&self, cp: i32) -> Self {
        let mut ctx = self.clone();
        ctx.actor.cp = cp.clamp(0, self.actor.cp);
        ctx
    }

    /// A copy whose allowed set is narrowed to `ids`.
    pub fn restrict_to(&self, ids: &[ActionId]) -> Self {
        let mut ctx = self.clone();
        let narrowed: Vec<ActionId> = self
            .allowed
            .iter()
            .copied()
            .filter(|id| ids.contains(id))
            .collect();
        ctx.set_allowed(narrowed);
        ctx
    }

    /// A copy with effectively unlimited CP, progress and quality headroom.
    ///
    /// Used to check short action windows for internal consistency without
    /// the craft completing or running dry partway through.
    pub fn sandbox(&self) -> Self {
        let mut ctx = self.clone();
        ctx.recipe.difficulty = MAX_ENCODED_ACCUMULATOR / 2;
        ctx.recipe.max_quality = MAX_ENCODED_ACCUMULATOR / 2;
        ctx.recipe.quality_target = None;
        ctx.recipe.start_quality = 0;
        ctx.recipe.max_durability = 10_000;
        ctx.recipe.start_durability = 5_000;
        ctx.actor.cp = 60_000;
        ctx
    }

    fn set_allowed(&mut self, ids: Vec<ActionId>) {
        let mut allowed: Vec<ActionId> = ids
            .into_iter()
            .filter(|id| self.catalog.get(*id).is_some_and(|a| self.can_use(a)))
            .collect();
        allowed.sort_unstable();
        allowed.dedup();
        self.allowed_mask = allowed.iter().fold(0u32, |m, id| m | (1 << id.0));
        self.allowed = allowed;
    }

    /// Level and mastery gate for a descriptor.
    pub fn can_use(&self, action: &ActionDescriptor) -> bool {
        if self.actor.level < action.level {
            return false;
        }
        !action.requires_mastery
            || self.actor.level >= self.recipe.level + self.recipe.mastery_band
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<ActionCatalog> {
        Arc::clone(&self.catalog)
    }

    #[inline]
    pub fn action(&self, id: ActionId) -> Option<&ActionDescriptor> {
        self.catalog.get(id)
    }

    pub fn actor(&self) -> &ActorProfile {
        &self.actor
    }

    pub fn recipe(&self) -> &RecipeTarget {
        &self.recipe
    }

    #[inline]
    pub fn base_progress(&self) -> i32 {
        self.base_progress
    }

    #[inline]
    pub fn base_quality(&self) -> i32 {
        self.base_quality
    }

    #[inline]
    pub fn durability_enabled(&self) -> bool {
        self.durability_enabled
    }

    /// Actions this actor may take, sorted by id.
    pub fn allowed(&self) -> &[ActionId] {
        &self.allowed
    }

    #[inline]
    pub fn is_allowed(&self, id: ActionId) -> bool {
        id.0 < 32 && self.allowed_mask & (1 << id.0) != 0
    }

    pub fn difficulty(&self) -> i32 {
        self.recipe.difficulty
    }

    pub fn quality_target(&self) -> i32 {
        self.recipe.target_quality()
    }

    pub fn initial_state(&self) -> CraftState {
        CraftState::new(
            self.recipe.start_quality,
            self.recipe.start_durability,
            self.actor.cp,
        )
    }

    /// Progress has reached the target.
    pub fn is_complete(&self, state: &CraftState) -> bool {
        state.progress >= self.recipe.difficulty
    }

    /// Both progress and quality have reached their targets.
    pub fn is_perfect(&self, state: &CraftState) -> bool {
        self.is_complete(state) && state.quality >= self.quality_target()
    }
}

fn check_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<()> {
    if value < min || value > max {
        return Err(CraftError::OutOfRange {
            field,
            value: value as i64,
        });
    }
    Ok(())
}
