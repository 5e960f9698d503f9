//! A low-level craft small enough for every strategy to solve exactly.
//!
//! With flat base values of 200 progress and 200 quality, two Basic
//! Synthesis steps finish the 400 difficulty and two touches reach the
//! 400 quality target, spending exactly the 40 durability available.

use craftforge_core::standard::*;
use craftforge_core::{ActionId, ActorProfile, CraftContext, RecipeTarget};

/// Level 20 actor; Great Strides is listed but locked by level.
pub fn apprentice() -> ActorProfile {
    ActorProfile::new("Apprentice", 20, 180, 180, 150).with_actions([
        BASIC_SYNTHESIS,
        BASIC_TOUCH,
        MASTERS_MEND,
        OBSERVE,
        WASTE_NOT,
        VENERATION,
        STANDARD_TOUCH,
        GREAT_STRIDES,
    ])
}

pub fn recipe() -> RecipeTarget {
    RecipeTarget::new("Training Bread", 20, 400, 1000)
        .with_quality_target(400)
        .with_durability(40)
}

/// Apprentice on the training recipe with flat base values.
pub fn context() -> CraftContext {
    CraftContext::new(crate::catalog(), apprentice(), recipe())
        .map(|ctx| ctx.with_base_values(200, 200))
        .unwrap_or_else(|e| panic!("training fixture is invalid: {e}"))
}

/// One of the shortest perfect sequences.
pub fn perfect_sequence() -> Vec<ActionId> {
    vec![BASIC_TOUCH, BASIC_TOUCH, BASIC_SYNTHESIS, BASIC_SYNTHESIS]
}
