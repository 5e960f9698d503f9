//! A level 90 actor with the whole catalog on a durability-tight recipe.

use craftforge_core::{ActorProfile, CraftContext, RecipeTarget};

pub fn veteran() -> ActorProfile {
    let actions = crate::catalog().iter().map(|a| a.id).collect::<Vec<_>>();
    ActorProfile::new("Veteran", 90, 2500, 2500, 500).with_actions(actions)
}

/// Needs several progress steps and more durability than it starts with.
pub fn recipe() -> RecipeTarget {
    RecipeTarget::new("Masterwork Ingot", 80, 1500, 5000)
        .with_quality_target(2000)
        .with_durability(40)
}

/// Veteran on the masterwork recipe with base values 200 / 150.
pub fn context() -> CraftContext {
    CraftContext::new(crate::catalog(), veteran(), recipe())
        .map(|ctx| ctx.with_base_values(200, 150))
        .unwrap_or_else(|e| panic!("veteran fixture is invalid: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftforge_core::standard::{TRAINED_EYE, TRAINED_PERFECTION};

    #[test]
    fn test_veteran_unlocks_mastery_but_not_level_100() {
        let ctx = context();
        assert!(ctx.is_allowed(TRAINED_EYE));
        assert!(!ctx.is_allowed(TRAINED_PERFECTION));
    }
}
