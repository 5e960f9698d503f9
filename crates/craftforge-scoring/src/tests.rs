//! Tests for the scoring function.

use std::sync::Arc;

use proptest::prelude::*;

use craftforge_core::standard::*;
use craftforge_core::{simulate_sequence, ActionCatalog, ActorProfile, CraftContext, RecipeTarget};

use super::*;

fn context() -> CraftContext {
    let actor = ActorProfile::new("Tester", 90, 1000, 1000, 400)
        .with_actions([BASIC_SYNTHESIS, BASIC_TOUCH, VENERATION, INNOVATION]);
    let recipe = RecipeTarget::new("Test", 80, 1000, 2000)
        .with_durability(60)
        .with_quality_target(1000);
    CraftContext::new(Arc::new(ActionCatalog::standard()), actor, recipe)
        .unwrap()
        .with_base_values(200, 100)
}

#[test]
fn test_incomplete_state_is_infeasible_unless_ignored() {
    let ctx = context();
    let scorer = Scorer::new(&ctx, ScoreWeights::default());
    let state = simulate_sequence(&ctx, &[BASIC_SYNTHESIS]).unwrap();

    assert_eq!(scorer.score(&state, false), INFEASIBLE);
    assert!(scorer.score(&state, true) > 0.0);
}

#[test]
fn test_negative_resources_are_infeasible() {
    let ctx = context();
    let scorer = Scorer::new(&ctx, ScoreWeights::default());
    let mut state = ctx.initial_state();
    state.cp = -1;
    assert_eq!(scorer.score_partial(&state), INFEASIBLE);

    let mut state = ctx.initial_state();
    state.durability = -5;
    assert_eq!(scorer.score_partial(&state), INFEASIBLE);

    let relaxed = Scorer::new(&ctx.without_durability(), ScoreWeights::default());
    assert!(relaxed.score_partial(&state) >= 0.0);
}

#[test]
fn test_complete_state_scores() {
    let ctx = context();
    let scorer = Scorer::new(&ctx, ScoreWeights::default());
    let state = simulate_sequence(
        &ctx,
        &[
            BASIC_TOUCH,
            BASIC_SYNTHESIS,
            BASIC_SYNTHESIS,
            BASIC_SYNTHESIS,
            BASIC_SYNTHESIS,
            BASIC_SYNTHESIS,
        ],
    )
    .unwrap();
    assert!(scorer.is_complete(&state));
    assert!(!scorer.is_perfect(&state));
    assert!(scorer.score_complete(&state) > 1.0);
}

#[test]
fn test_perfect_detection() {
    let ctx = context();
    let scorer = Scorer::new(&ctx, ScoreWeights::default());
    let mut state = ctx.initial_state();
    state.progress = ctx.difficulty();
    state.quality = ctx.quality_target();
    assert!(scorer.is_perfect(&state));
    assert!(ctx.is_perfect(&state));

    state.quality -= 1;
    assert!(!scorer.is_perfect(&state));
}

#[test]
fn test_quality_overshoot_is_capped() {
    let ctx = context();
    let scorer = Scorer::new(&ctx, ScoreWeights::default());
    let mut a = ctx.initial_state();
    a.progress = ctx.difficulty();
    a.quality = 1100;
    let mut b = a.clone();
    b.quality = 1500;
    assert_eq!(scorer.score_complete(&a), scorer.score_complete(&b));

    let mut c = a.clone();
    c.quality = 1050;
    assert!(scorer.score_complete(&a) > scorer.score_complete(&c));
}

#[test]
fn test_presets_keep_accumulator_weights_positive() {
    for weights in [
        ScoreWeights::exhaustive(),
        ScoreWeights::genetic(),
        ScoreWeights::beam(),
        ScoreWeights::branch_and_bound(),
        ScoreWeights::decompose(),
    ] {
        assert!(weights.progress > 0.0);
        assert!(weights.quality > 0.0);
        assert!(weights.cp >= 0.0 && weights.durability >= 0.0 && weights.steps >= 0.0);
    }
}

proptest! {
    #[test]
    fn prop_score_increases_with_progress(
        progress in 0i32..999,
        bump in 1i32..500,
        quality in 0i32..2000,
        cp in 0i32..=400,
        durability in 0i32..=60,
    ) {
        let ctx = context();
        let scorer = Scorer::new(&ctx, ScoreWeights::beam());
        let mut low = ctx.initial_state();
        low.progress = progress;
        low.quality = quality;
        low.cp = cp;
        low.durability = durability;
        let mut high = low.clone();
        high.progress = (progress + bump).min(ctx.difficulty());

        prop_assert!(scorer.score_partial(&high) > scorer.score_partial(&low));
    }

    #[test]
    fn prop_score_never_decreases_with_headroom(
        progress in 0i32..=1000,
        cp in 0i32..400,
        durability in 0i32..60,
    ) {
        let ctx = context();
        let scorer = Scorer::new(&ctx, ScoreWeights::default());
        let mut base = ctx.initial_state();
        base.progress = progress;
        base.cp = cp;
        base.durability = durability;
        let mut richer = base.clone();
        richer.cp += 1;
        richer.durability += 1;

        prop_assert!(scorer.score_partial(&richer) >= scorer.score_partial(&base));
    }
}
