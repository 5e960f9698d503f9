//! Scalar desirability of a craft state.

use std::fmt;

use craftforge_core::{CraftContext, CraftState};

/// Returned for states that fail the baseline feasibility check.
///
/// Every feasible score is non-negative, so any comparison ranks
/// infeasible states last.
pub const INFEASIBLE: f64 = -1.0;

/// Quality may overshoot its target by this factor and still score.
pub const QUALITY_OVERSHOOT: f64 = 1.1;

/// Relative weights of the score terms.
///
/// Progress and quality weights must be positive to keep the score strictly
/// increasing in both; the headroom and brevity terms are small bonuses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub progress: f64,
    pub quality: f64,
    pub cp: f64,
    pub durability: f64,
    pub steps: f64,
    /// Step count at which the brevity bonus reaches zero.
    pub max_steps: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            progress: 1.0,
            quality: 1.0,
            cp: 0.05,
            durability: 0.05,
            steps: 0.02,
            max_steps: 40,
        }
    }
}

impl ScoreWeights {
    pub fn exhaustive() -> Self {
        Self::default()
    }

    /// Genetic search rewards short chromosomes a little more.
    pub fn genetic() -> Self {
        Self {
            cp: 0.03,
            durability: 0.03,
            steps: 0.05,
            ..Self::default()
        }
    }

    /// Beam search leans on quality and durability headroom to rank prefixes.
    pub fn beam() -> Self {
        Self {
            quality: 1.2,
            durability: 0.08,
            steps: 0.01,
            ..Self::default()
        }
    }

    pub fn branch_and_bound() -> Self {
        Self {
            cp: 0.08,
            durability: 0.08,
            ..Self::default()
        }
    }

    pub fn decompose() -> Self {
        Self {
            cp: 0.02,
            durability: 0.02,
            steps: 0.05,
            ..Self::default()
        }
    }
}

impl fmt::Display for ScoreWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "progress {} | quality {} | cp {} | durability {} | steps {} (max {})",
            self.progress, self.quality, self.cp, self.durability, self.steps, self.max_steps
        )
    }
}

/// Scores states of one craft.
///
/// Copies the normalisation constants it needs out of the context, so it is
/// `Copy` and can be handed to every worker.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    weights: ScoreWeights,
    difficulty: f64,
    quality_target: f64,
    max_cp: f64,
    max_durability: f64,
    durability_enabled: bool,
}

impl Scorer {
    pub fn new(ctx: &CraftContext, weights: ScoreWeights) -> Self {
        Self {
            weights,
            difficulty: ctx.difficulty() as f64,
            quality_target: ctx.quality_target() as f64,
            max_cp: ctx.actor().cp as f64,
            max_durability: ctx.recipe().max_durability as f64,
            durability_enabled: ctx.durability_enabled(),
        }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Returns the weighted score, or [`INFEASIBLE`].
    ///
    /// With `ignore_progress` an incomplete state still scores, with
    /// progress counted fractionally; this ranks prefixes during search.
    pub fn score(&self, state: &CraftState, ignore_progress: bool) -> f64 {
        if state.cp < 0
            || (self.durability_enabled && state.durability < 0)
            || (!ignore_progress && (state.progress as f64) < self.difficulty)
        {
            return INFEASIBLE;
        }

        let w = &self.weights;
        let progress = (state.progress as f64 / self.difficulty).min(1.0);
        let quality = (state.quality as f64 / self.quality_target).min(QUALITY_OVERSHOOT);
        let cp = if self.max_cp > 0.0 {
            (state.cp as f64 / self.max_cp).min(1.0)
        } else {
            0.0
        };
        let durability = if self.durability_enabled {
            (state.durability as f64 / self.max_durability).min(1.0)
        } else {
            0.0
        };
        let brevity = if w.max_steps > 0 {
            (1.0 - state.step as f64 / w.max_steps as f64).max(0.0)
        } else {
            0.0
        };

        w.progress * progress + w.quality * quality + w.cp * cp + w.durability * durability + w.steps * brevity
    }

    /// Score of a complete candidate.
    pub fn score_complete(&self, state: &CraftState) -> f64 {
        self.score(state, false)
    }

    /// Score of a possibly incomplete prefix.
    pub fn score_partial(&self, state: &CraftState) -> f64 {
        self.score(state, true)
    }

    pub fn is_complete(&self, state: &CraftState) -> bool {
        state.progress as f64 >= self.difficulty
    }

    pub fn is_perfect(&self, state: &CraftState) -> bool {
        self.is_complete(state) && state.quality as f64 >= self.quality_target
    }
}
