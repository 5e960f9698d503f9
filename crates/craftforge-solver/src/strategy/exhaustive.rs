//! Fixed-depth exhaustive enumeration.
//!
//! Sequences are numbered in base K (K allowed actions), most significant
//! digit first, and visited in index order like an odometer. When the
//! action at position `p` fails or completes the craft, every index that
//! shares digits `0..=p` is skipped in one jump of `K^(depth-1-p)`.
//! Intermediate states are cached per position, so only the suffix that
//! changed between two indices is re-simulated.

use std::time::Instant;

use tracing::debug;

use craftforge_config::ExhaustiveConfig;
use craftforge_core::{ActionId, CraftContext, CraftState};
use craftforge_scoring::{ScoreWeights, Scorer};

use super::{step, Strategy};
use crate::error::{SolveError, SolveResult};
use crate::scope::SearchScope;

/// Enumerates every sequence up to a fixed depth.
#[derive(Debug, Clone)]
pub struct ExhaustiveSearch {
    config: ExhaustiveConfig,
    weights: ScoreWeights,
}

impl ExhaustiveSearch {
    pub fn new(config: ExhaustiveConfig) -> Self {
        Self {
            config,
            weights: ScoreWeights::exhaustive(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &ExhaustiveConfig {
        &self.config
    }
}

impl Default for ExhaustiveSearch {
    fn default() -> Self {
        Self::new(ExhaustiveConfig::default())
    }
}

/// Number of sequences of length `depth` over `k` actions.
pub(crate) fn space_size(k: usize, depth: usize) -> Option<u128> {
    let depth = u32::try_from(depth).ok()?;
    (k as u128).checked_pow(depth)
}

/// Indices covered by one digit at `pos`.
pub(crate) fn stride(k: usize, depth: usize, pos: usize) -> u128 {
    (k as u128).pow((depth - 1 - pos) as u32)
}

/// First index after the aligned block of `stride` containing `index`.
pub(crate) fn skip_past(index: u128, stride: u128) -> u128 {
    index - index % stride + stride
}

/// Writes the base-`k` digits of `index` into `digits`, most significant first.
pub(crate) fn decode(mut index: u128, k: usize, digits: &mut [usize]) {
    let k = k as u128;
    for digit in digits.iter_mut().rev() {
        *digit = (index % k) as usize;
        index /= k;
    }
}

impl Strategy for ExhaustiveSearch {
    fn name(&self) -> &'static str {
        "Exhaustive"
    }

    fn validate(&self, ctx: &CraftContext) -> SolveResult<()> {
        if self.config.max_depth == 0 {
            return Err(SolveError::Setup("exhaustive depth must be at least 1".into()));
        }
        if space_size(ctx.allowed().len(), self.config.max_depth).is_none() {
            return Err(SolveError::Setup(format!(
                "{} actions to depth {} overflows the odometer",
                ctx.allowed().len(),
                self.config.max_depth
            )));
        }
        Ok(())
    }

    fn solve(&mut self, scope: &SearchScope<'_>) -> SolveResult<()> {
        let ctx = scope.ctx();
        let allowed = ctx.allowed();
        let k = allowed.len();
        let depth = self.config.max_depth;
        if k == 0 || depth == 0 {
            return Ok(());
        }
        let total = space_size(k, depth)
            .ok_or_else(|| SolveError::Setup("exhaustive search space overflows".into()))?;
        let scorer = Scorer::new(ctx, self.weights);

        let mut digits = vec![0usize; depth];
        let mut scratch = vec![0usize; depth];
        let mut states: Vec<CraftState> = Vec::with_capacity(depth + 1);
        states.push(ctx.initial_state());
        let mut cached = 0usize;
        let mut index: u128 = 0;
        let mut simulated: u64 = 0;
        let mut visited: u64 = 0;
        let mut last_progress = Instant::now();

        while index < total {
            if visited % 1024 == 0 {
                if scope.should_terminate() {
                    break;
                }
                if last_progress.elapsed().as_secs() >= 1 {
                    debug!(
                        event = "progress",
                        strategy = "Exhaustive",
                        index = index,
                        total = total,
                        simulated = simulated,
                    );
                    last_progress = Instant::now();
                }
            }
            if self.config.node_limit.is_some_and(|limit| simulated >= limit) {
                break;
            }
            visited += 1;
            scope.statistics().record_expanded();

            states.truncate(cached + 1);
            let mut next = index + 1;
            for pos in cached..depth {
                let id = allowed[digits[pos]];
                simulated += 1;
                match step(scope, ctx, &states[pos], id) {
                    Err(_) => {
                        next = skip_past(index, stride(k, depth, pos));
                        break;
                    }
                    Ok(state) if ctx.is_complete(&state) => {
                        let sequence: Vec<ActionId> =
                            digits[..=pos].iter().map(|&d| allowed[d]).collect();
                        scope.offer(&sequence, &state, scorer.score_complete(&state));
                        next = skip_past(index, stride(k, depth, pos));
                        break;
                    }
                    Ok(state) => states.push(state),
                }
            }

            if next >= total {
                index = total;
                break;
            }
            decode(next, k, &mut scratch);
            let changed = digits
                .iter()
                .zip(&scratch)
                .position(|(a, b)| a != b)
                .unwrap_or(depth);
            digits.copy_from_slice(&scratch);
            cached = changed.min(states.len() - 1);
            index = next;
        }

        debug!(
            event = "exhaustive_done",
            visited = visited,
            simulated = simulated,
            exhausted = index >= total,
        );
        Ok(())
    }
}
