//! Builder module for constructing solver components from configuration
//!
//! This module provides the wiring between configuration types and the
//! strategies and terminations that run a search.

use craftforge_config::{StrategyConfig, TerminationConfig, WeightsConfig};
use craftforge_scoring::ScoreWeights;

use crate::strategy::{
    BeamSearch, BranchAndBound, DecomposeSearch, ExhaustiveSearch, GeneticSearch, Strategy,
};
use crate::termination::{NodeCountTermination, Termination, TimeTermination};

/// Builder for constructing strategies from configuration.
pub struct StrategyBuilder;

impl StrategyBuilder {
    /// Builds a strategy with its preset weights and any overrides applied.
    pub fn build(config: &StrategyConfig, weights: Option<&WeightsConfig>) -> Box<dyn Strategy> {
        match config {
            StrategyConfig::Exhaustive(c) => Box::new(
                ExhaustiveSearch::new(c.clone())
                    .with_weights(apply_weights(ScoreWeights::exhaustive(), weights)),
            ),
            StrategyConfig::Genetic(c) => Box::new(
                GeneticSearch::new(c.clone())
                    .with_weights(apply_weights(ScoreWeights::genetic(), weights)),
            ),
            StrategyConfig::Beam(c) => Box::new(
                BeamSearch::new(c.clone()).with_weights(apply_weights(ScoreWeights::beam(), weights)),
            ),
            StrategyConfig::BranchAndBound(c) => Box::new(
                BranchAndBound::new(c.clone())
                    .with_weights(apply_weights(ScoreWeights::branch_and_bound(), weights)),
            ),
            StrategyConfig::Decompose(c) => Box::new(
                DecomposeSearch::new(c.clone())
                    .with_weights(apply_weights(ScoreWeights::decompose(), weights)),
            ),
        }
    }
}

/// Overlays configured weights on a preset.
pub fn apply_weights(mut preset: ScoreWeights, overrides: Option<&WeightsConfig>) -> ScoreWeights {
    let Some(o) = overrides else {
        return preset;
    };
    if let Some(v) = o.progress {
        preset.progress = v;
    }
    if let Some(v) = o.quality {
        preset.quality = v;
    }
    if let Some(v) = o.cp {
        preset.cp = v;
    }
    if let Some(v) = o.durability {
        preset.durability = v;
    }
    if let Some(v) = o.steps {
        preset.steps = v;
    }
    if let Some(v) = o.max_steps {
        preset.max_steps = v;
    }
    preset
}

/// Builder for constructing terminations from configuration.
pub struct TerminationBuilder;

impl TerminationBuilder {
    /// One termination per configured limit.
    pub fn build(config: Option<&TerminationConfig>) -> Vec<Box<dyn Termination>> {
        let mut terminations: Vec<Box<dyn Termination>> = Vec::new();
        let Some(config) = config else {
            return terminations;
        };
        if let Some(limit) = config.time_limit() {
            terminations.push(Box::new(TimeTermination::new(limit)));
        }
        if let Some(limit) = config.node_count_limit {
            terminations.push(Box::new(NodeCountTermination::new(limit)));
        }
        terminations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftforge_config::{BeamConfig, DecomposeConfig, GeneticConfig};

    #[test]
    fn test_strategy_builder_names() {
        let cases = [
            (StrategyConfig::Beam(BeamConfig::default()), "Beam"),
            (StrategyConfig::Genetic(GeneticConfig::default()), "Genetic"),
            (StrategyConfig::Decompose(DecomposeConfig::default()), "Decompose"),
        ];
        for (config, name) in cases {
            assert_eq!(StrategyBuilder::build(&config, None).name(), name);
        }
    }

    #[test]
    fn test_apply_weights_overrides_only_set_fields() {
        let preset = ScoreWeights::beam();
        let overrides = WeightsConfig {
            quality: Some(3.0),
            max_steps: Some(12),
            ..WeightsConfig::default()
        };
        let merged = apply_weights(preset, Some(&overrides));
        assert_eq!(merged.quality, 3.0);
        assert_eq!(merged.max_steps, 12);
        assert_eq!(merged.progress, preset.progress);
        assert_eq!(merged.cp, preset.cp);
        assert_eq!(apply_weights(preset, None), preset);
    }

    #[test]
    fn test_termination_builder() {
        assert!(TerminationBuilder::build(None).is_empty());

        let config = TerminationConfig {
            seconds_spent_limit: Some(5),
            node_count_limit: Some(1000),
            ..TerminationConfig::default()
        };
        assert_eq!(TerminationBuilder::build(Some(&config)).len(), 2);

        let empty = TerminationConfig::default();
        assert!(TerminationBuilder::build(Some(&empty)).is_empty());
    }
}
