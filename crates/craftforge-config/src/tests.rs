//! Tests for solver and problem configuration.

use std::sync::Arc;
use std::time::Duration;

use craftforge_core::standard::{BASIC_SYNTHESIS, BASIC_TOUCH, TRAINED_EYE};
use craftforge_core::ActionCatalog;

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        random_seed = 42
        thread_count = { count = 4 }

        [termination]
        seconds_spent_limit = 30
        node_count_limit = 1000000

        [strategy]
        type = "genetic"
        population_size = 120
        improvement_epsilon = 0.001
    "#;

    let config = SolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.random_seed, Some(42));
    assert_eq!(config.thread_count, WorkerThreadCount::Count(4));
    let termination = config.termination.clone().unwrap();
    assert_eq!(termination.seconds_spent_limit, Some(30));
    assert_eq!(termination.node_count_limit, Some(1_000_000));
    match config.strategy {
        StrategyConfig::Genetic(ref g) => {
            assert_eq!(g.population_size, 120);
            assert_eq!(g.improvement_epsilon, 0.001);
            assert_eq!(g.generations, 100);
        }
        ref other => panic!("unexpected strategy {other:?}"),
    }
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        random_seed: 42
        thread_count: none
        termination:
          minutes_spent_limit: 2
        strategy:
          type: decompose
          max_quality_length: 10
        weights:
          quality: 2.0
    "#;

    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.random_seed, Some(42));
    assert_eq!(config.thread_count, WorkerThreadCount::None);
    assert_eq!(config.time_limit(), Some(Duration::from_secs(120)));
    assert!(matches!(config.strategy, StrategyConfig::Decompose(ref d) if d.max_quality_length == 10));
    let weights = config.weights.unwrap();
    assert_eq!(weights.quality, Some(2.0));
    assert_eq!(weights.cp, None);
}

#[test]
fn test_defaults() {
    let config = SolverConfig::from_toml_str("").unwrap();
    assert_eq!(config.random_seed, None);
    assert_eq!(config.thread_count, WorkerThreadCount::Auto);
    assert!(config.time_limit().is_none());
    assert!(matches!(config.strategy, StrategyConfig::Beam(ref b) if b.beam_width == 8));
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder() {
    let config = SolverConfig::new()
        .with_random_seed(123)
        .with_termination_seconds(60)
        .with_thread_count(WorkerThreadCount::Count(2))
        .with_strategy(StrategyConfig::Exhaustive(ExhaustiveConfig::default()));

    assert_eq!(config.random_seed, Some(123));
    assert_eq!(config.time_limit(), Some(Duration::from_secs(60)));
    assert_eq!(config.strategy.name(), "Exhaustive");
}

#[test]
fn test_time_limit_combines_units() {
    let termination = TerminationConfig {
        seconds_spent_limit: Some(30),
        minutes_spent_limit: Some(1),
        node_count_limit: None,
    };
    assert_eq!(termination.time_limit(), Some(Duration::from_secs(90)));
    assert_eq!(TerminationConfig::default().time_limit(), None);
}

#[test]
fn test_validation_rejects_bad_values() {
    let bad_retreat = SolverConfig::new().with_strategy(StrategyConfig::BranchAndBound(
        BranchAndBoundConfig {
            window_length: 3,
            retreat: 3,
            ..Default::default()
        },
    ));
    assert!(matches!(bad_retreat.validate(), Err(ConfigError::Invalid(_))));

    let bad_rates = SolverConfig::new().with_strategy(StrategyConfig::Genetic(GeneticConfig {
        parent_a_rate: 0.7,
        parent_b_rate: 0.7,
        ..Default::default()
    }));
    assert!(bad_rates.validate().is_err());

    let zero_threads = SolverConfig::new().with_thread_count(WorkerThreadCount::Count(0));
    assert!(zero_threads.validate().is_err());

    let zero_beam = SolverConfig::new().with_strategy(StrategyConfig::Beam(BeamConfig {
        beam_width: 0,
        ..Default::default()
    }));
    assert!(zero_beam.validate().is_err());
}

#[test]
fn test_unknown_strategy_is_a_parse_error() {
    let err = SolverConfig::from_toml_str("[strategy]\ntype = \"annealing\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_missing_file() {
    let err = SolverConfig::load("/nonexistent/craft-solver.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

const PROBLEM: &str = r#"
    [actor]
    name = "Apprentice"
    level = 90
    craftsmanship = 1000
    control = 900
    cp = 400
    actions = ["Basic Synthesis", "basic_touch", "TRAINED EYE"]

    [recipe]
    name = "Training Bread"
    level = 80
    difficulty = 1200
    max_quality = 3000
    durability = 60
    quality_target = 2500
"#;

#[test]
fn test_problem_resolves_names() {
    let problem = ProblemConfig::from_toml_str(PROBLEM).unwrap();
    let ctx = problem
        .into_context(Arc::new(ActionCatalog::standard()))
        .unwrap();

    assert_eq!(ctx.actor().name, "Apprentice");
    assert_eq!(ctx.recipe().max_durability, 60);
    assert_eq!(ctx.quality_target(), 2500);
    // Trained Eye needs a ten-level mastery margin, which 90 over 80 meets.
    assert_eq!(ctx.allowed(), &[BASIC_SYNTHESIS, BASIC_TOUCH, TRAINED_EYE]);
    // floor(1000 * 10 / 50 + 2) = 202
    assert_eq!(ctx.base_progress(), 202);
}

#[test]
fn test_problem_yaml_and_defaults() {
    let yaml = r#"
        actor:
          level: 10
          craftsmanship: 100
          control: 100
          cp: 180
        recipe:
          level: 10
          difficulty: 300
          max_quality: 800
          durability: 40
          progress_modifier: 80
    "#;
    let problem = ProblemConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(problem.actor.name, "Crafter");
    let recipe = problem.recipe.clone().into_target();
    assert_eq!(recipe.progress_modifier, 80.0);
    assert_eq!(recipe.quality_modifier, 100.0);

    let ctx = problem
        .into_context(Arc::new(ActionCatalog::standard()))
        .unwrap();
    // Empty action list grants the catalog, minus the level gate.
    assert!(ctx.allowed().contains(&BASIC_SYNTHESIS));
    assert!(ctx.allowed().iter().all(|id| ctx.action(*id).unwrap().level <= 10));
}

#[test]
fn test_problem_unknown_action() {
    let toml = PROBLEM.replace("TRAINED EYE", "Hasty Touch");
    let err = ProblemConfig::from_toml_str(&toml)
        .unwrap()
        .into_context(Arc::new(ActionCatalog::standard()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Craft(_)));
}
