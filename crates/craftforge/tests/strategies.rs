//! Every strategy, wired from configuration, on the training craft.

use craftforge::prelude::*;
use craftforge::{simulate_sequence, WorkerThreadCount};
use craftforge_test::training;

fn solve(strategy: StrategyConfig, threads: WorkerThreadCount) -> Solution {
    let ctx = training::context();
    let config = SolverConfig::new()
        .with_random_seed(11)
        .with_thread_count(threads)
        .with_strategy(strategy);
    let mut solver = CraftSolver::from_config(&config).unwrap();
    let solution = solver.solve(&ctx).unwrap().expect("a complete sequence");

    let replayed = simulate_sequence(&ctx, solution.actions()).unwrap();
    assert_eq!(&replayed, solution.state());
    assert!(ctx.is_complete(&replayed));
    solution
}

#[test]
fn test_exhaustive_is_perfect() {
    let solution = solve(
        StrategyConfig::Exhaustive(ExhaustiveConfig {
            max_depth: 4,
            node_limit: None,
        }),
        WorkerThreadCount::Count(2),
    );
    assert!(solution.is_perfect());
    assert_eq!(solution.len(), 4);
    assert_eq!(solution.strategy(), "Exhaustive");
}

#[test]
fn test_genetic_completes() {
    let solution = solve(
        StrategyConfig::Genetic(GeneticConfig {
            population_size: 200,
            generations: 100,
            max_length: 8,
            ..GeneticConfig::default()
        }),
        WorkerThreadCount::Count(2),
    );
    assert_eq!(solution.strategy(), "Genetic");
}

#[test]
fn test_beam_completes() {
    let solution = solve(
        StrategyConfig::Beam(BeamConfig {
            exhaust_discrepancies: true,
            max_discrepancies: 2,
            ..BeamConfig::default()
        }),
        WorkerThreadCount::None,
    );
    assert_eq!(solution.strategy(), "Beam");
}

#[test]
fn test_branch_and_bound_completes() {
    let solution = solve(
        StrategyConfig::BranchAndBound(BranchAndBoundConfig {
            window_length: 3,
            retreat: 1,
            ..BranchAndBoundConfig::default()
        }),
        WorkerThreadCount::Count(2),
    );
    assert_eq!(solution.strategy(), "Branch and Bound");
}

#[test]
fn test_decompose_is_perfect() {
    let solution = solve(
        StrategyConfig::Decompose(DecomposeConfig {
            max_progress_length: 3,
            max_quality_length: 3,
            ..DecomposeConfig::default()
        }),
        WorkerThreadCount::Count(2),
    );
    assert!(solution.is_perfect());
}

#[test]
fn test_solution_names_follow_catalog() {
    let solution = solve(
        StrategyConfig::Exhaustive(ExhaustiveConfig {
            max_depth: 4,
            node_limit: None,
        }),
        WorkerThreadCount::None,
    );
    let names = solution.names();
    assert_eq!(names.len(), 4);
    // Basic Synthesis is the apprentice's only progress action.
    assert_eq!(names.last().map(String::as_str), Some("Basic Synthesis"));
}
