//! Solving straight from problem and solver files.

use std::fs;
use std::path::PathBuf;

use craftforge::prelude::*;
use craftforge::{load_solver_config, solve_files, solve_problem, solve_with_channel};
use tokio::sync::mpsc;

const PROBLEM: &str = r#"
[actor]
name = "Journeyman"
level = 90
craftsmanship = 4000
control = 4000
cp = 600
actions = ["Basic Synthesis", "Basic Touch", "Veneration", "Innovation"]

[recipe]
name = "Iron Ingot"
level = 90
difficulty = 1000
max_quality = 2000
durability = 80
"#;

const SOLVER: &str = r#"
random_seed = 3
thread_count = "none"

[termination]
seconds_spent_limit = 60

[strategy]
type = "exhaustive"
max_depth = 3
"#;

fn scratch(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("craftforge-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_solve_problem_from_toml() {
    let problem = ProblemConfig::from_toml_str(PROBLEM).unwrap();
    let config = SolverConfig::from_toml_str(SOLVER).unwrap();

    let solution = solve_problem(problem, &config).unwrap().unwrap();
    assert!(solution.len() <= 3);
    assert!(solution.state().progress >= 1000);
    assert_eq!(solution.names().last().map(String::as_str), Some("Basic Synthesis"));
}

#[test]
fn test_solve_files() {
    let problem = scratch("problem.toml", PROBLEM);
    let solver = scratch("solver.toml", SOLVER);

    let solution = solve_files(&problem, Some(solver.as_path())).unwrap();
    assert!(solution.is_some());

    let _ = fs::remove_file(problem);
    let _ = fs::remove_file(solver);
}

#[test]
fn test_yaml_solver_file() {
    let yaml = "random_seed: 3\nstrategy:\n  type: beam\n  beam_width: 4\n";
    let path = scratch("solver.yaml", yaml);

    let config = load_solver_config(&path).unwrap();
    assert!(matches!(config.strategy, StrategyConfig::Beam(ref b) if b.beam_width == 4));

    let _ = fs::remove_file(path);
}

#[test]
fn test_channel_reports_improvements() {
    let problem = ProblemConfig::from_toml_str(PROBLEM).unwrap();
    let config = SolverConfig::from_toml_str(SOLVER).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let solution = solve_with_channel(problem, &config, sender).unwrap().unwrap();

    let mut improvements = Vec::new();
    while let Ok(improvement) = receiver.try_recv() {
        improvements.push(improvement);
    }
    assert!(!improvements.is_empty());
    assert!(improvements
        .windows(2)
        .all(|pair| pair[1].score >= pair[0].score));
    assert!(improvements.len() as u64 <= solution.statistics().improvements);
}

#[test]
fn test_invalid_solver_config_is_rejected() {
    let problem = ProblemConfig::from_toml_str(PROBLEM).unwrap();
    let config = SolverConfig::from_toml_str("[strategy]\ntype = \"exhaustive\"\nmax_depth = 0\n").unwrap();
    assert!(matches!(
        solve_problem(problem, &config),
        Err(SolveError::Config(_))
    ));
}
