//! Solver entry points that hide the context and worker wiring.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use craftforge_config::{ProblemConfig, SolverConfig};
use craftforge_core::{ActionCatalog, CraftContext};
use craftforge_solver::{CraftSolver, Improvement, SolveResult, Solution};

/// Solves `problem` against the built-in catalog using `config`.
///
/// With the `console` feature enabled, the first call installs the
/// console subscriber.
///
/// # Errors
///
/// Fails when the problem or configuration is invalid, or the chosen
/// strategy cannot work with the problem.
pub fn solve_problem(problem: ProblemConfig, config: &SolverConfig) -> SolveResult<Option<Solution>> {
    let (ctx, mut solver) = prepare(problem, config)?;
    solver.solve(&ctx)
}

/// Like [`solve_problem`], sending every improvement through `sender`.
pub fn solve_with_channel(
    problem: ProblemConfig,
    config: &SolverConfig,
    sender: mpsc::UnboundedSender<Improvement>,
) -> SolveResult<Option<Solution>> {
    let (ctx, mut solver) = prepare(problem, config)?;
    solver.solve_with_channel(&ctx, sender)
}

/// Loads a problem file and an optional solver file, then solves.
///
/// Files ending in `.yaml` or `.yml` are read as YAML, anything else as
/// TOML. Without a solver file the defaults apply.
pub fn solve_files(
    problem: impl AsRef<Path>,
    config: Option<&Path>,
) -> SolveResult<Option<Solution>> {
    let problem = load_problem(problem)?;
    let config = match config {
        Some(path) => load_solver_config(path)?,
        None => SolverConfig::default(),
    };
    solve_problem(problem, &config)
}

/// Reads a problem file, choosing the format by extension.
pub fn load_problem(path: impl AsRef<Path>) -> SolveResult<ProblemConfig> {
    let path = path.as_ref();
    let problem = if is_yaml(path) {
        ProblemConfig::from_yaml_file(path)?
    } else {
        ProblemConfig::from_toml_file(path)?
    };
    Ok(problem)
}

/// Reads a solver file, choosing the format by extension.
pub fn load_solver_config(path: impl AsRef<Path>) -> SolveResult<SolverConfig> {
    let path = path.as_ref();
    let config = if is_yaml(path) {
        SolverConfig::from_yaml_file(path)?
    } else {
        SolverConfig::from_toml_file(path)?
    };
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

fn prepare(problem: ProblemConfig, config: &SolverConfig) -> SolveResult<(CraftContext, CraftSolver)> {
    #[cfg(feature = "console")]
    craftforge_console::init();

    let ctx = problem.into_context(Arc::new(ActionCatalog::standard()))?;
    let solver = CraftSolver::from_config(config)?;
    Ok((ctx, solver))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_detection() {
        assert!(is_yaml(Path::new("craft.yaml")));
        assert!(is_yaml(Path::new("dir/craft.YML")));
        assert!(!is_yaml(Path::new("craft.toml")));
        assert!(!is_yaml(Path::new("craft")));
    }

    #[test]
    fn test_missing_problem_file_is_config_error() {
        let err = load_problem("does-not-exist.toml").unwrap_err();
        assert!(matches!(err, craftforge_solver::SolveError::Config(_)));
    }
}
