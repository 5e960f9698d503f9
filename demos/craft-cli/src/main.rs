//! `craftforge` command-line solver.
//!
//! ```text
//! craftforge solve data/craft.toml --config data/solver.toml
//! craftforge solve data/craft.toml --strategy beam --seconds 10
//! craftforge actions
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use tracing::level_filters::LevelFilter;

use craftforge::prelude::*;
use craftforge::{load_problem, load_solver_config, solve_problem, WorkerThreadCount};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log improvements and per-strategy progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the best sequence for a problem file
    Solve {
        /// Problem file (TOML, or YAML by extension)
        problem: PathBuf,

        /// Solver configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Replace the configured strategy with this one's defaults
        #[arg(short, long)]
        strategy: Option<StrategyKind>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Wall-clock limit in seconds
        #[arg(long)]
        seconds: Option<u64>,

        /// Worker threads; 0 runs on the calling thread
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// List the built-in actions
    Actions,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    Exhaustive,
    Genetic,
    Beam,
    BranchAndBound,
    Decompose,
}

impl StrategyKind {
    fn config(self) -> StrategyConfig {
        match self {
            StrategyKind::Exhaustive => StrategyConfig::Exhaustive(ExhaustiveConfig::default()),
            StrategyKind::Genetic => StrategyConfig::Genetic(GeneticConfig::default()),
            StrategyKind::Beam => StrategyConfig::Beam(BeamConfig::default()),
            StrategyKind::BranchAndBound => {
                StrategyConfig::BranchAndBound(BranchAndBoundConfig::default())
            }
            StrategyKind::Decompose => StrategyConfig::Decompose(DecomposeConfig::default()),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if args.verbose {
        craftforge::console::init_with_level(LevelFilter::DEBUG);
    }

    let result = match args.command {
        Commands::Solve {
            problem,
            config,
            strategy,
            seed,
            seconds,
            threads,
        } => solve(problem, config, strategy, seed, seconds, threads),
        Commands::Actions => {
            list_actions();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn solve(
    problem: PathBuf,
    config: Option<PathBuf>,
    strategy: Option<StrategyKind>,
    seed: Option<u64>,
    seconds: Option<u64>,
    threads: Option<usize>,
) -> Result<(), SolveError> {
    let problem = load_problem(problem)?;
    let mut config = match config {
        Some(path) => load_solver_config(path)?,
        None => SolverConfig::default(),
    };
    if let Some(kind) = strategy {
        config = config.with_strategy(kind.config());
    }
    if let Some(seed) = seed {
        config = config.with_random_seed(seed);
    }
    if let Some(seconds) = seconds {
        config = config.with_termination_seconds(seconds);
    }
    if let Some(threads) = threads {
        config = config.with_thread_count(match threads {
            0 => WorkerThreadCount::None,
            n => WorkerThreadCount::Count(n),
        });
    }

    match solve_problem(problem, &config)? {
        Some(solution) => print_solution(&solution),
        None => println!("{}", "No sequence reaches the progress target.".yellow()),
    }
    Ok(())
}

fn print_solution(solution: &Solution) {
    let state = solution.state();
    let verdict = if solution.is_perfect() {
        "perfect".bright_green().bold().to_string()
    } else {
        "complete".cyan().bold().to_string()
    };
    println!();
    println!(
        "{} {} in {} steps (score {:.4})",
        solution.strategy().bold(),
        verdict,
        solution.len(),
        solution.score()
    );
    for (step, name) in solution.names().iter().enumerate() {
        println!("  {:>2}. {}", step + 1, name);
    }
    println!(
        "progress {}  quality {}  durability {}  cp {}",
        state.progress, state.quality, state.durability, state.cp
    );
    let stats = solution.statistics();
    println!(
        "{} states in {:.2}s ({}/s)",
        stats.states_simulated,
        stats.duration.as_secs_f64(),
        stats.states_per_second()
    );
}

fn list_actions() {
    let catalog = ActionCatalog::standard();
    println!("{:<4}{:<22}{:>6}{:>6}{:>6}", "id", "name", "level", "cp", "dur");
    for action in catalog.iter() {
        println!(
            "{:<4}{:<22}{:>6}{:>6}{:>6}",
            action.id.index(),
            action.name,
            action.level,
            action.cp_cost,
            action.durability_cost
        );
    }
}
