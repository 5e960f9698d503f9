//! CraftForge - a crafting sequence solver in Rust
//!
//! Describe an actor and a recipe, pick a search strategy, and get back the
//! best action sequence found within the budget.
//!
//! # Example
//!
//! ```rust
//! use craftforge::prelude::*;
//!
//! let problem = ProblemConfig::from_toml_str(r#"
//!     [actor]
//!     level = 90
//!     craftsmanship = 4000
//!     control = 4000
//!     cp = 600
//!     actions = ["Basic Synthesis", "Basic Touch", "Veneration", "Innovation"]
//!
//!     [recipe]
//!     level = 90
//!     difficulty = 1000
//!     max_quality = 2000
//!     durability = 80
//! "#).unwrap();
//!
//! let config = SolverConfig::new()
//!     .with_random_seed(7)
//!     .with_strategy(StrategyConfig::Exhaustive(ExhaustiveConfig {
//!         max_depth: 3,
//!         node_limit: None,
//!     }));
//!
//! let solution = craftforge::solve_problem(problem, &config).unwrap();
//! assert!(solution.is_some());
//! ```

// Domain model and simulation
pub use craftforge_core::{
    simulate, simulate_sequence, standard, ActionCatalog, ActionDescriptor, ActionId,
    ActorProfile, CraftContext, CraftError, CraftState, IllegalStep, RecipeTarget,
};

// Scoring and audits
pub use craftforge_scoring::{AuditChain, ScoreWeights, Scorer};

// Configuration
pub use craftforge_config::{
    BeamConfig, BranchAndBoundConfig, ConfigError, DecomposeConfig, ExhaustiveConfig,
    GeneticConfig, ProblemConfig, SolverConfig, StrategyConfig, TerminationConfig,
    WeightsConfig, WorkerThreadCount,
};

// Solver
pub use craftforge_solver::{
    CraftSolver, Improvement, LogSink, SolveError, SolveResult, Solution, SolverStatistics,
    Strategy, ThreadCount,
};

/// Every search strategy and termination, for hand-wired solvers.
pub mod strategies {
    pub use craftforge_solver::{
        BeamSearch, BranchAndBound, DecomposeSearch, ExhaustiveSearch, ExternalTermination,
        GeneticSearch, NodeCountTermination, Termination, TimeTermination, WindowTable,
    };
}

#[cfg(feature = "console")]
pub use craftforge_console as console;

mod solver;
pub use solver::{load_problem, load_solver_config, solve_files, solve_problem, solve_with_channel};

pub mod prelude {
    pub use super::standard;
    pub use super::{ActionCatalog, ActionId, ActorProfile, CraftContext, CraftState, RecipeTarget};
    pub use super::{
        BeamConfig, BranchAndBoundConfig, DecomposeConfig, ExhaustiveConfig, GeneticConfig,
        ProblemConfig, SolverConfig, StrategyConfig,
    };
    pub use super::{CraftSolver, Solution, SolveError};
}
