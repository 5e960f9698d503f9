//! Configuration system for CraftForge.
//!
//! Load solver configuration from TOML or YAML to pick a search strategy,
//! its budgets, and termination limits without code changes. Problem files
//! describing the actor and recipe live in [`problem`].
//!
//! # Examples
//!
//! ```
//! use craftforge_config::{SolverConfig, StrategyConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     random_seed = 7
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!
//!     [strategy]
//!     type = "branch_and_bound"
//!     window_length = 4
//!     frontier_width = 16
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert!(matches!(config.strategy, StrategyConfig::BranchAndBound(ref b) if b.window_length == 4));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use craftforge_config::SolverConfig;
//!
//! let config = SolverConfig::load("craft-solver.toml").unwrap_or_default();
//! ```

pub mod problem;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use craftforge_core::CraftError;

pub use problem::{ActorConfig, ProblemConfig, RecipeConfig};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid problem: {0}")]
    Craft(#[from] CraftError),
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Random seed for reproducible results.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Number of worker threads.
    #[serde(default)]
    pub thread_count: WorkerThreadCount,

    /// Termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Search strategy and its budgets.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Score weight overrides on top of the strategy's preset.
    #[serde(default)]
    pub weights: Option<WeightsConfig>,
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the worker thread count.
    pub fn with_thread_count(mut self, count: WorkerThreadCount) -> Self {
        self.thread_count = count;
        self
    }

    /// Replaces the strategy configuration.
    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns the termination time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Checks budgets and rates for values no strategy can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let WorkerThreadCount::Count(0) = self.thread_count {
            return Err(invalid("thread_count must be at least 1"));
        }
        self.strategy.validate()
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Worker thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerThreadCount {
    /// Use the available CPU cores.
    #[default]
    Auto,

    /// Run everything on the calling thread.
    None,

    /// Specific number of threads.
    Count(usize),
}

impl fmt::Display for WorkerThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerThreadCount::Auto => write!(f, "auto"),
            WorkerThreadCount::None => write!(f, "none"),
            WorkerThreadCount::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Termination configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum seconds to spend solving.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum minutes to spend solving.
    pub minutes_spent_limit: Option<u64>,

    /// Maximum number of simulated states.
    pub node_count_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds =
            self.seconds_spent_limit.unwrap_or(0) + self.minutes_spent_limit.unwrap_or(0) * 60;
        if seconds > 0 {
            Some(Duration::from_secs(seconds))
        } else {
            None
        }
    }
}

/// Score weight overrides; unset fields keep the preset value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WeightsConfig {
    pub progress: Option<f64>,
    pub quality: Option<f64>,
    pub cp: Option<f64>,
    pub durability: Option<f64>,
    pub steps: Option<f64>,
    pub max_steps: Option<u32>,
}

/// Strategy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Fixed-depth odometer enumeration.
    Exhaustive(ExhaustiveConfig),

    /// Population search over fixed-length chromosomes.
    Genetic(GeneticConfig),

    /// Discrepancy-bounded beam search.
    Beam(BeamConfig),

    /// Macro-step search over presolved windows.
    BranchAndBound(BranchAndBoundConfig),

    /// Progress/quality split with interleaving and durability repair.
    Decompose(DecomposeConfig),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::Beam(BeamConfig::default())
    }
}

impl StrategyConfig {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::Exhaustive(_) => "Exhaustive",
            StrategyConfig::Genetic(_) => "Genetic",
            StrategyConfig::Beam(_) => "Beam",
            StrategyConfig::BranchAndBound(_) => "Branch and Bound",
            StrategyConfig::Decompose(_) => "Decompose",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StrategyConfig::Exhaustive(c) => {
                if c.max_depth == 0 {
                    return Err(invalid("exhaustive max_depth must be at least 1"));
                }
            }
            StrategyConfig::Genetic(c) => {
                if c.population_size < 2 || c.max_length == 0 {
                    return Err(invalid("genetic population_size >= 2 and max_length >= 1"));
                }
                for (name, v) in [
                    ("elite_fraction", c.elite_fraction),
                    ("mating_fraction", c.mating_fraction),
                ] {
                    if !(v > 0.0 && v <= 1.0) {
                        return Err(invalid(format!("genetic {name} must be in (0, 1]")));
                    }
                }
                if c.parent_a_rate < 0.0
                    || c.parent_b_rate < 0.0
                    || c.parent_a_rate + c.parent_b_rate > 1.0
                {
                    return Err(invalid("genetic parent rates must be non-negative and sum to at most 1"));
                }
                if c.improvement_epsilon < 0.0 {
                    return Err(invalid("genetic improvement_epsilon must be non-negative"));
                }
            }
            StrategyConfig::Beam(c) => {
                if c.beam_width == 0 || c.max_depth == 0 {
                    return Err(invalid("beam_width and max_depth must be at least 1"));
                }
            }
            StrategyConfig::BranchAndBound(c) => {
                if c.window_length == 0 || c.frontier_width == 0 {
                    return Err(invalid("window_length and frontier_width must be at least 1"));
                }
                if c.retreat >= c.window_length {
                    return Err(invalid("retreat must be shorter than window_length"));
                }
            }
            StrategyConfig::Decompose(c) => {
                if c.max_progress_length == 0
                    || c.progress_candidates == 0
                    || c.quality_candidates == 0
                {
                    return Err(invalid("decompose lengths and candidate counts must be at least 1"));
                }
                if c.max_progress_length + c.max_quality_length > 63 {
                    return Err(invalid("decompose merged length must stay below 64"));
                }
            }
        }
        Ok(())
    }
}

/// Exhaustive enumeration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExhaustiveConfig {
    /// Fixed sequence length enumerated.
    pub max_depth: usize,

    /// Stop after simulating this many states.
    pub node_limit: Option<u64>,
}

impl Default for ExhaustiveConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            node_limit: None,
        }
    }
}

/// Genetic search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneticConfig {
    pub population_size: usize,
    /// Generation cap.
    pub generations: usize,
    /// Chromosome length, including stop genes.
    pub max_length: usize,
    /// Share of each generation copied unchanged.
    pub elite_fraction: f64,
    /// Share of each generation eligible as parents.
    pub mating_fraction: f64,
    /// Probability a child gene comes from the first parent.
    pub parent_a_rate: f64,
    /// Probability a child gene comes from the second parent.
    pub parent_b_rate: f64,
    /// Best-score gain below which a generation counts as stagnant.
    pub improvement_epsilon: f64,
    /// Consecutive stagnant generations before stopping.
    pub stagnation_generations: usize,
    /// Chromosomes per parallel shard.
    pub shard_size: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            generations: 100,
            max_length: 24,
            elite_fraction: 0.05,
            mating_fraction: 0.3,
            parent_a_rate: 0.45,
            parent_b_rate: 0.45,
            improvement_epsilon: 1e-6,
            stagnation_generations: 25,
            shard_size: 32,
        }
    }
}

/// Beam / discrepancy search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BeamConfig {
    pub beam_width: usize,
    /// Highest discrepancy budget probed.
    pub max_discrepancies: usize,
    pub max_depth: usize,
    /// Visited-state limit per probe.
    pub node_limit: usize,
    /// Keep probing higher budgets after a solution is found.
    pub exhaust_discrepancies: bool,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            beam_width: 8,
            max_discrepancies: 4,
            max_depth: 40,
            node_limit: 200_000,
            exhaust_discrepancies: false,
        }
    }
}

/// Branch-and-bound configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BranchAndBoundConfig {
    /// Length of each presolved window.
    pub window_length: usize,
    /// Partial paths kept per macro-step.
    pub frontier_width: usize,
    /// Actions dropped from each kept path before the next macro-step.
    pub retreat: usize,
    pub max_macro_steps: usize,
    pub max_depth: usize,
}

impl Default for BranchAndBoundConfig {
    fn default() -> Self {
        Self {
            window_length: 3,
            frontier_width: 12,
            retreat: 2,
            max_macro_steps: 30,
            max_depth: 40,
        }
    }
}

/// Decompose-and-merge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DecomposeConfig {
    pub max_progress_length: usize,
    pub max_quality_length: usize,
    /// Progress lists kept for merging.
    pub progress_candidates: usize,
    /// Quality lists kept for merging.
    pub quality_candidates: usize,
    /// Interleavings tried per pair before moving on.
    pub max_interleavings: u64,
    /// Nesting limit of durability repair.
    pub repair_depth: usize,
    /// States visited per sub-search before it stops.
    pub subspace_node_limit: usize,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            max_progress_length: 6,
            max_quality_length: 12,
            progress_candidates: 8,
            quality_candidates: 8,
            max_interleavings: 20_000,
            repair_depth: 3,
            subspace_node_limit: 200_000,
        }
    }
}

#[cfg(test)]
mod tests;
