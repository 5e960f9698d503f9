//! Errors that abort a run before or during search.

use thiserror::Error;

use craftforge_config::ConfigError;
use craftforge_core::CraftError;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid problem: {0}")]
    Craft(#[from] CraftError),

    /// Strategy parameters that cannot work with this problem.
    #[error("invalid search setup: {0}")]
    Setup(String),

    #[error("worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type SolveResult<T> = std::result::Result<T, SolveError>;
