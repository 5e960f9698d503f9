//! CraftForge search engine
//!
//! This crate provides the search layer on top of the simulator:
//! - Strategies (exhaustive, genetic, beam, branch-and-bound, decompose)
//! - The shared search scope with the best-solution record
//! - Termination conditions
//! - Worker pool and statistics
//! - Configuration wiring (builder module)

pub mod builder;
pub mod error;
pub mod pool;
pub mod scope;
pub mod solution;
pub mod solver;
pub mod statistics;
pub mod strategy;
pub mod termination;
pub mod tree;

pub use builder::{apply_weights, StrategyBuilder, TerminationBuilder};
pub use error::{SolveError, SolveResult};
pub use pool::{ThreadCount, WorkerPool};
pub use scope::{Improvement, LogSink, OfferOutcome, SearchScope};
pub use solution::{ScoredSequence, Solution};
pub use solver::{trim_to_completion, CraftSolver};
pub use statistics::{SolverStatistics, StatisticsCollector};
pub use strategy::{
    BeamSearch, BranchAndBound, DecomposeSearch, ExhaustiveSearch, GeneticSearch, Strategy,
    WindowTable,
};
pub use termination::{
    ExternalTermination, NodeCountTermination, Termination, TimeTermination,
};
pub use tree::{ActionTree, NodeId};
