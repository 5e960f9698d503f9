//! Bounded worker pool for the parallel strategies.
//!
//! # Example
//!
//! ```
//! use craftforge_solver::pool::{ThreadCount, WorkerPool};
//!
//! let pool = WorkerPool::new(ThreadCount::Specific(2)).unwrap();
//! let squares = pool.map(vec![1, 2, 3], |x| x * x);
//! assert_eq!(squares, vec![1, 4, 9]);
//! ```

use std::fmt;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use craftforge_config::WorkerThreadCount;

use crate::error::SolveResult;

/// Upper bound applied to [`ThreadCount::Auto`].
pub const AUTO_THREAD_LIMIT: usize = 16;

/// Thread count for parallel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadCount {
    /// Available CPU cores, capped at [`AUTO_THREAD_LIMIT`].
    #[default]
    Auto,
    /// Use all available CPU cores.
    Unlimited,
    /// Use a specific number of threads.
    Specific(usize),
}

impl ThreadCount {
    /// Resolves to an actual number of threads, never zero.
    pub fn resolve(&self) -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        match self {
            ThreadCount::Auto => cpus.min(AUTO_THREAD_LIMIT),
            ThreadCount::Unlimited => cpus,
            ThreadCount::Specific(n) => (*n).max(1),
        }
    }
}

impl From<WorkerThreadCount> for ThreadCount {
    fn from(count: WorkerThreadCount) -> Self {
        match count {
            WorkerThreadCount::Auto => ThreadCount::Auto,
            WorkerThreadCount::None => ThreadCount::Specific(1),
            WorkerThreadCount::Count(n) => ThreadCount::Specific(n),
        }
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "Auto"),
            ThreadCount::Unlimited => write!(f, "Unlimited"),
            ThreadCount::Specific(n) => write!(f, "{}", n),
        }
    }
}

/// A fixed-size rayon pool, or the calling thread when sized to one.
pub struct WorkerPool {
    pool: Option<ThreadPool>,
    threads: usize,
}

impl WorkerPool {
    pub fn new(count: ThreadCount) -> SolveResult<Self> {
        let threads = count.resolve();
        if threads <= 1 {
            return Ok(Self::sequential());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("craftforge-worker-{i}"))
            .build()?;
        Ok(Self {
            pool: Some(pool),
            threads,
        })
    }

    /// Runs everything on the calling thread.
    pub fn sequential() -> Self {
        Self {
            pool: None,
            threads: 1,
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Applies `f` to every item and returns results in input order.
    ///
    /// Called from one of this pool's own workers, the items run inline so
    /// nested fan-out never waits on the pool it occupies.
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        match &self.pool {
            Some(pool) if items.len() > 1 && pool.current_thread_index().is_none() => {
                pool.install(|| items.into_par_iter().map(f).collect())
            }
            _ => items.into_iter().map(f).collect(),
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count_resolve() {
        assert_eq!(ThreadCount::Specific(3).resolve(), 3);
        assert_eq!(ThreadCount::Specific(0).resolve(), 1);
        assert!(ThreadCount::Auto.resolve() <= AUTO_THREAD_LIMIT);
        assert!(ThreadCount::Unlimited.resolve() >= 1);
    }

    #[test]
    fn test_from_config_count() {
        assert_eq!(ThreadCount::from(WorkerThreadCount::None), ThreadCount::Specific(1));
        assert_eq!(ThreadCount::from(WorkerThreadCount::Count(4)), ThreadCount::Specific(4));
        assert_eq!(ThreadCount::from(WorkerThreadCount::Auto), ThreadCount::Auto);
        assert_eq!(ThreadCount::Specific(4).to_string(), "4");
    }

    #[test]
    fn test_map_preserves_order() {
        let pool = WorkerPool::new(ThreadCount::Specific(4)).unwrap();
        let out = pool.map((0..100).collect(), |x: u32| x * 2);
        assert_eq!(out, (0..100).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_sequential_pool() {
        let pool = WorkerPool::sequential();
        assert_eq!(pool.threads(), 1);
        assert_eq!(pool.map(vec!["a", "b"], str::len), vec![1, 1]);
    }

    #[test]
    fn test_nested_map_runs_inline() {
        let pool = WorkerPool::new(ThreadCount::Specific(2)).unwrap();
        let out = pool.map(vec![1u32, 2, 3], |x| pool.map(vec![x, x], |y| y + 1).iter().sum::<u32>());
        assert_eq!(out, vec![4, 6, 8]);
    }
}
