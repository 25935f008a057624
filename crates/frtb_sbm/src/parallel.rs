//! Rayon-based fan-out over buckets and risk classes.
//!
//! Buckets and risk classes share nothing but the read-only parameter
//! store, so they can be mapped in parallel and collected in input order.

use rayon::prelude::*;

/// Number of buckets below which a risk class is computed sequentially.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

/// Minimum number of items per Rayon task.
///
/// A bucket is already a sizeable unit of work, so each one may run on its own.
pub const DEFAULT_BATCH_SIZE: usize = 1;

/// Configuration for parallel execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Minimum items per Rayon task
    pub batch_size: usize,
    /// Minimum items before using parallelism
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(batch_size: usize, parallel_threshold: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            parallel_threshold,
        }
    }

    /// Never parallelises.
    pub fn sequential() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, usize::MAX)
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }

    /// Maps `items` in parallel above the threshold, sequentially below it.
    /// Output order follows input order either way; any error aborts the map.
    pub fn try_map<T, R, E, F>(&self, items: &[T], mapper: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        if self.should_parallelize(items.len()) {
            items
                .par_iter()
                .with_min_len(self.batch_size.min(items.len()).max(1))
                .map(mapper)
                .collect()
        } else {
            items.iter().map(mapper).collect()
        }
    }
}
