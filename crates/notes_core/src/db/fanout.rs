//! Bounded parallel map used for read-only fan-out lookups.

use crate::error::AppError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Build the worker pool that caps concurrent lookups at `max_parallel`.
///
/// # Errors
/// Returns a storage error when the pool threads cannot be spawned.
pub fn lookup_pool(max_parallel: usize) -> Result<ThreadPool, AppError> {
    ThreadPoolBuilder::new()
        .num_threads(max_parallel.max(1))
        .thread_name(|index| format!("tag-lookup-{}", index))
        .build()
        .map_err(|err| AppError::StorageMessage(format!("Failed to build lookup pool: {}", err)))
}

/// Run `lookup` for every input on `pool` and return the results in input order.
///
/// Every lookup finishes before the first failure (by input position) is
/// returned; later failures are dropped. A single input runs inline on the
/// caller's thread.
///
/// # Errors
/// Returns the first lookup error.
pub fn parallel_map<T, R, F>(pool: &ThreadPool, inputs: &[T], lookup: F) -> Result<Vec<R>, AppError>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R, AppError> + Sync,
{
    match inputs {
        [] => return Ok(Vec::new()),
        [only] => return Ok(vec![lookup(only)?]),
        _ => {}
    }

    let slots: Vec<Result<R, AppError>> =
        pool.install(|| inputs.par_iter().map(|input| lookup(input)).collect());
    slots.into_iter().collect()
}
