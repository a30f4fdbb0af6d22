// src/parallel.rs

//! Bounded fork-join execution for the accelerated variant.
//!
//! Both parallel phases (trajectory embedding and per-diagonal averaging) go
//! through [`WorkerPool`]. Tasks never share mutable state: each one either
//! writes a disjoint lane of a preallocated matrix or returns a value that is
//! collected in submission order. Any failing or panicking task aborts the
//! whole call with [`SsaError::WorkerFailure`].

use crate::error::{Result, SsaError};
use log::debug;
use ndarray::{ArrayViewMut1, ArrayViewMut2, Axis};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// A bounded pool of worker threads.
///
/// With no explicit bound the global rayon pool is used, which is already
/// capped at the number of available CPUs. An explicit bound builds a
/// dedicated pool of at most that many threads.
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_workers", &self.num_workers())
            .finish()
    }
}

impl WorkerPool {
    /// A pool backed by the global rayon pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Creates a pool bounded by `max_workers`, or backed by the global pool when `None`.
    ///
    /// # Errors
    /// Returns [`SsaError::InvalidConfig`] for `Some(0)`, and
    /// [`SsaError::WorkerFailure`] if the threads cannot be spawned.
    pub fn new(max_workers: Option<usize>) -> Result<Self> {
        match max_workers {
            None => Ok(Self::global()),
            Some(0) => Err(SsaError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            )),
            Some(n) => {
                let built = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("ssa-worker-{}", i))
                    .build()
                    .map_err(|e| SsaError::WorkerFailure(format!("failed to build worker pool: {}", e)))?;
                debug!("Built dedicated SSA worker pool with {} threads.", n);
                Ok(Self { pool: Some(built) })
            }
        }
    }

    /// Like [`WorkerPool::new`], but a dedicated pool never gets more threads
    /// than there are tasks to run.
    ///
    /// # Errors
    /// Same as [`WorkerPool::new`].
    pub fn bounded(max_workers: Option<usize>, max_tasks: usize) -> Result<Self> {
        match max_workers {
            Some(n) if n > max_tasks.max(1) => Self::new(Some(max_tasks.max(1))),
            other => Self::new(other),
        }
    }

    /// Number of threads tasks may run on.
    pub fn num_workers(&self) -> usize {
        match &self.pool {
            Some(p) => p.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Runs `f(i)` for every `i` in `0..len` and returns the results in index order.
    ///
    /// A task error aborts the call and is returned as a worker failure;
    /// a panic in any task is caught and reported the same way.
    pub fn map_indexed<T, F>(&self, len: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        self.run(|| {
            (0..len)
                .into_par_iter()
                .map(|i| {
                    f(i).map_err(|e| match e {
                        e @ SsaError::WorkerFailure(_) => e,
                        other => SsaError::WorkerFailure(format!("task {} failed: {}", i, other)),
                    })
                })
                .collect::<Result<Vec<T>>>()
        })
    }

    /// Runs `f(index, lane)` on every lane of `matrix` along `axis`.
    ///
    /// Lanes are disjoint, so tasks write without synchronization; the call
    /// returns only after every lane has been written.
    pub fn for_each_lane_mut<F>(&self, mut matrix: ArrayViewMut2<'_, f64>, axis: Axis, f: F) -> Result<()>
    where
        F: Fn(usize, ArrayViewMut1<'_, f64>) + Sync + Send,
    {
        self.run(move || {
            matrix
                .axis_iter_mut(axis)
                .into_par_iter()
                .enumerate()
                .for_each(|(index, lane)| f(index, lane));
            Ok(())
        })
    }

    fn run<R, OP>(&self, op: OP) -> Result<R>
    where
        R: Send,
        OP: FnOnce() -> Result<R> + Send,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &self.pool {
            Some(p) => p.install(op),
            None => op(),
        }));
        match outcome {
            Ok(result) => result,
            Err(payload) => Err(SsaError::WorkerFailure(format!(
                "worker task panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
