use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::IntegrateError;
use crate::partition::plan_partitions;
use crate::request::IntegrationRequest;

/// Driver settings passed explicitly to every run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorConfig {
    /// Intervals no wider than this are rejected as degenerate
    pub epsilon: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            epsilon: f64::from(f32::EPSILON),
        }
    }
}

/// Creates the thread that runs one worker.
///
/// The seam exists so thread creation failures can be exercised.
pub trait WorkerSpawner {
    /// Start `work` as worker `index` inside `scope`
    ///
    /// # Errors
    ///
    /// Returns the OS error when the thread cannot be created
    fn spawn<'scope, 'env, F>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        index: usize,
        work: F,
    ) -> io::Result<ScopedJoinHandle<'scope, f64>>
    where
        F: FnOnce() -> f64 + Send + 'scope;
}

/// Spawns named OS threads: `riemann-worker-{index}`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsThreads;

impl WorkerSpawner for OsThreads {
    fn spawn<'scope, 'env, F>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        index: usize,
        work: F,
    ) -> io::Result<ScopedJoinHandle<'scope, f64>>
    where
        F: FnOnce() -> f64 + Send + 'scope,
    {
        thread::Builder::new()
            .name(format!("riemann-worker-{index}"))
            .spawn_scoped(scope, work)
    }
}

/// Aggregated outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integration {
    /// Sum of all partial results in partition order
    pub value: f64,
    /// Resolved number of workers
    pub threads: usize,
    pub step_count: u64,
    /// Wall-clock time from the first spawn to the last join
    pub elapsed: Duration,
}

/// Fork-join driver: validate, partition, dispatch, join, aggregate
#[derive(Debug, Default)]
pub struct Integrator<S = OsThreads> {
    config: IntegratorConfig,
    spawner: S,
}

impl Integrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: IntegratorConfig) -> Self {
        Self {
            config,
            spawner: OsThreads,
        }
    }
}

impl<S: WorkerSpawner> Integrator<S> {
    #[must_use]
    pub const fn with_spawner(config: IntegratorConfig, spawner: S) -> Self {
        Self { config, spawner }
    }

    #[must_use]
    pub const fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    #[must_use]
    pub const fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Integrate `request.function` over `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns `IntegrateError::Convergence` for a degenerate request,
    /// `IntegrateError::ThreadSpawn` if a worker cannot be started (already
    /// started workers are cancelled and their results dropped) and
    /// `IntegrateError::WorkerPanicked` if the target function panics.
    pub fn integrate(&self, request: &IntegrationRequest<'_>) -> Result<Integration, IntegrateError> {
        self.validate(request)?;

        let threads = request.thread_count.resolve();
        let partitions = plan_partitions(request.start, request.end, request.step_count, threads);
        for partition in &partitions {
            debug!(
                worker = partition.index,
                start = partition.start,
                end = partition.end,
                step = partition.step,
                "planned partition"
            );
        }

        let function = request.function;
        let cancel = AtomicBool::new(false);
        let started = Instant::now();

        let partials = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(partitions.len());
            for partition in &partitions {
                let cancel = &cancel;
                let work = move || partition.integrate(function, cancel);
                match self.spawner.spawn(scope, partition.index, work) {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        cancel.store(true, Ordering::Relaxed);
                        let cancelled = handles.len();
                        warn!(
                            worker = partition.index,
                            cancelled,
                            error = %source,
                            "worker spawn failed, cancelling started workers"
                        );
                        for handle in handles {
                            // Partial results of a failed run are discarded.
                            let _ = handle.join();
                        }
                        return Err(IntegrateError::ThreadSpawn {
                            index: partition.index,
                            cancelled,
                            source,
                        });
                    }
                }
            }
            debug!(workers = handles.len(), "all workers dispatched");

            // Join every handle before inspecting results so no panicked
            // worker is left for the scope to re-raise.
            let joined: Vec<_> = handles.into_iter().map(ScopedJoinHandle::join).collect();
            joined
                .into_iter()
                .enumerate()
                .map(|(index, result)| result.map_err(|_| IntegrateError::WorkerPanicked { index }))
                .collect::<Result<Vec<f64>, _>>()
        })?;

        let elapsed = started.elapsed();
        debug!(elapsed_us = elapsed.as_micros() as u64, "all workers joined");

        let value = partials.iter().fold(0.0, |sum, partial| sum + partial);

        Ok(Integration {
            value,
            threads: threads.get(),
            step_count: request.step_count,
            elapsed,
        })
    }

    fn validate(&self, request: &IntegrationRequest<'_>) -> Result<(), IntegrateError> {
        let interval = request.end - request.start;
        // A step that vanishes against the largest bound would never advance `x`.
        let step = interval / request.step_count as f64;
        let magnitude = request.start.abs().max(request.end.abs());
        let degenerate = request.step_count == 0
            || !request.start.is_finite()
            || !request.end.is_finite()
            || !interval.is_finite()
            || interval <= self.config.epsilon
            || magnitude + step == magnitude;
        if degenerate {
            return Err(IntegrateError::Convergence {
                start: request.start,
                end: request.end,
                step_count: request.step_count,
            });
        }
        Ok(())
    }
}
