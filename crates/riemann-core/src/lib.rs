//! Riemann core - parallel left-rectangle integration
//!
//! Splits an interval into equal contiguous partitions, integrates each on
//! its own scoped thread and sums the partial results in partition order.

mod driver;
mod error;
mod partition;
mod request;

pub use driver::{Integration, Integrator, IntegratorConfig, OsThreads, WorkerSpawner};
pub use error::{ErrorKind, IntegrateError};
pub use partition::{CANCEL_POLL_INTERVAL, Partition, plan_partitions};
pub use request::{DEFAULT_STEP_COUNT, IntegrationRequest, ThreadCount};

/// A pure `f64 -> f64` function that can be integrated.
///
/// Workers call `evaluate` concurrently, hence the `Send + Sync` bound.
pub trait TargetFunction: Send + Sync {
    fn evaluate(&self, x: f64) -> f64;
}

impl<F> TargetFunction for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}
