use std::fmt;
use std::num::NonZeroUsize;
use std::thread;

use crate::TargetFunction;

/// Step count used when the caller does not pick one
pub const DEFAULT_STEP_COUNT: u64 = 10_000_000;

/// Number of worker threads for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCount {
    /// One worker per available hardware execution unit
    Auto,
    Exact(NonZeroUsize),
}

impl ThreadCount {
    #[must_use]
    pub const fn single() -> Self {
        Self::Exact(NonZeroUsize::MIN)
    }

    /// Snapshot the worker count. `Auto` falls back to one thread when the
    /// available parallelism cannot be queried.
    #[must_use]
    pub fn resolve(self) -> NonZeroUsize {
        match self {
            Self::Exact(count) => count,
            Self::Auto => thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::single()
    }
}

/// `0` means autodetect
impl From<usize> for ThreadCount {
    fn from(count: usize) -> Self {
        NonZeroUsize::new(count).map_or(Self::Auto, Self::Exact)
    }
}

/// Immutable description of one integration run
#[derive(Clone, Copy)]
pub struct IntegrationRequest<'f> {
    pub start: f64,
    pub end: f64,
    pub step_count: u64,
    pub thread_count: ThreadCount,
    pub function: &'f dyn TargetFunction,
}

impl<'f> IntegrationRequest<'f> {
    /// Request over `[start, end)` with the default step and thread counts
    #[must_use]
    pub fn new(function: &'f dyn TargetFunction, start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            step_count: DEFAULT_STEP_COUNT,
            thread_count: ThreadCount::default(),
            function,
        }
    }

    #[must_use]
    pub fn with_step_count(mut self, step_count: u64) -> Self {
        self.step_count = step_count;
        self
    }

    #[must_use]
    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.thread_count = thread_count;
        self
    }
}

impl fmt::Debug for IntegrationRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationRequest")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("step_count", &self.step_count)
            .field("thread_count", &self.thread_count)
            .finish_non_exhaustive()
    }
}
