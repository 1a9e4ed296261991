use std::io;

/// Failure class of a run, used by front ends to pick an exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed command-line input
    InvalidArguments,
    /// Interval too small, inverted or not finite; or no steps requested
    Convergence,
    /// Memory or thread creation failure
    ResourceExhaustion,
    /// Target function could not be resolved
    PluginLoad,
    /// A worker died while evaluating the target function
    WorkerFailure,
}

/// Errors raised by the integration driver
#[derive(thiserror::Error, Debug)]
pub enum IntegrateError {
    #[error("Convergence unreachable: can not left-integrate from {start} to {end} in {step_count} steps")]
    Convergence { start: f64, end: f64, step_count: u64 },

    #[error("Threading error: could not spawn worker {index}, {cancelled} started workers cancelled")]
    ThreadSpawn {
        index: usize,
        cancelled: usize,
        #[source]
        source: io::Error,
    },

    #[error("Worker {index} panicked while evaluating the target function")]
    WorkerPanicked { index: usize },
}

impl IntegrateError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Convergence { .. } => ErrorKind::Convergence,
            Self::ThreadSpawn { .. } => ErrorKind::ResourceExhaustion,
            Self::WorkerPanicked { .. } => ErrorKind::WorkerFailure,
        }
    }
}
