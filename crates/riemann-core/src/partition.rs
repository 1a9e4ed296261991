use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::TargetFunction;

/// Workers check the cancellation flag once per this many steps
pub const CANCEL_POLL_INTERVAL: u64 = 4096;

/// Contiguous sub-range `[start, end)` integrated by one worker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    /// Global step size, identical for every partition of a run
    pub step: f64,
}

impl Partition {
    /// Left-rectangle sum of `function` over this partition.
    ///
    /// Samples `start, start + step, ...` while strictly below `end`; the
    /// last rectangle is not shortened when `end - start` is not a multiple
    /// of `step`. Non-finite values from `function` propagate into the sum.
    ///
    /// Returns the partial sum accumulated so far if `cancel` is raised.
    pub fn integrate(&self, function: &dyn TargetFunction, cancel: &AtomicBool) -> f64 {
        let mut sum = 0.0;
        let mut x = self.start;
        let mut taken: u64 = 0;
        while x < self.end {
            if taken % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                break;
            }
            sum += function.evaluate(x) * self.step;
            x += self.step;
            taken += 1;
        }
        sum
    }
}

/// Split `[start, end)` into `threads` partitions of equal width.
///
/// Adjacent bounds are computed by the same expression and therefore match
/// exactly; the last `end` may drift from `end` by rounding, which is not
/// corrected. `step_count` must be positive.
#[must_use]
pub fn plan_partitions(
    start: f64,
    end: f64,
    step_count: u64,
    threads: NonZeroUsize,
) -> Vec<Partition> {
    let interval = end - start;
    let step = interval / step_count as f64;
    let width = interval / threads.get() as f64;
    let bound = |i: usize| start + width * i as f64;

    (0..threads.get())
        .map(|index| Partition {
            index,
            start: bound(index),
            end: bound(index + 1),
            step,
        })
        .collect()
}
