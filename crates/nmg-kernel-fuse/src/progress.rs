//! Progress reporting and cancellation.

use std::ops::ControlFlow;

use nmg_kernel_topo::{NmgError, Result};

/// Polled from inside every pair scan.
///
/// Returning [`ControlFlow::Break`] stops the running pass with
/// [`NmgError::Cancelled`]. Merges already made stay made.
pub trait Progress {
    /// `done` of `total` outer iterations of `stage` have completed.
    fn tick(&mut self, stage: &'static str, done: usize, total: usize) -> ControlFlow<()>;
}

/// Never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn tick(&mut self, _stage: &'static str, _done: usize, _total: usize) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F> Progress for F
where
    F: FnMut(&'static str, usize, usize) -> ControlFlow<()>,
{
    fn tick(&mut self, stage: &'static str, done: usize, total: usize) -> ControlFlow<()> {
        self(stage, done, total)
    }
}

pub(crate) fn poll(
    progress: &mut dyn Progress,
    stage: &'static str,
    done: usize,
    total: usize,
) -> Result<()> {
    match progress.tick(stage, done, total) {
        ControlFlow::Continue(()) => Ok(()),
        ControlFlow::Break(()) => Err(NmgError::Cancelled { stage }),
    }
}
