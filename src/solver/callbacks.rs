use crate::solver::SolverInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// User function polled at the top of every iteration.   Returning
/// `true` stops the solve.
pub type TerminationCallback<T> = Box<dyn Fn(&SolverInfo<T>) -> bool + Send + Sync>;

/// Shared flag that stops a running solve when set.
pub type InterruptHandle = Arc<AtomicBool>;

pub(crate) struct SolverCallbacks<T> {
    pub termination_callback: Option<TerminationCallback<T>>,
    pub interrupt: Option<InterruptHandle>,
}

impl<T> Default for SolverCallbacks<T> {
    fn default() -> Self {
        Self {
            termination_callback: None,
            interrupt: None,
        }
    }
}

impl<T> std::fmt::Debug for SolverCallbacks<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverCallbacks")
            .field("termination_callback", &self.termination_callback.is_some())
            .field("interrupt", &self.interrupt)
            .finish()
    }
}

impl<T> SolverCallbacks<T> {
    pub(crate) fn check_termination(&self, info: &SolverInfo<T>) -> bool {
        let interrupted = self
            .interrupt
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed));
        interrupted || self.termination_callback.as_ref().map_or(false, |f| f(info))
    }
}
