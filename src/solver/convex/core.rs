use crate::algebra::*;
use crate::solver::callbacks::SolverCallbacks;
use crate::solver::{ConvexData, ConvexSettings, Multipliers, SolveResult, SolverInfo, SolverState};
use crate::timers::*;

/// State shared by every convex solver variant: problem data, settings,
/// progress information, callbacks and timers.
#[derive(Debug)]
pub struct SolverCore<T>
where
    T: FloatT,
{
    pub(crate) data: ConvexData<T>,
    pub(crate) settings: ConvexSettings<T>,
    pub(crate) info: SolverInfo<T>,
    pub(crate) callbacks: SolverCallbacks<T>,
    pub(crate) timers: Option<Timers>,
}

/// Why an iteration loop stopped before convergence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interruption {
    IterationLimit,
    TimeLimit,
    Callback,
}

impl<T> SolverCore<T>
where
    T: FloatT,
{
    pub fn new(data: ConvexData<T>, settings: ConvexSettings<T>, method: &'static str) -> Self {
        Self {
            data,
            settings,
            info: SolverInfo::new(method),
            callbacks: SolverCallbacks::default(),
            timers: Some(Timers::default()),
        }
    }

    /// Resets progress information and starts the solve timer.
    pub(crate) fn begin(&mut self) -> Timers {
        let mut timers = self.timers.take().unwrap_or_default();
        timers.reset();
        timers.start_as_current("solve");
        self.info.reset();

        if let Err(e) = self
            .info
            .print_configuration(&self.settings, &self.data)
            .and_then(|_| self.info.print_status_header(&self.settings))
        {
            tracing::warn!(error = %e, "could not write solver output");
        }
        timers
    }

    /// Per iteration progress output
    pub(crate) fn report(&mut self) {
        if let Err(e) = self.info.print_status(&self.settings) {
            tracing::warn!(error = %e, "could not write solver output");
        }
    }

    /// Checks the iteration budget, the time limit and the callbacks.
    pub(crate) fn check_interruption(&self, timers: &Timers) -> Option<Interruption> {
        if self.info.iterations >= self.settings.max_iter {
            return Some(Interruption::IterationLimit);
        }
        if timers.total_time().as_secs_f64() > self.settings.time_limit {
            return Some(Interruption::TimeLimit);
        }
        if self.callbacks.check_termination(&self.info) {
            return Some(Interruption::Callback);
        }
        None
    }

    /// Builds the final result and stops the timers.
    pub(crate) fn finish(
        &mut self,
        mut timers: Timers,
        state: SolverState,
        x: Vec<T>,
        multipliers: Option<Multipliers<T>>,
    ) -> SolveResult<T> {
        timers.stop_current();

        let value = if x.is_finite() && x.len() == self.data.nvars() {
            self.data.objective(&x)
        } else if state == SolverState::Unbounded {
            T::neg_infinity()
        } else {
            T::nan()
        };

        self.info.state = state;
        self.info.objective = value;
        self.info.solve_time = timers.total_time().as_secs_f64();

        if let Err(e) = self
            .info
            .print_footer(&self.settings)
            .and_then(|_| self.info.print_timers(&self.settings, &timers))
        {
            tracing::warn!(error = %e, "could not write solver output");
        }
        tracing::debug!(
            method = self.info.method,
            %state,
            iterations = self.info.iterations,
            "convex solve finished"
        );

        let result = SolveResult {
            state,
            value,
            x,
            multipliers,
            iterations: self.info.iterations,
            solve_time: self.info.solve_time,
        };
        self.timers = Some(timers);
        result
    }
}
