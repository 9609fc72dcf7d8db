use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::{ConvexData, ConvexSettings, SolverState};
use crate::timers::Timers;
use std::io::Write;
use std::time::Duration;

/// Progress and summary information for a solve.  Termination callbacks
/// receive a reference to this at the top of every iteration.
#[derive(Default, Debug)]
pub struct SolverInfo<T> {
    /// name of the solver variant in use
    pub method: &'static str,
    pub iterations: u32,
    pub state: SolverState,
    /// objective value at the current iterate
    pub objective: T,
    /// step length taken in the last iteration
    pub step_length: T,
    /// number of inequality rows in the active set
    pub active: usize,
    pub solve_time: f64,

    pub(crate) stream: PrintTarget,
}

impl<T> SolverInfo<T>
where
    T: FloatT,
{
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub(crate) fn reset(&mut self) {
        self.iterations = 0;
        self.state = SolverState::Unexplored;
        self.objective = T::nan();
        self.step_length = T::zero();
        self.active = 0;
        self.solve_time = 0f64;
    }

    pub(crate) fn print_configuration(
        &mut self,
        settings: &ConvexSettings<T>,
        data: &ConvexData<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;

        writeln!(out, "-------------------------------------------------------------")?;
        writeln!(out, "           mathprog v{}  -  convex QP solver", crate::VERSION)?;
        writeln!(out, "-------------------------------------------------------------")?;
        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables     = {}", data.nvars())?;
        writeln!(out, "  equalities    = {}", data.neq())?;
        writeln!(out, "  inequalities  = {}", data.nineq())?;
        writeln!(out, "  method        = {}", self.method)?;

        let time_lim_str = {
            if settings.time_limit.is_infinite() {
                "Inf".to_string()
            } else {
                format!("{:?}", settings.time_limit)
            }
        };
        writeln!(out, "settings:")?;
        writeln!(
            out,
            "  max iter = {}, time limit = {}",
            settings.max_iter, time_lim_str
        )?;
        writeln!(
            out,
            "  tol_feas = {:.1e}, tol_step = {:.1e}, tol_multiplier = {:.1e}",
            settings.tol_feas, settings.tol_step, settings.tol_multiplier
        )?;
        writeln!(
            out,
            "  schur scaling: {}, dual reg: {}, extended precision: {}",
            _bool_on_off(settings.schur_scaling_enable),
            _bool_on_off(settings.dual_regularization_enable),
            _bool_on_off(settings.extended_precision_enable),
        )?;
        writeln!(out)?;
        Ok(())
    }

    pub(crate) fn print_status_header(&mut self, settings: &ConvexSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;
        writeln!(out, "iter    objective     step      active")?;
        writeln!(out, "----------------------------------------")?;
        out.flush()
    }

    pub(crate) fn print_status(&mut self, settings: &ConvexSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;
        write!(out, "{:>4}  {:+10.4e}  ", self.iterations, self.objective)?;
        if self.iterations > 0 {
            write!(out, "{:8.2e}  ", self.step_length)?;
        } else {
            write!(out, " ------   ")?;
        }
        writeln!(out, "{:>6}", self.active)
    }

    pub(crate) fn print_footer(&mut self, settings: &ConvexSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;
        writeln!(out, "----------------------------------------")?;
        writeln!(out, "Terminated with state = {}", self.state)?;
        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;
        Ok(())
    }

    pub(crate) fn print_timers(&mut self, settings: &ConvexSettings<T>, timers: &Timers) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        writeln!(self.stream, "phases:")?;
        timers.print(&mut self.stream)?;
        self.stream.flush()
    }
}

impl<T> ConfigurablePrintTarget for SolverInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_tracing(&mut self) {
        self.stream.print_to_tracing()
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}
