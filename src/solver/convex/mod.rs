//! Convex quadratic solver family.
//!
//! All variants solve
//!
//! ```text
//! minimise   ½x'Qx + C'x
//! subject to AE*x  = BE
//!            AI*x <= BI
//! ```
//!
//! and are reached through the [`ConvexSolver`] trait.   Use
//! [`ConvexSolverEngine::new`] to pick the variant that fits the problem
//! shape and settings.

#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::callbacks::{InterruptHandle, TerminationCallback};
use crate::solver::{ConvexData, ConvexSettings, DataError, SettingsError, SolveResult, SolverInfo};
use enum_dispatch::*;

mod activeset;
mod core;
mod equality;
pub(crate) mod kkt;
mod refinement;
mod stability;
mod unconstrained;

pub use self::core::SolverCore;
pub use activeset::*;
pub use equality::*;
pub use refinement::*;
pub use unconstrained::*;

/// Operations shared by every convex solver variant
#[enum_dispatch]
pub trait ConvexSolver<T>
where
    T: FloatT,
{
    /// shared solver state
    fn core(&self) -> &SolverCore<T>;
    fn core_mut(&mut self) -> &mut SolverCore<T>;

    /// Solve the problem.   A feasible `start` is used as the initial
    /// iterate where the variant supports warm starting.
    fn solve(&mut self, start: Option<&[T]>) -> SolveResult<T>;

    fn data(&self) -> &ConvexData<T> {
        &self.core().data
    }

    fn settings(&self) -> &ConvexSettings<T> {
        &self.core().settings
    }

    fn info(&self) -> &SolverInfo<T> {
        &self.core().info
    }

    fn info_mut(&mut self) -> &mut SolverInfo<T> {
        &mut self.core_mut().info
    }

    /// Replace the settings.   Choices fixed at construction may not change.
    fn update_settings(&mut self, settings: ConvexSettings<T>) -> Result<(), SettingsError> {
        settings.validate_as_update(&self.core().settings)?;
        self.core_mut().settings = settings;
        Ok(())
    }

    /// Replace the right hand side of one inequality row
    fn update_inequality_rhs(&mut self, row: usize, value: T) -> Result<(), DataError> {
        self.core_mut().data.update_inequality_rhs(row, value)
    }

    fn set_termination_callback(&mut self, f: TerminationCallback<T>) {
        self.core_mut().callbacks.termination_callback = Some(f);
    }

    fn unset_termination_callback(&mut self) {
        self.core_mut().callbacks.termination_callback = None;
    }

    /// Stop the solve whenever `flag` is set
    fn set_interrupt(&mut self, flag: InterruptHandle) {
        self.core_mut().callbacks.interrupt = Some(flag);
    }

    /// Release cached factorizations and work buffers
    fn dispose(&mut self) {
        self.core_mut().timers = None;
    }
}

/// The convex solver variants
#[enum_dispatch(ConvexSolver<T>)]
pub enum ConvexSolverEngine<T>
where
    T: FloatT,
{
    Unconstrained(UnconstrainedSolver<T>),
    Equality(EqualityConstrainedSolver<T>),
    ActiveSet(ActiveSetSolver<T>),
    ExtendedPrecision(ExtendedPrecisionSolver<T>),
}

impl<T> ConvexSolverEngine<T>
where
    T: FloatT,
{
    /// Picks a solver variant for `data`:
    ///
    /// * extended precision refinement if enabled in `settings`;
    /// * otherwise no constraints selects the unconstrained solver;
    /// * equality constraints only select the equality solver;
    /// * anything with inequalities selects an active-set solver,
    ///   iterative when forced by `settings.iterative` or, if that is
    ///   unset, when the problem is at least `settings.iterative_threshold`
    ///   in size.
    pub fn new(data: ConvexData<T>, settings: ConvexSettings<T>) -> Self {
        if settings.extended_precision_enable {
            return ExtendedPrecisionSolver::new(data, settings).into();
        }
        Self::new_ordinary(data, settings)
    }

    /// As [`new`](Self::new), but never selecting extended precision.
    pub fn new_ordinary(data: ConvexData<T>, settings: ConvexSettings<T>) -> Self {
        if data.nineq() == 0 && data.neq() == 0 {
            return UnconstrainedSolver::new(data, settings).into();
        }
        if data.nineq() == 0 {
            return EqualityConstrainedSolver::new(data, settings).into();
        }
        let size = data.nvars() + data.nineq();
        let iterative = settings
            .iterative
            .unwrap_or(size >= settings.iterative_threshold);
        if iterative {
            ActiveSetSolver::new_iterative(data, settings).into()
        } else {
            ActiveSetSolver::new_direct(data, settings).into()
        }
    }

    /// Name of the selected variant
    pub fn method(&self) -> &'static str {
        self.info().method
    }
}

#[test]
fn test_engine_selection() {
    let Q = Matrix::<f64>::identity(2);
    let data = ConvexData::unconstrained(Q.clone(), vec![1., 1.]).unwrap();
    let engine = ConvexSolverEngine::new(data, ConvexSettings::default());
    assert!(matches!(engine, ConvexSolverEngine::Unconstrained(_)));

    let AI = Matrix::from(&[[1., 1.]]);
    let data = ConvexData::new(
        Q.clone(),
        vec![0., 0.],
        Matrix::zeros((0, 2)),
        vec![],
        AI,
        vec![1.],
    )
    .unwrap();

    let engine = ConvexSolverEngine::new(data.clone(), ConvexSettings::default());
    assert_eq!(engine.method(), "active-set (direct)");

    let mut settings = ConvexSettings::default();
    settings.iterative = Some(true);
    let engine = ConvexSolverEngine::new(data.clone(), settings);
    assert_eq!(engine.method(), "active-set (iterative)");

    let mut settings = ConvexSettings::default();
    settings.iterative_threshold = 3;
    let engine = ConvexSolverEngine::new(data.clone(), settings);
    assert_eq!(engine.method(), "active-set (iterative)");

    let mut settings = ConvexSettings::default();
    settings.extended_precision_enable = true;
    let engine = ConvexSolverEngine::new(data, settings);
    assert!(matches!(engine, ConvexSolverEngine::ExtendedPrecision(_)));
}
