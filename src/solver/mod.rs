//! Numeric solvers.
//!
//! The [`convex`] family solves quadratic problems with linear equality
//! and inequality constraints in the form
//!
//! ```text
//! minimise   ½x'Qx + C'x
//! subject to AE*x  = BE
//!            AI*x <= BI
//! ```
//!
//! Problem data is held in [`ConvexData`] and solver behaviour is
//! configured through [`ConvexSettings`].   Every solve returns a
//! [`SolveResult`] whose [`SolverState`] reports the quality of the
//! solution.   The [`linear`] module holds the embedded simplex solver.

mod callbacks;
pub mod convex;
mod data;
mod info;
pub mod linear;
mod settings;
mod status;

pub use callbacks::{InterruptHandle, TerminationCallback};
pub use convex::{
    ActiveSetSolver, ConvexSolver, ConvexSolverEngine, EqualityConstrainedSolver,
    ExtendedPrecisionSolver, SolverCore, UnconstrainedSolver,
};
pub use data::*;
pub use info::*;
pub use settings::*;
pub use status::*;
