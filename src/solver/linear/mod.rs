//! Embedded linear programming solver.
//!
//! The active-set solver uses this for its feasibility phase and for
//! problems whose quadratic term vanishes.

mod settings;
mod simplex;

pub use settings::*;
pub use simplex::*;
