//! Dense and sparse linear algebra for the numeric solvers.
//!
//! The solvers treat matrix decompositions as opaque numeric services
//! reached through the [`Decomposition`] trait.  Dense storage is column
//! major.  Sparse rows are only used by the iterative active-set variant,
//! which recycles them through a [`RowPool`].

mod dense;
mod error_types;
mod floats;
mod math_traits;
mod sparse;
mod vecmath;

pub use dense::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use sparse::*;
