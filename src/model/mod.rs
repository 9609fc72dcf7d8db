//! Expression-based optimisation models.
//!
//! A [`Model`] holds [`Variable`]s and named [`Expression`]s.   Bounds on
//! an expression make it a constraint and a weight makes it part of the
//! objective.   All model values are exact decimals; conversion to
//! floating point happens only when a [`ModelSolver`] is built.
//!
//! ```
//! use mathprog::model::*;
//! use rust_decimal::Decimal;
//!
//! let mut model = Model::new(ModelOptions::default());
//! let x = model.add_variable("x").index();
//! let y = model.add_variable("y").index();
//!
//! model
//!     .add_expression("objective")
//!     .unwrap()
//!     .set_quadratic(x, x, 1)
//!     .set_quadratic(y, y, 1)
//!     .weight(1);
//! model.add_expression("sum").unwrap().set(x, 1).set(y, 1).lower(1);
//!
//! let result = model.minimise().unwrap();
//! assert!(result.state.is_optimal());
//! let half = Decimal::new(5, 1);
//! assert!((result.values[x] - half).abs() < Decimal::new(1, 6));
//! ```

mod coefficients;
mod context;
mod core;
mod entity;
mod error;
mod expression;
mod integration;
mod options;
pub mod presolve;
mod result;
pub mod scaling;
mod variable;

pub use self::core::Model;
pub use coefficients::Coefficients;
pub use context::NumberContext;
pub use entity::{EntityBounds, IntoLimit, Limits, ModelEntity};
pub use error::ModelError;
pub use expression::{Expression, VariableKey};
pub use integration::{ConvexIntegration, Integrations, ModelSolver, SolverIntegration};
pub use options::{ModelOptions, ModelOptionsBuilder, Sense};
pub use presolve::{Categories, PresolveRule, PresolveRules};
pub use result::{BoundSide, Entity, ModelResult, RowOrigin};
pub use variable::Variable;
