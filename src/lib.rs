//! __mathprog__ is a mathematical programming library built around an
//! expression-based model and an active-set solver for convex quadratic
//! problems.
//!
//! Models are assembled from [variables](model::Variable) and named
//! [expressions](model::Expression) holding exact decimal coefficients.
//! Bounds on an expression turn it into a constraint and a weight adds it
//! to the objective.   Before solving, a [presolve](model::presolve) pass
//! fixes variables, tightens bounds and drops redundant constraints.
//! What remains is scaled and handed to a numeric solver that handles
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T Q x + C^T x\\\\\[2ex\]
//!  \text{subject to} & A_E x = B_E \\\\\[1ex\]
//!         & A_I x \le B_I
//!  \end{array}
//! $$
//!
//! with $Q$ symmetric positive semidefinite.
//!
//! ## Features
//!
//! * __Solver selection__: unconstrained and equality constrained problems
//!   are solved directly.   Problems with inequalities use a primal
//!   active-set method, with either a dense Schur complement
//!   factorization or a conjugate gradient Schur solve for large problems.
//!
//! * __Numerical safeguards__: Schur complement scaling, dual
//!   regularization and an optional extended precision refinement loop
//!   that corrects a floating point solution in decimal arithmetic.
//!
//! * __Results as data__: infeasible, unbounded and failed solves are
//!   reported through [`SolverState`](solver::SolverState), never as
//!   errors.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod model;
pub mod solver;
pub mod timers;
