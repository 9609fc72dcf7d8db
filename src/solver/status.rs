use crate::algebra::FloatT;

/// Solution quality reported by every solver.
///
/// States are ordered from "nothing known" through the failure states to
/// increasingly good solutions.  A solve never raises an error for any of
/// these outcomes; they are returned as data in a [`SolveResult`].

#[repr(u32)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Copy, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverState {
    /// The solver has not run.
    #[default]
    Unexplored,
    /// Structural validation of the problem data failed (symmetry,
    /// semidefiniteness or constraint rank).
    Invalid,
    /// No point satisfies the constraints.
    Infeasible,
    /// The objective is unbounded below.
    Unbounded,
    /// A numerical subsystem could not be solved and no fallback succeeded.
    Failed,
    /// The problem data passed validation but no solution has been found.
    Valid,
    /// A solution within the square root of the requested precision.
    Approximate,
    /// A feasible, but not provably optimal, solution.
    Feasible,
    /// An optimal solution.
    Optimal,
    /// An optimal solution known to be unique.
    Distinct,
}

impl SolverState {
    /// `true` for Invalid, Infeasible, Unbounded and Failed
    pub fn is_failure(&self) -> bool {
        matches!(
            *self,
            SolverState::Invalid
                | SolverState::Infeasible
                | SolverState::Unbounded
                | SolverState::Failed
        )
    }

    /// `true` if the reported solution satisfies the constraints
    pub fn is_feasible(&self) -> bool {
        matches!(
            *self,
            SolverState::Approximate
                | SolverState::Feasible
                | SolverState::Optimal
                | SolverState::Distinct
        )
    }

    pub fn is_optimal(&self) -> bool {
        matches!(*self, SolverState::Optimal | SolverState::Distinct)
    }
}

impl std::fmt::Display for SolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Lagrange multipliers, one per equality row and one per inequality row.
/// Inequality multipliers of rows outside the active set are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Multipliers<T> {
    pub equalities: Vec<T>,
    pub inequalities: Vec<T>,
}

impl<T> Multipliers<T>
where
    T: FloatT,
{
    pub fn zeros(neq: usize, nineq: usize) -> Self {
        Self {
            equalities: vec![T::zero(); neq],
            inequalities: vec![T::zero(); nineq],
        }
    }
}

/// Outcome of a numeric solve
#[derive(Debug, Clone)]
pub struct SolveResult<T> {
    /// final solver state
    pub state: SolverState,
    /// objective value at `x`
    pub value: T,
    /// primal solution
    pub x: Vec<T>,
    /// dual solution, when the solver produces one
    pub multipliers: Option<Multipliers<T>>,
    /// number of iterations
    pub iterations: u32,
    /// solve time in seconds
    pub solve_time: f64,
}

impl<T> SolveResult<T>
where
    T: FloatT,
{
    /// A result carrying no solution
    pub fn with_state(state: SolverState, n: usize) -> Self {
        Self {
            state,
            value: T::nan(),
            x: vec![T::nan(); n],
            multipliers: None,
            iterations: 0,
            solve_time: 0f64,
        }
    }
}

#[test]
fn test_state_ordering() {
    assert!(SolverState::Optimal > SolverState::Feasible);
    assert!(SolverState::Feasible > SolverState::Approximate);
    assert!(SolverState::Failed.is_failure());
    assert!(!SolverState::Valid.is_feasible());
    assert!(SolverState::Distinct.is_optimal());
}
