use super::core::SolverCore;
use super::kkt::{stationarity_residual, validate_structure, QFactor, QMode};
use super::ConvexSolver;
use crate::algebra::*;
use crate::solver::{ConvexData, ConvexSettings, Multipliers, SolveResult, SolverState};

/// Minimises `½x'Qx + C'x` with no constraints.
///
/// A zero `Q` is optimal at the origin when `C` vanishes and unbounded
/// otherwise.  A semidefinite `Q` is solved with a diagonal patch and the
/// answer accepted only if it satisfies stationarity for the unpatched
/// problem.
#[derive(Debug)]
pub struct UnconstrainedSolver<T>
where
    T: FloatT,
{
    core: SolverCore<T>,
}

impl<T> UnconstrainedSolver<T>
where
    T: FloatT,
{
    pub fn new(data: ConvexData<T>, settings: ConvexSettings<T>) -> Self {
        Self {
            core: SolverCore::new(data, settings, "unconstrained"),
        }
    }

    fn compute(&self) -> (SolverState, Vec<T>) {
        let data = &self.core.data;
        let settings = &self.core.settings;
        let n = data.nvars();

        if settings.validate && !validate_structure(data, settings) {
            return (SolverState::Invalid, vec![T::nan(); n]);
        }

        let qf = QFactor::analyse(&data.Q, settings);
        let cnorm = data.C.norm_inf();

        match qf.mode {
            QMode::Zero => {
                if cnorm <= settings.tol_feas {
                    (SolverState::Optimal, vec![T::zero(); n])
                } else {
                    (SolverState::Unbounded, vec![T::nan(); n])
                }
            }
            QMode::Indefinite => (SolverState::Unbounded, vec![T::nan(); n]),
            QMode::Definite | QMode::Patched(_) => {
                let mut x = data.C.clone();
                if !qf.solve(&mut x) {
                    return (SolverState::Failed, vec![T::nan(); n]);
                }
                x.negate();
                if qf.is_patched() {
                    let res = stationarity_residual(data, &x, &[], &[]);
                    if res > settings.tol_feas.sqrt() * (T::one() + cnorm) {
                        return (SolverState::Unbounded, vec![T::nan(); n]);
                    }
                }
                (SolverState::Optimal, x)
            }
        }
    }
}

impl<T> ConvexSolver<T> for UnconstrainedSolver<T>
where
    T: FloatT,
{
    fn core(&self) -> &SolverCore<T> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SolverCore<T> {
        &mut self.core
    }

    fn solve(&mut self, _start: Option<&[T]>) -> SolveResult<T> {
        let timers = self.core.begin();
        let (state, x) = self.compute();
        self.core.info.iterations = 1;
        self.core.report();
        let multipliers = state.is_feasible().then(|| Multipliers::zeros(0, 0));
        self.core.finish(timers, state, x, multipliers)
    }
}

#[test]
fn test_unconstrained() {
    let Q = Matrix::from(&[[2., 0.], [0., 4.]]);
    let data = ConvexData::unconstrained(Q, vec![-2., -4.]).unwrap();
    let mut solver = UnconstrainedSolver::new(data, ConvexSettings::default());
    let result = solver.solve(None);
    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.norm_inf_diff(&[1., 1.]) < 1e-12);
    assert!(f64::abs(result.value + 3.) < 1e-12);

    // semidefinite with C in the range of Q
    let Q = Matrix::from(&[[1., 0.], [0., 0.]]);
    let data = ConvexData::unconstrained(Q.clone(), vec![-1., 0.]).unwrap();
    let result = UnconstrainedSolver::new(data, ConvexSettings::default()).solve(None);
    assert_eq!(result.state, SolverState::Optimal);
    assert!(f64::abs(result.x[0] - 1.) < 1e-9);

    // semidefinite with C outside the range of Q
    let data = ConvexData::unconstrained(Q, vec![-1., 1.]).unwrap();
    let result = UnconstrainedSolver::new(data, ConvexSettings::default()).solve(None);
    assert_eq!(result.state, SolverState::Unbounded);
}
