use super::core::SolverCore;
use super::kkt::{solve_kkt, stationarity_residual, validate_structure, QFactor, QMode};
use super::ConvexSolver;
use crate::algebra::*;
use crate::solver::linear::{LinearSettings, SimplexSolver};
use crate::solver::{ConvexData, ConvexSettings, Multipliers, SolveResult, SolverState};

/// Minimises `½x'Qx + C'x` subject to `AE*x = BE` with a single KKT solve.
///
/// The Schur complement path is used when `Q` factors.  Otherwise, or if
/// that path fails, the full KKT matrix is factored.   Problems with a
/// vanishing `Q` that the KKT system cannot settle are handed to the
/// simplex solver.
#[derive(Debug)]
pub struct EqualityConstrainedSolver<T>
where
    T: FloatT,
{
    core: SolverCore<T>,
}

impl<T> EqualityConstrainedSolver<T>
where
    T: FloatT,
{
    pub fn new(data: ConvexData<T>, settings: ConvexSettings<T>) -> Self {
        Self {
            core: SolverCore::new(data, settings, "equality"),
        }
    }

    fn linear_fallback(&self) -> (SolverState, Vec<T>, Option<Multipliers<T>>) {
        let data = &self.core.data;
        let lp = LinearSettings::from_convex(&self.core.settings);
        let result = SimplexSolver::from_convex_data(&data.C, data, lp).solve();
        (result.state, result.x, None)
    }

    fn compute(&self) -> (SolverState, Vec<T>, Option<Multipliers<T>>) {
        let data = &self.core.data;
        let settings = &self.core.settings;
        let (n, me) = (data.nvars(), data.neq());

        if settings.validate && !validate_structure(data, settings) {
            return (SolverState::Invalid, vec![T::nan(); n], None);
        }

        let qf = QFactor::analyse(&data.Q, settings);

        // from the origin the step is the solution
        let mut x = vec![T::zero(); n];
        let mut lambda = vec![T::zero(); me];
        let solved = solve_kkt(
            &qf,
            data,
            &data.AE,
            &data.C,
            &data.BE,
            &mut x,
            &mut lambda,
            settings,
        );

        if !solved {
            if qf.mode == QMode::Zero {
                return self.linear_fallback();
            }
            let lp = LinearSettings::from_convex(settings);
            let state = match SimplexSolver::from_convex_data(&data.C, data, lp).feasible_point() {
                Err(SolverState::Infeasible) => SolverState::Infeasible,
                _ => SolverState::Failed,
            };
            return (state, vec![T::nan(); n], None);
        }

        let scale = T::one() + data.C.norm_inf();
        let stationary = stationarity_residual(data, &x, &lambda, &[]) <= settings.tol_feas.sqrt() * scale;
        if !stationary || !data.is_feasible(&x, settings.tol_feas.sqrt()) {
            return match qf.mode {
                QMode::Zero => self.linear_fallback(),
                QMode::Patched(_) | QMode::Indefinite => {
                    (SolverState::Unbounded, vec![T::nan(); n], None)
                }
                QMode::Definite => (SolverState::Failed, vec![T::nan(); n], None),
            };
        }

        let multipliers = Multipliers {
            equalities: lambda,
            inequalities: vec![],
        };
        (SolverState::Optimal, x, Some(multipliers))
    }
}

impl<T> ConvexSolver<T> for EqualityConstrainedSolver<T>
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
        let (state, x, multipliers) = self.compute();
        self.core.info.iterations = 1;
        self.core.report();
        self.core.finish(timers, state, x, multipliers)
    }
}

#[test]
fn test_equality_constrained() {
    // min x² + y²  s.t. x + y = 1
    let Q = Matrix::from(&[[2., 0.], [0., 2.]]);
    let AE = Matrix::from(&[[1., 1.]]);
    let data = ConvexData::equality_constrained(Q, vec![0., 0.], AE, vec![1.]).unwrap();
    let result = EqualityConstrainedSolver::new(data, ConvexSettings::default()).solve(None);
    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.norm_inf_diff(&[0.5, 0.5]) < 1e-12);
    let mult = result.multipliers.unwrap();
    assert!(f64::abs(mult.equalities[0] + 1.) < 1e-12);

    // linear objective along a line is unbounded
    let AE = Matrix::from(&[[1., -1.]]);
    let data = ConvexData::equality_constrained(Matrix::zeros((2, 2)), vec![1., 0.], AE, vec![0.])
        .unwrap();
    let result = EqualityConstrainedSolver::new(data, ConvexSettings::default()).solve(None);
    assert_eq!(result.state, SolverState::Unbounded);
}
