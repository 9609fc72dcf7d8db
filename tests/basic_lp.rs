#![allow(non_snake_case)]

use mathprog::{algebra::*, solver::linear::*, solver::*};

fn basic_lp_data() -> (Vec<f64>, Matrix<f64>, Vec<f64>) {
    // maximise x + y subject to x <= 1, y <= 2, x + y <= 2.5, x, y >= 0
    let c = vec![-1., -1.];
    let AI = Matrix::from(&[[1., 0.], [0., 1.], [1., 1.], [-1., 0.], [0., -1.]]);
    let BI = vec![1., 2., 2.5, 0., 0.];
    (c, AI, BI)
}

#[test]
fn test_lp_feasible() {
    let (c, AI, BI) = basic_lp_data();
    let AE = Matrix::zeros((0, 2));

    let mut solver = SimplexSolver::new(&c, &AE, &[], &AI, &BI, LinearSettings::default());
    let result = solver.solve();

    assert_eq!(result.state, SolverState::Optimal);
    assert!(f64::abs(result.value + 2.5) <= 1e-9);
    assert!(f64::abs(result.x[0] + result.x[1] - 2.5) <= 1e-9);
}

#[test]
fn test_lp_free_variables() {
    // minimise x - y subject to x - y >= -3, x + y = 1, with x and y free
    let c = vec![1., -1.];
    let AE = Matrix::from(&[[1., 1.]]);
    let AI = Matrix::from(&[[-1., 1.]]);

    let mut solver = SimplexSolver::new(&c, &AE, &[1.], &AI, &[3.], LinearSettings::default());
    let result = solver.solve();

    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.dist(&[-1., 2.]) <= 1e-9);
}

#[test]
fn test_lp_primal_infeasible() {
    let (c, AI, mut BI) = basic_lp_data();
    // x >= 2 against x <= 1
    BI[3] = -2.;
    let AE = Matrix::zeros((0, 2));

    let result = SimplexSolver::new(&c, &AE, &[], &AI, &BI, LinearSettings::default()).solve();

    assert_eq!(result.state, SolverState::Infeasible);
    assert!(result.value.is_nan());
}

#[test]
fn test_lp_unbounded() {
    // minimise -x - y subject to x, y >= 0
    let AI = Matrix::from(&[[-1., 0.], [0., -1.]]);
    let AE = Matrix::zeros((0, 2));

    let result =
        SimplexSolver::new(&[-1., -1.], &AE, &[], &AI, &[0., 0.], LinearSettings::default()).solve();

    assert_eq!(result.state, SolverState::Unbounded);
}

#[test]
fn test_lp_through_convex_solver() {
    // a zero Q makes the convex solver fall back to the simplex
    let (c, AI, BI) = basic_lp_data();
    let data = ConvexData::new(Matrix::zeros((2, 2)), c, Matrix::zeros((0, 2)), vec![], AI, BI).unwrap();

    let result = ConvexSolverEngine::new(data, ConvexSettings::default()).solve(None);

    assert_eq!(result.state, SolverState::Optimal);
    assert!(f64::abs(result.value + 2.5) <= 1e-9);
}
