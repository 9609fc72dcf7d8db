#![allow(non_snake_case)]

use mathprog::{algebra::*, solver::*};

fn basic_qp_data() -> ConvexData<f64> {
    // Q = [4. 1;1 2]
    let Q = Matrix::from(&[[4., 1.], [1., 2.]]);
    let C = vec![1., 1.];

    // A = [1. 1;1 0; 0 1]; AI = [-A;A]
    let AI = Matrix::from(&[
        [-1., -1.],
        [-1., 0.],
        [0., -1.],
        [1., 1.],
        [1., 0.],
        [0., 1.],
    ]);
    let BI = vec![-1., 0., 0., 1., 0.7, 0.7];

    ConvexData::new(Q, C, Matrix::zeros((0, 2)), vec![], AI, BI).unwrap()
}

fn basic_qp_data_unbounded() -> ConvexData<f64> {
    // Q = [1. 1;1 1]
    let Q = Matrix::from(&[[1., 1.], [1., 1.]]);
    let C = vec![1., -1.];

    // AI = [1. 1;1 0]
    let AI = Matrix::from(&[[1., 1.], [1., 0.]]);
    let BI = vec![1., 1.];

    ConvexData::new(Q, C, Matrix::zeros((0, 2)), vec![], AI, BI).unwrap()
}

#[test]
fn test_qp_univariate() {
    let Q = Matrix::identity(1);
    let AI = Matrix::identity(1);
    let data = ConvexData::new(Q, vec![0.], Matrix::zeros((0, 1)), vec![], AI, vec![1.]).unwrap();

    let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Optimal);
    assert!(f64::abs(result.x[0]) <= 1e-6);
    assert!(f64::abs(result.value) <= 1e-6);
}

#[test]
fn test_qp_feasible() {
    let data = basic_qp_data();

    let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Optimal);

    let refsol = vec![0.3, 0.7];
    assert!(result.x.dist(&refsol) <= 1e-6);

    let refobj = 1.88;
    assert!(f64::abs(result.value - refobj) <= 1e-6);

    // active constraints carry non-negative multipliers
    let multipliers = result.multipliers.unwrap();
    assert!(multipliers.inequalities.iter().all(|&m| m >= -1e-9));
    assert!(multipliers.inequalities[5] > 0.);
}

#[test]
fn test_qp_feasible_iterative() {
    let data = basic_qp_data();

    let settings = ConvexSettingsBuilder::default()
        .iterative(Some(true))
        .build()
        .unwrap();
    let mut solver = ConvexSolverEngine::new(data, settings);
    assert_eq!(solver.method(), "active-set (iterative)");
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.dist(&[0.3, 0.7]) <= 1e-6);
}

#[test]
fn test_qp_primal_infeasible() {
    let mut data = basic_qp_data();

    // x + y >= 1 and x + y <= -1
    data.update_inequality_rhs(3, -1.).unwrap();

    let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Infeasible);
    assert!(result.value.is_nan());
}

#[test]
fn test_qp_unbounded() {
    let data = basic_qp_data_unbounded();

    let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Unbounded);
    assert_eq!(result.value, f64::NEG_INFINITY);
}

#[test]
fn test_qp_unbounded_single_row() {
    let data = basic_qp_data_unbounded();

    // AI = [1, 1], a single row
    let AI = Matrix::from(&[[1., 1.]]);
    let data = ConvexData::new(data.Q, data.C, data.AE, data.BE, AI, vec![1.]).unwrap();

    let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Unbounded);
}

#[test]
fn test_qp_mixed_constraints() {
    // minimise x² + y² + z² subject to x + y + z = 3, x >= 1.5
    let Q = Matrix::identity(3);
    let mut Q2 = Q.clone();
    Q2.scale(2.);
    let AE = Matrix::from(&[[1., 1., 1.]]);
    let AI = Matrix::from(&[[-1., 0., 0.]]);
    let data = ConvexData::new(Q2, vec![0.; 3], AE, vec![3.], AI, vec![-1.5]).unwrap();

    let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.dist(&[1.5, 0.75, 0.75]) <= 1e-6);
    let multipliers = result.multipliers.unwrap();
    assert!(multipliers.inequalities[0] > 0.);
}
