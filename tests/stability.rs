#![allow(non_snake_case)]

use mathprog::{algebra::*, solver::*};

fn badly_scaled_data() -> ConvexData<f64> {
    // constraint rows differ by eight orders of magnitude
    let mut Q = Matrix::identity(3);
    Q.scale(2.);
    let C = vec![-2., -4., -6.];
    let AE = Matrix::from(&[[1e4, 1e4, 1e4]]);
    let AI = Matrix::from(&[[1e-4, 0., 0.], [0., -1e-4, 0.]]);
    ConvexData::new(Q, C, AE, vec![3e4], AI, vec![1e-4, -1e-4]).unwrap()
}

fn solve_with(settings: ConvexSettings<f64>) -> SolveResult<f64> {
    ConvexSolverEngine::new(badly_scaled_data(), settings).solve(None)
}

#[test]
fn test_schur_scaling_does_not_move_optimum() {
    let reference = solve_with(ConvexSettings::default());
    assert_eq!(reference.state, SolverState::Optimal);

    let settings = ConvexSettingsBuilder::default()
        .schur_scaling_enable(false)
        .build()
        .unwrap();
    let unscaled = solve_with(settings);
    assert_eq!(unscaled.state, SolverState::Optimal);
    assert!(unscaled.x.dist(&reference.x) <= 1e-6);
}

#[test]
fn test_dual_regularization_does_not_move_optimum() {
    let reference = solve_with(ConvexSettings::default());

    let settings = ConvexSettingsBuilder::default()
        .dual_regularization_enable(true)
        .build()
        .unwrap();
    let regularized = solve_with(settings);
    assert_eq!(regularized.state, SolverState::Optimal);
    assert!(regularized.x.dist(&reference.x) <= 1e-6);
    assert!(f64::abs(regularized.value - reference.value) <= 1e-6);
}

#[test]
fn test_badly_scaled_solution() {
    // minimise ||x - (1,2,3)||² with x1 + x2 + x3 = 3, x1 <= 1, x2 >= 1
    let result = solve_with(ConvexSettings::default());
    assert_eq!(result.state, SolverState::Optimal);
    assert!(data_feasible(&result.x));
    assert!(result.x.dist(&[0., 1., 2.]) <= 1e-6);
}

fn data_feasible(x: &[f64]) -> bool {
    badly_scaled_data().is_feasible(x, 1e-8)
}
