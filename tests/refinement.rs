#![allow(non_snake_case)]

use mathprog::{algebra::*, solver::*};

fn refinement_data() -> ConvexData<f64> {
    // minimise (x - 1/3)² + (y - 2/3)² subject to x + y <= 0.1, x >= 0
    let mut Q = Matrix::identity(2);
    Q.scale(2.);
    let C = vec![-2. / 3., -4. / 3.];
    let AI = Matrix::from(&[[1., 1.], [-1., 0.]]);
    ConvexData::new(Q, C, Matrix::zeros((0, 2)), vec![], AI, vec![0.1, 0.]).unwrap()
}

#[test]
fn test_extended_precision_selected() {
    let settings = ConvexSettingsBuilder::default()
        .extended_precision_enable(true)
        .build()
        .unwrap();
    let solver = ConvexSolverEngine::new(refinement_data(), settings);
    assert!(matches!(solver, ConvexSolverEngine::ExtendedPrecision(_)));
    assert_eq!(solver.method(), "extended precision");
}

#[test]
fn test_extended_precision_agrees() {
    let plain = ConvexSolverEngine::new(refinement_data(), ConvexSettings::default()).solve(None);
    assert_eq!(plain.state, SolverState::Optimal);

    let settings = ConvexSettingsBuilder::default()
        .extended_precision_enable(true)
        .build()
        .unwrap();
    let refined = ConvexSolverEngine::new(refinement_data(), settings).solve(None);
    assert!(refined.state.is_feasible());
    assert!(refined.x.dist(&plain.x) <= 1e-9);

    // stationarity holds tightly after refinement
    let m = refined.multipliers.unwrap();
    let data = refinement_data();
    let mut g = vec![0.; 2];
    data.gradient(&refined.x, &mut g);
    for j in 0..2 {
        let r = g[j] + m.inequalities[0] * data.AI[(0, j)] + m.inequalities[1] * data.AI[(1, j)];
        assert!(f64::abs(r) <= 1e-12);
    }
}

#[test]
fn test_extended_precision_separate_zoom() {
    let settings = ConvexSettingsBuilder::default()
        .extended_precision_enable(true)
        .extended_precision_combined_zoom(false)
        .build()
        .unwrap();
    let result = ConvexSolverEngine::new(refinement_data(), settings).solve(None);
    assert!(result.state.is_feasible());
    assert!(result.x[0] + result.x[1] <= 0.1 + 1e-12);
}
