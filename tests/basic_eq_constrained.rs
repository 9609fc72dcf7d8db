#![allow(non_snake_case)]

use mathprog::{algebra::*, solver::*};

fn eq_constrained_data() -> ConvexData<f64> {
    // minimise x² + y² subject to x + y = 1
    let mut Q = Matrix::identity(2);
    Q.scale(2.);
    let AE = Matrix::from(&[[1., 1.]]);
    ConvexData::equality_constrained(Q, vec![0., 0.], AE, vec![1.]).unwrap()
}

#[test]
fn test_eq_constrained_feasible() {
    let data = eq_constrained_data();

    let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());
    assert!(matches!(solver, ConvexSolverEngine::Equality(_)));
    let result = solver.solve(None);

    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.dist(&[0.5, 0.5]) <= 1e-9);
    assert!(f64::abs(result.value - 0.5) <= 1e-9);
    assert_eq!(result.iterations, 1);

    // Q x + AE' λ = 0
    let multipliers = result.multipliers.unwrap();
    assert!(f64::abs(multipliers.equalities[0] + 1.) <= 1e-9);
}

#[test]
fn test_eq_constrained_primal_infeasible() {
    let mut Q = Matrix::identity(2);
    Q.scale(2.);
    // x + y = 1 and x + y = 2
    let AE = Matrix::from(&[[1., 1.], [1., 1.]]);
    let data = ConvexData::equality_constrained(Q, vec![0., 0.], AE, vec![1., 2.]).unwrap();

    let result = ConvexSolverEngine::new(data, ConvexSettings::default()).solve(None);

    assert_eq!(result.state, SolverState::Infeasible);
}

#[test]
fn test_eq_constrained_unbounded() {
    // minimise x subject to x + y = 1
    let AE = Matrix::from(&[[1., 1.]]);
    let data =
        ConvexData::equality_constrained(Matrix::zeros((2, 2)), vec![1., 0.], AE, vec![1.]).unwrap();

    let result = ConvexSolverEngine::new(data, ConvexSettings::default()).solve(None);

    assert_eq!(result.state, SolverState::Unbounded);
}

#[test]
fn test_eq_constrained_validation() {
    let mut Q = Matrix::identity(2);
    Q.scale(2.);
    // rank deficient equality rows
    let AE = Matrix::from(&[[1., 1.], [2., 2.]]);
    let data = ConvexData::equality_constrained(Q, vec![0., 0.], AE, vec![1., 2.]).unwrap();

    let settings = ConvexSettingsBuilder::default()
        .validate(true)
        .build()
        .unwrap();
    let result = ConvexSolverEngine::new(data, settings).solve(None);

    assert_eq!(result.state, SolverState::Invalid);
}
