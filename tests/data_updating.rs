#![allow(non_snake_case)]

use mathprog::{algebra::*, model::*, solver::*};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn updating_test_data() -> ConvexData<f64> {
    // minimise x² + y² subject to -1 <= x <= 1, -1 <= y <= 1, x + y >= 1
    let mut Q = Matrix::identity(2);
    Q.scale(2.);
    let AI = Matrix::from(&[[-1., 0.], [0., -1.], [1., 0.], [0., 1.], [-1., -1.]]);
    let BI = vec![1., 1., 1., 1., -1.];
    ConvexData::new(Q, vec![0.; 2], Matrix::zeros((0, 2)), vec![], AI, BI).unwrap()
}

#[test]
fn test_update_rhs() {
    let mut solver = ConvexSolverEngine::new(updating_test_data(), ConvexSettings::default());
    let result = solver.solve(None);
    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.dist(&[0.5, 0.5]) <= 1e-9);

    // x <= 0.25
    solver.update_inequality_rhs(2, 0.25).unwrap();
    let result = solver.solve(None);
    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.dist(&[0.25, 0.75]) <= 1e-9);

    // x + y >= 3 cannot be met
    solver.update_inequality_rhs(4, -3.).unwrap();
    let result = solver.solve(None);
    assert_eq!(result.state, SolverState::Infeasible);

    assert!(solver.update_inequality_rhs(5, 0.).is_err());
}

#[test]
fn test_update_settings() {
    let mut solver = ConvexSolverEngine::new(updating_test_data(), ConvexSettings::default());

    let mut settings = solver.settings().clone();
    settings.tol_feas = 1e-8;
    assert!(solver.update_settings(settings.clone()).is_ok());

    // the solver variant cannot change once selected
    settings.iterative = Some(true);
    assert_eq!(
        solver.update_settings(settings),
        Err(SettingsError::ImmutableSetting("iterative"))
    );
}

fn close(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < dec!(0.000001)
}

#[test]
fn test_update_model_bounds() {
    // minimise (x-3)² + (y-3)² with x, y in [0, 10] and x + y <= 4
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).upper(10).index();
    let y = model.add_variable("y").lower(0).upper(10).index();
    model
        .add_expression("objective")
        .unwrap()
        .set_quadratic(x, x, 1)
        .set_quadratic(y, y, 1)
        .set(x, -6)
        .set(y, -6)
        .weight(1);
    model.add_expression("cap").unwrap().set(x, 1).set(y, 1).upper(4);

    let mut solver = model.prepare(Sense::Minimise).unwrap();
    let result = solver.solve(None).unwrap();
    assert!(result.state.is_optimal());
    assert!(close(result.values[x], dec!(2)));
    assert!(close(result.values[y], dec!(2)));

    let cap = RowOrigin::expression("cap", BoundSide::Upper);
    assert!(close(result.multiplier(&cap).unwrap(), dec!(2)));

    // both bound rows exist, so the update is applied in place
    assert!(solver.update(x, Some(dec!(0)), Some(dec!(1))).unwrap());
    let result = solver.solve(None).unwrap();
    assert!(close(result.values[x], dec!(1)));
    assert!(close(result.values[y], dec!(3)));

    // dropping a bound needs a rebuild
    assert!(!solver.update(x, None, Some(dec!(1))).unwrap());
    assert_eq!(
        solver.update(7, None, None).unwrap_err(),
        ModelError::UnknownVariable(7)
    );
}
