use mathprog::model::*;
use mathprog::solver::SolverState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn close(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < dec!(0.000001)
}

#[test]
fn test_model_qp() {
    // minimise x² + y² subject to x + y >= 1
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").index();
    let y = model.add_variable("y").index();
    model
        .add_expression("objective")
        .unwrap()
        .set_quadratic(x, x, 1)
        .set_quadratic(y, y, 1)
        .weight(1);
    model.add_expression("sum").unwrap().set(x, 1).set(y, 1).lower(1);

    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert!(close(result.values[x], dec!(0.5)));
    assert!(close(result.values[y], dec!(0.5)));
    assert!(close(result.value.unwrap(), dec!(0.5)));

    let sum = RowOrigin::expression("sum", BoundSide::Lower);
    let mu = result.multiplier(&sum).unwrap();
    assert!(close(mu, dec!(1)));

    // solution values are written back to the variables
    assert!(close(model.variable(x).unwrap().value().unwrap(), dec!(0.5)));
}

#[test]
fn test_model_unbounded() {
    // minimise -x
    let mut model = Model::new(ModelOptions::default());
    model.add_variable("x").weight(-1);

    let result = model.minimise().unwrap();
    assert_eq!(result.state, SolverState::Unbounded);
    assert!(result.values.is_empty());
}

#[test]
fn test_model_maximise() {
    // maximise x + y with x in [0, 2] and y in [0, 3]
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).upper(2).weight(1).index();
    let y = model.add_variable("y").lower(0).upper(3).weight(1).index();

    let result = model.maximise().unwrap();
    assert!(result.state.is_optimal());
    assert_eq!(result.value, Some(dec!(5)));
    assert_eq!(result.values[x], dec!(2));
    assert_eq!(result.values[y], dec!(3));
}

#[test]
fn test_model_equality() {
    // minimise x² + y² + z² subject to x + 2y + 3z = 14
    let mut model = Model::new(ModelOptions::default());
    let v: Vec<usize> = ["x", "y", "z"]
        .iter()
        .map(|n| model.add_variable(*n).index())
        .collect();
    let objective = model.add_expression("objective").unwrap();
    for &j in v.iter() {
        objective.set_quadratic(j, j, 1);
    }
    objective.weight(1);
    model
        .add_expression("plane")
        .unwrap()
        .set(v[0], 1)
        .set(v[1], 2)
        .set(v[2], 3)
        .level(14);

    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert!(close(result.values[v[0]], dec!(1)));
    assert!(close(result.values[v[1]], dec!(2)));
    assert!(close(result.values[v[2]], dec!(3)));
}

#[test]
fn test_model_with_fixed_variables() {
    // y is fixed, so x² + xy is linear in x
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").index();
    let y = model.add_variable("y").level(-4).index();
    model
        .add_expression("objective")
        .unwrap()
        .set_quadratic(x, x, 1)
        .set_quadratic(x, y, 1)
        .weight(1);

    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert!(close(result.values[x], dec!(2)));
    assert_eq!(result.values[y], dec!(-4));
    assert!(close(result.value.unwrap(), dec!(-4)));
}

#[test]
fn test_model_all_fixed() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").level(1).weight(2).index();
    model.add_expression("e").unwrap().set(x, 1).upper(3);

    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert_eq!(result.value, Some(dec!(2)));
}

#[test]
fn test_model_integer_needs_relaxation() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).upper(5).integer(true).index();
    model.add_expression("objective").unwrap().set_quadratic(x, x, 1).set(x, -5).weight(1);

    assert_eq!(model.minimise().unwrap_err(), ModelError::NoCapableIntegration);

    model.relax();
    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert!(close(result.values[x], dec!(2.5)));
}

#[test]
fn test_model_without_integrations() {
    let options = ModelOptionsBuilder::default()
        .integrations(Integrations::empty())
        .build()
        .unwrap();
    let mut model = Model::new(options);
    model.add_variable("x").lower(0).weight(1);

    assert_eq!(model.minimise().unwrap_err(), ModelError::NoCapableIntegration);
}

#[test]
fn test_model_bad_scaling() {
    // 1e-8 x >= 1e-8 with presolve off, so the row reaches the solver
    let options = ModelOptionsBuilder::default()
        .presolve_enable(false)
        .build()
        .unwrap();
    let mut model = Model::new(options);
    let x = model.add_variable("x").index();
    model.add_expression("objective").unwrap().set_quadratic(x, x, 1).weight(1);
    model
        .add_expression("tiny")
        .unwrap()
        .set(x, dec!(0.00000001))
        .lower(dec!(0.00000001));

    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert!(close(result.values[x], dec!(1)));

    // multipliers are reported against the unscaled row
    let tiny = RowOrigin::expression("tiny", BoundSide::Lower);
    let mu = result.multiplier(&tiny).unwrap();
    assert!((mu / dec!(200000000) - dec!(1)).abs() < dec!(0.000001));
}
