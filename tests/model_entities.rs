use mathprog::model::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

#[test]
fn test_variable_bounds_normalised() {
    let mut model = Model::new(ModelOptions::default());
    let var = model.add_variable("x").lower(-1e20).upper(2.5);

    // a huge magnitude means no limit
    assert_eq!(var.lower_limit(), None);
    assert_eq!(var.upper_limit(), Some(dec!(2.5)));
    assert!(!var.is_lower_limited());
    assert!(var.is_upper_limited());

    // tiny magnitudes collapse to zero, exact decimals are kept
    var.lower(1e-20).upper(Decimal::new(1, 20));
    assert_eq!(var.lower_limit(), Some(Decimal::ZERO));
    assert_eq!(var.upper_limit(), Some(Decimal::new(1, 20)));

    var.lower(None::<f64>);
    assert_eq!(var.lower_limit(), None);
}

#[test]
fn test_variable_level_and_binary() {
    let mut model = Model::new(ModelOptions::default());
    let var = model.add_variable("b").binary();
    assert!(var.is_binary());
    assert!(var.is_integer());
    assert!(var.is_positive());

    var.level(1);
    assert!(var.is_fixed());
    assert_eq!(var.value(), Some(dec!(1)));

    var.relax();
    assert!(!var.is_integer());
}

#[test]
fn test_validation() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).upper(1).index();
    model.add_expression("e").unwrap().set(x, 1).lower(1).upper(2);
    assert!(model.validate());

    model.expression_mut("e").unwrap().lower(3);
    assert!(!model.expression("e").unwrap().validate());
    assert!(!model.validate());

    // an invalid model is infeasible once simplified
    let result = model.minimise().unwrap();
    assert_eq!(result.state, mathprog::solver::SolverState::Infeasible);
    assert!(model.is_infeasible());
}

#[test]
fn test_unknown_variable() {
    let mut model = Model::new(ModelOptions::default());
    model.add_variable("x");
    model.add_expression("e").unwrap().set(4, 1).upper(1);

    assert!(!model.validate());
    assert_eq!(model.minimise().unwrap_err(), ModelError::UnknownVariable(4));
}

#[test]
fn test_duplicate_expression() {
    let mut model = Model::new(ModelOptions::default());
    model.add_expression("e").unwrap();
    let err = model.add_expression("e").unwrap_err();
    assert_eq!(err, ModelError::DuplicateExpression("e".to_string()));
}

#[test]
fn test_expression_copies() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").index();
    let y = model.add_variable("y").index();
    let expr = model.add_expression("e").unwrap();
    expr.set(x, 2).set(y, 3).set_quadratic(x, y, 1).constant(4);

    let shallow = expr.shallow_copy("shallow");
    assert!(shallow.linear().is_shared_with(expr.linear()));
    assert_eq!(shallow.name(), "shallow");

    let mut deep = expr.deep_copy("deep");
    assert!(!deep.linear().is_shared_with(expr.linear()));

    // writes do not leak between copies
    deep.set(x, 5);
    assert_eq!(deep.get(x), dec!(5));
    assert_eq!(expr.get(x), dec!(2));

    let mut shallow = shallow;
    shallow.set(y, 0);
    assert_eq!(shallow.get(y), Decimal::ZERO);
    assert_eq!(expr.get(y), dec!(3));
    assert!(!shallow.linear().is_shared_with(expr.linear()));
}

#[test]
fn test_expression_evaluate() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").index();
    let y = model.add_variable("y").index();
    let expr = model.add_expression("e").unwrap();
    expr.set(x, 2).set(y, -1).set_quadratic(x, y, dec!(0.5)).constant(1);

    assert!(expr.is_quadratic());
    assert!(!expr.is_linear());
    // 1 + 2*2 - 3 + 0.5*2*3
    assert_eq!(expr.evaluate(&[dec!(2), dec!(3)]), dec!(5));
    let vars: BTreeSet<usize> = expr.variables().collect();
    assert_eq!(vars, BTreeSet::from([x, y]));
}

#[test]
fn test_objective_aggregation() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").weight(3).index();
    let y = model.add_variable("y").index();
    model.add_expression("a").unwrap().set(x, 1).set(y, 2).weight(2);
    model
        .add_expression("b")
        .unwrap()
        .set_quadratic(y, y, 1)
        .constant(5)
        .weight(-1);
    // constraints without weight stay out of the objective
    model.add_expression("c").unwrap().set(x, 10).upper(1);

    let objective = model.objective();
    assert_eq!(objective.get(x), dec!(5));
    assert_eq!(objective.get(y), dec!(4));
    assert_eq!(objective.get_quadratic(y, y), dec!(-1));
    assert_eq!(objective.constant_value(), dec!(-5));

    assert_eq!(model.constraints().count(), 1);
}

#[test]
fn test_categories() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).index();
    let y = model.add_variable("y").upper(0).index();
    let z = model.add_variable("z").integer(true).index();
    let w = model.add_variable("w").level(2).index();

    let categories = model.categories();
    assert!(categories.positive.contains(&x));
    assert!(categories.negative.contains(&y));
    assert!(categories.integer.contains(&z));
    assert_eq!(categories.fixed.get(&w), Some(&dec!(2)));
    assert!(!categories.free.contains(&w));
}

#[test]
fn test_model_options_validation() {
    let options = ModelOptionsBuilder::default().presolve_max_sweeps(0).build();
    assert!(options.is_err());

    let limits = Limits {
        largest: dec!(1),
        smallest: dec!(2),
    };
    assert!(ModelOptionsBuilder::default().limits(limits).build().is_err());
}
