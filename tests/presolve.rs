use mathprog::model::presolve::*;
use mathprog::model::*;
use rust_decimal_macros::dec;

fn bounded_model() -> (Model, usize, usize) {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).upper(10).index();
    let y = model.add_variable("y").lower(0).upper(10).index();
    (model, x, y)
}

#[test]
fn test_presolve_crossing_bounds() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").weight(1).index();
    model.add_expression("above").unwrap().set(x, 1).lower(5);
    model.add_expression("below").unwrap().set(x, 1).upper(3);

    model.presolve();
    assert!(model.is_infeasible());

    let result = model.minimise().unwrap();
    assert_eq!(result.state, mathprog::solver::SolverState::Infeasible);
    assert!(result.value.is_none());
}

#[test]
fn test_presolve_idempotent() {
    let (mut model, x, y) = bounded_model();
    model.add_expression("cap").unwrap().set(x, 1).set(y, 1).upper(4);
    model.variable_mut(x).unwrap().weight(-1);
    model.variable_mut(y).unwrap().weight(-1);

    assert!(model.presolve());
    assert_eq!(model.variable(x).unwrap().upper_limit(), Some(dec!(4)));
    assert_eq!(model.variable(y).unwrap().upper_limit(), Some(dec!(4)));

    // nothing left to do
    assert!(!model.presolve());
}

#[test]
fn test_presolve_one_remaining_fixes() {
    let (mut model, x, _) = bounded_model();
    model.add_expression("fix").unwrap().set(x, 2).level(6);

    model.presolve();
    let var = model.variable(x).unwrap();
    assert!(var.is_fixed());
    assert_eq!(var.lower_limit(), Some(dec!(3)));
    assert_eq!(var.value(), Some(dec!(3)));
    assert!(model.expression("fix").unwrap().is_redundant());
}

#[test]
fn test_presolve_redundant_constraint() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).upper(1).weight(-1).index();
    let y = model.add_variable("y").lower(0).upper(1).weight(-1).index();
    model.add_expression("loose").unwrap().set(x, 1).set(y, 1).upper(5);

    model.presolve();
    assert!(model.expression("loose").unwrap().is_redundant());

    // dropping the constraint does not move the optimum
    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert_eq!(result.value, Some(dec!(-2)));
}

#[test]
fn test_presolve_unreferenced_variable() {
    let mut model = Model::new(ModelOptions::default());
    let z = model.add_variable("z").lower(2).upper(5).index();
    let w = model.add_variable("w").index();
    let v = model.add_variable("v").lower(-3).upper(5).index();

    model.presolve();
    assert_eq!(model.variable(z).unwrap().value(), Some(dec!(2)));
    assert_eq!(model.variable(w).unwrap().value(), Some(dec!(0)));
    assert_eq!(model.variable(v).unwrap().value(), Some(dec!(0)));
    assert!(model.variables().iter().all(|v| v.is_fixed()));
}

#[test]
fn test_presolve_objective_linearisation() {
    let (mut model, x, y) = bounded_model();
    model.add_expression("cost").unwrap().set(x, 2).set(y, 3).weight(1);
    let before = model.objective();

    model.presolve();
    let cost = model.expression("cost").unwrap();
    assert!(!cost.is_objective());
    assert_eq!(model.variable(x).unwrap().contribution_weight(), Some(dec!(2)));
    assert_eq!(model.variable(y).unwrap().contribution_weight(), Some(dec!(3)));

    // the aggregated objective is unchanged
    let after = model.objective();
    assert_eq!(before.get(x), after.get(x));
    assert_eq!(before.get(y), after.get(y));
}

#[test]
fn test_presolve_integer_rounding() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).integer(true).index();
    let y = model.add_variable("y").lower(0).integer(true).index();
    model.add_expression("c").unwrap().set(x, 2).set(y, 4).upper(7);

    model.presolve();
    assert!(!model.is_infeasible());
    let c = model.expression("c").unwrap();
    assert_eq!(c.upper_limit(), Some(dec!(6)));
    assert!(c.is_integer());
    assert_eq!(model.variable(x).unwrap().upper_limit(), Some(dec!(3)));
    assert_eq!(model.variable(y).unwrap().upper_limit(), Some(dec!(1)));
}

#[test]
fn test_presolve_similar_expressions_opt_in() {
    let build = |rules: PresolveRules| {
        let options = ModelOptionsBuilder::default()
            .presolve_rules(rules)
            .build()
            .unwrap();
        let mut model = Model::new(options);
        let x = model.add_variable("x").weight(-1).index();
        let y = model.add_variable("y").weight(-1).index();
        model.add_expression("a").unwrap().set(x, 1).set(y, 1).upper(4);
        model.add_expression("b").unwrap().set(x, 2).set(y, 2).upper(6);
        model.presolve();
        model
    };

    assert!(!PresolveRules::standard().contains("similar-expressions"));
    let model = build(PresolveRules::standard());
    assert!(!model.expression("b").unwrap().is_redundant());

    let model = build(PresolveRules::standard().with(SimilarExpressions));
    assert!(model.expression("b").unwrap().is_redundant());
    assert_eq!(model.expression("a").unwrap().upper_limit(), Some(dec!(3)));
}

#[test]
fn test_presolve_rules_ordering() {
    let rules = PresolveRules::empty()
        .with(UnreferencedVariable)
        .with(ObjectiveLinearisation)
        .with(OneRemaining);
    let orders: Vec<i32> = rules.iter().map(|r| r.order()).collect();
    assert_eq!(orders, vec![0, 20, 90]);

    let rules = rules.without("one-remaining");
    assert_eq!(rules.len(), 2);
    assert!(!rules.contains("one-remaining"));
}

#[test]
fn test_presolve_disabled() {
    let options = ModelOptionsBuilder::default()
        .presolve_enable(false)
        .build()
        .unwrap();
    let mut model = Model::new(options);
    let x = model.add_variable("x").lower(0).index();
    model.add_expression("floor").unwrap().set(x, 1).lower(1);
    model.add_expression("objective").unwrap().set_quadratic(x, x, 1).weight(1);

    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert!(!model.expression("floor").unwrap().is_redundant());
    assert!((result.values[x] - dec!(1)).abs() < dec!(0.000001));
}

#[test]
fn test_presolve_inexact_quotient_stays_feasible() {
    // 7x = 1 has no finite decimal solution
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").index();
    model.add_expression("fix").unwrap().set(x, 7).level(1);
    model.add_expression("twice").unwrap().set(x, 14).level(2);
    model.add_expression("objective").unwrap().set_quadratic(x, x, 1).weight(1);

    model.presolve();
    assert!(!model.is_infeasible());
    let var = model.variable(x).unwrap();
    assert!(var.is_fixed());
    let level = var.value().unwrap();
    assert!((level * dec!(7) - dec!(1)).abs() < dec!(0.0000000000000001));
    assert!(model.expression("twice").unwrap().is_redundant());
    assert!(!model.expression("twice").unwrap().is_infeasible());

    let result = model.minimise().unwrap();
    assert!(result.state.is_optimal());
    assert_eq!(result.values[x], dec!(0.142857142857));
    let value = result.value.unwrap();
    assert!((value - dec!(0.0204081632653)).abs() < dec!(0.000000000001));
}

#[test]
fn test_presolve_zero_remaining() {
    let build = |upper: i32| {
        let mut model = Model::new(ModelOptions::default());
        let x = model.add_variable("x").level(2).index();
        let y = model.add_variable("y").level(3).index();
        model.add_expression("sum").unwrap().set(x, 1).set(y, 1).upper(upper);
        model.presolve();
        model
    };

    let model = build(6);
    assert!(!model.is_infeasible());
    assert!(model.expression("sum").unwrap().is_redundant());

    let model = build(4);
    assert!(model.is_infeasible());
    assert!(model.expression("sum").unwrap().is_infeasible());
}

#[test]
fn test_presolve_multiple_remaining_fixes_binary() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").binary().index();
    let y = model.add_variable("y").binary().index();
    let z = model.add_variable("z").binary().index();
    model.add_expression("knapsack").unwrap().set(x, 5).set(y, 1).set(z, 1).upper(3);

    model.presolve();
    assert!(!model.is_infeasible());
    let var = model.variable(x).unwrap();
    assert!(var.is_fixed());
    assert_eq!(var.value(), Some(dec!(0)));
    assert!(!model.variable(y).unwrap().is_fixed());
    assert!(!model.variable(z).unwrap().is_fixed());

    // the same rule from below
    let mut model = Model::new(ModelOptions::default());
    let a = model.add_variable("a").binary().index();
    let b = model.add_variable("b").binary().index();
    let c = model.add_variable("c").binary().index();
    model.add_expression("cover").unwrap().set(a, -5).set(b, -1).set(c, -1).lower(-3);

    model.presolve();
    assert_eq!(model.variable(a).unwrap().value(), Some(dec!(0)));
    assert!(!model.variable(b).unwrap().is_fixed());
}

#[test]
fn test_presolve_redundancy_is_sound() {
    let mut model = Model::new(ModelOptions::default());
    let x = model.add_variable("x").lower(0).upper(2).weight(1).index();
    let y = model.add_variable("y").lower(-1).upper(1).weight(1).index();
    let z = model.add_variable("z").lower(1).upper(3).weight(1).index();
    model.add_expression("a").unwrap().set(x, 1).set(y, 1).set(z, 1).upper(10);
    model.add_expression("b").unwrap().set(x, 2).set(y, -1).lower(-1);
    model.add_expression("c").unwrap().set(x, 1).set(z, -1).lower(-3).upper(1);
    model.add_expression("d").unwrap().set(x, 1).set(y, 1).upper(1);
    model.add_expression("e").unwrap().set(x, -1).set(z, 3).upper(9);

    model.presolve();
    assert!(!model.is_infeasible());

    // corners and midpoints of every variable's own bounds
    let points = |j: usize| {
        let v = model.variable(j).unwrap();
        let (l, u) = (v.lower_limit().unwrap(), v.upper_limit().unwrap());
        vec![l, (l + u) / dec!(2), u]
    };
    let mut samples = Vec::new();
    for &vx in points(x).iter() {
        for &vy in points(y).iter() {
            for &vz in points(z).iter() {
                samples.push(vec![vx, vy, vz]);
            }
        }
    }

    let redundant: Vec<_> = model
        .expressions()
        .filter(|(_, e)| e.is_redundant())
        .collect();
    assert!(redundant.len() >= 4);
    for (name, expr) in redundant {
        for values in samples.iter() {
            let v = expr.evaluate(values);
            assert!(expr.lower_limit().map_or(true, |l| v >= l), "{name} below at {values:?}");
            assert!(expr.upper_limit().map_or(true, |u| v <= u), "{name} above at {values:?}");
        }
    }
}
