#![allow(non_snake_case)]

#[cfg(test)]
mod warm_start_tests {
    use mathprog::algebra::*;
    use mathprog::model::*;
    use mathprog::solver::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn warm_start_data() -> ConvexData<f64> {
        // minimise 3x² + 2y² - x - 4y subject to x = 2y, |x|, |y| <= 1
        let Q = Matrix::from(&[[6., 0.], [0., 4.]]);
        let C = vec![-1., -4.];
        let AE = Matrix::from(&[[1., -2.]]);
        let AI = Matrix::from(&[[1., 0.], [0., 1.], [-1., 0.], [0., -1.]]);
        ConvexData::new(Q, C, AE, vec![0.], AI, vec![1.; 4]).unwrap()
    }

    #[test]
    fn test_warm_start_basic() {
        let mut solver = ConvexSolverEngine::new(warm_start_data(), ConvexSettings::default());
        let cold = solver.solve(None);
        assert_eq!(cold.state, SolverState::Optimal);

        // starting from the solution needs no more work than a cold start
        let warm = solver.solve(Some(&cold.x));
        assert_eq!(warm.state, SolverState::Optimal);
        assert!(warm.x.dist(&cold.x) <= 1e-9);
        assert!(warm.iterations <= cold.iterations);
    }

    #[test]
    fn test_warm_start_infeasible_point() {
        let mut solver = ConvexSolverEngine::new(warm_start_data(), ConvexSettings::default());
        let cold = solver.solve(None);

        // an infeasible starting point is ignored
        let warm = solver.solve(Some(&[5., -5.]));
        assert_eq!(warm.state, SolverState::Optimal);
        assert!(warm.x.dist(&cold.x) <= 1e-9);
    }

    fn box_model() -> (Model, usize, usize) {
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
        (model, x, y)
    }

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000001)
    }

    #[test]
    fn test_model_warm_start() {
        let (mut model, x, y) = box_model();
        let mut solver = model.prepare(Sense::Minimise).unwrap();

        let result = solver.solve(Some(&[dec!(1), dec!(1)])).unwrap();
        assert!(result.state.is_optimal());
        assert!(close(result.values[x], dec!(2)));
        assert!(close(result.values[y], dec!(2)));

        let err = solver.solve(Some(&[dec!(1)])).unwrap_err();
        assert_eq!(
            err,
            ModelError::StartingPointLength {
                expected: 2,
                found: 1
            }
        );

        solver.dispose();
        assert_eq!(solver.solve(None).unwrap_err(), ModelError::Disposed);
    }
}
