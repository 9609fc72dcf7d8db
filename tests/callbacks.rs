#![allow(non_snake_case)]

#[cfg(test)]
mod callback_test {

    use mathprog::{algebra::*, solver::*};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    // setup a custom termination function
    fn callback_r(info: &SolverInfo<f64>) -> bool {
        // stop before the first iteration
        info.iterations == 0
    }

    fn callback_data() -> ConvexData<f64> {
        // minimise (x-2)² + (y-2)² subject to x + y <= 1, x, y >= 0
        let mut Q = Matrix::identity(2);
        Q.scale(2.);
        let AI = Matrix::from(&[[1., 1.], [-1., 0.], [0., -1.]]);
        ConvexData::new(Q, vec![-4., -4.], Matrix::zeros((0, 2)), vec![], AI, vec![1., 0., 0.])
            .unwrap()
    }

    #[test]
    fn test_callbacks() {
        let data = callback_data();

        let settings = ConvexSettings::default();
        let mut solver = ConvexSolverEngine::new(data, settings);

        solver.set_termination_callback(Box::new(callback_r));
        let result = solver.solve(None);
        assert_eq!(result.state, SolverState::Feasible);
        assert_eq!(result.iterations, 0);
        assert!(solver.data().is_feasible(&result.x, 1e-9));

        // turn it off and run again
        solver.unset_termination_callback();
        let result = solver.solve(None);
        assert_eq!(result.state, SolverState::Optimal);
        assert!(result.x.dist(&[0.5, 0.5]) <= 1e-6);
    }

    #[test]
    fn test_interrupt() {
        let data = callback_data();
        let mut solver = ConvexSolverEngine::new(data, ConvexSettings::default());

        let flag = Arc::new(AtomicBool::new(true));
        solver.set_interrupt(flag.clone());
        let result = solver.solve(None);
        assert_eq!(result.state, SolverState::Feasible);

        flag.store(false, Ordering::Relaxed);
        let result = solver.solve(None);
        assert_eq!(result.state, SolverState::Optimal);
    }

    #[test]
    fn test_iteration_limit() {
        let data = callback_data();
        let settings = ConvexSettingsBuilder::default()
            .max_iter(0)
            .build()
            .unwrap();
        let result = ConvexSolverEngine::new(data, settings).solve(None);

        assert_eq!(result.state, SolverState::Feasible);
        assert_eq!(result.iterations, 0);
    }
}
