#![allow(non_snake_case)]

use super::core::SolverCore;
use super::{ConvexSolver, ConvexSolverEngine};
use crate::algebra::*;
use crate::solver::{ConvexData, ConvexSettings, Multipliers, SolveResult, SolverState};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

/// Iterative refinement of an ordinary solve in extended precision.
///
/// Residuals of the primal and dual conditions are computed in 28 digit
/// decimal arithmetic.  Each pass solves a correction problem with the
/// same constraint structure, magnified by zoom factors so that the
/// residuals are of order one, and folds the correction back into the
/// high precision iterate.
///
/// For the correction `d` the problem is
///
/// ```text
/// minimise   ½(zd/zp) d'Qd + zd g'd
/// subject to AE*d  = zp rE
///            AI*d <= zp rI
/// ```
///
/// where `g` is the gradient and `rE`, `rI` are the equality residual and
/// inequality slack at the current iterate.  Then `x += d/zp` and the
/// correction multipliers divided by `zd` are the new multipliers.
#[derive(Debug)]
pub struct ExtendedPrecisionSolver<T>
where
    T: FloatT,
{
    core: SolverCore<T>,
}

/// Residual measures of a high precision iterate
#[derive(Debug, Clone, Copy)]
struct Residuals {
    primal: f64,
    dual: f64,
    complementarity: f64,
}

impl Residuals {
    fn worst(&self) -> f64 {
        self.primal.max(self.dual).max(self.complementarity)
    }
}

/// High precision copies of the problem data and iterate
struct Precise {
    Q: Vec<Vec<Decimal>>,
    C: Vec<Decimal>,
    AE: Vec<Vec<Decimal>>,
    BE: Vec<Decimal>,
    AI: Vec<Vec<Decimal>>,
    BI: Vec<Decimal>,
    x: Vec<Decimal>,
    lambda_eq: Vec<Decimal>,
    lambda_ineq: Vec<Decimal>,
}

fn vec_to_decimal<T: FloatT>(v: &[T]) -> Option<Vec<Decimal>> {
    v.iter().map(|&x| x.to_decimal()).collect()
}

fn mat_to_decimal<T: FloatT>(A: &Matrix<T>) -> Option<Vec<Vec<Decimal>>> {
    (0..A.nrows()).map(|i| vec_to_decimal(&A.row(i))).collect()
}

fn dot(a: &[Decimal], b: &[Decimal]) -> Option<Decimal> {
    a.iter()
        .zip(b)
        .try_fold(Decimal::ZERO, |acc, (&u, &v)| acc.checked_add(u.checked_mul(v)?))
}

fn max_abs(v: &[Decimal]) -> f64 {
    v.iter()
        .filter_map(|d| d.abs().to_f64())
        .fold(0f64, f64::max)
}

impl Precise {
    fn new<T: FloatT>(data: &ConvexData<T>, base: &SolveResult<T>) -> Option<Self> {
        let mult = base
            .multipliers
            .clone()
            .unwrap_or_else(|| Multipliers::zeros(data.neq(), data.nineq()));
        Some(Self {
            Q: mat_to_decimal(&data.Q)?,
            C: vec_to_decimal(&data.C)?,
            AE: mat_to_decimal(&data.AE)?,
            BE: vec_to_decimal(&data.BE)?,
            AI: mat_to_decimal(&data.AI)?,
            BI: vec_to_decimal(&data.BI)?,
            x: vec_to_decimal(&base.x)?,
            lambda_eq: vec_to_decimal(&mult.equalities)?,
            lambda_ineq: vec_to_decimal(&mult.inequalities)?,
        })
    }

    fn gradient(&self) -> Option<Vec<Decimal>> {
        self.Q
            .iter()
            .zip(&self.C)
            .map(|(row, &c)| dot(row, &self.x)?.checked_add(c))
            .collect()
    }

    fn equality_residual(&self) -> Option<Vec<Decimal>> {
        self.AE
            .iter()
            .zip(&self.BE)
            .map(|(row, &b)| b.checked_sub(dot(row, &self.x)?))
            .collect()
    }

    fn inequality_slack(&self) -> Option<Vec<Decimal>> {
        self.AI
            .iter()
            .zip(&self.BI)
            .map(|(row, &b)| b.checked_sub(dot(row, &self.x)?))
            .collect()
    }

    /// `g + AE'λE + AI'λI`
    fn dual_residual(&self, g: &[Decimal]) -> Option<Vec<Decimal>> {
        let mut rd = g.to_vec();
        for (row, &l) in self.AE.iter().zip(&self.lambda_eq) {
            for (r, &a) in rd.iter_mut().zip(row) {
                *r = r.checked_add(a.checked_mul(l)?)?;
            }
        }
        for (row, &l) in self.AI.iter().zip(&self.lambda_ineq) {
            for (r, &a) in rd.iter_mut().zip(row) {
                *r = r.checked_add(a.checked_mul(l)?)?;
            }
        }
        Some(rd)
    }

    fn residuals(&self) -> Option<(Residuals, Vec<Decimal>, Vec<Decimal>, Vec<Decimal>)> {
        let g = self.gradient()?;
        let rE = self.equality_residual()?;
        let rI = self.inequality_slack()?;
        let rD = self.dual_residual(&g)?;

        let violation = rI
            .iter()
            .filter(|s| s.is_sign_negative())
            .filter_map(|s| s.abs().to_f64())
            .fold(0f64, f64::max);
        let comp = rI
            .iter()
            .zip(&self.lambda_ineq)
            .map(|(&s, &l)| s.checked_mul(l))
            .collect::<Option<Vec<_>>>()?;
        // negative multipliers are a dual violation
        let neg_mult = self
            .lambda_ineq
            .iter()
            .filter(|l| l.is_sign_negative())
            .filter_map(|l| l.abs().to_f64())
            .fold(0f64, f64::max);

        let res = Residuals {
            primal: max_abs(&rE).max(violation),
            dual: max_abs(&rD).max(neg_mult),
            complementarity: max_abs(&comp),
        };
        Some((res, g, rE, rI))
    }

    /// Folds a correction solved at zoom factors `zp` and `zd` into the iterate.
    fn apply<T: FloatT>(&mut self, correction: &SolveResult<T>, zp: f64, zd: f64) -> Option<()> {
        let zp = Decimal::from_f64_retain(zp)?;
        let zd = Decimal::from_f64_retain(zd)?;
        for (x, &d) in self.x.iter_mut().zip(&correction.x) {
            *x = x.checked_add(d.to_decimal()?.checked_div(zp)?)?;
        }
        if let Some(ref m) = correction.multipliers {
            for (l, &v) in self.lambda_eq.iter_mut().zip(&m.equalities) {
                *l = v.to_decimal()?.checked_div(zd)?;
            }
            for (l, &v) in self.lambda_ineq.iter_mut().zip(&m.inequalities) {
                *l = v.to_decimal()?.checked_div(zd)?;
            }
        }
        Some(())
    }
}

impl<T> ExtendedPrecisionSolver<T>
where
    T: FloatT,
{
    pub fn new(data: ConvexData<T>, settings: ConvexSettings<T>) -> Self {
        Self {
            core: SolverCore::new(data, settings, "extended precision"),
        }
    }

    fn inner_settings(&self) -> ConvexSettings<T> {
        let mut settings = self.core.settings.clone();
        settings.extended_precision_enable = false;
        settings.dual_regularization_enable = false;
        settings.verbose = false;
        settings
    }

    fn correction_data(
        &self,
        g: &[Decimal],
        rE: &[Decimal],
        rI: &[Decimal],
        zp: f64,
        zd: f64,
    ) -> Option<ConvexData<T>> {
        let data = &self.core.data;
        let mut Q = data.Q.clone();
        Q.scale(T::from_f64(zd / zp)?);

        let zd_dec = Decimal::from_f64_retain(zd)?;
        let zp_dec = Decimal::from_f64_retain(zp)?;
        let scaled = |v: &[Decimal], z: Decimal| -> Option<Vec<T>> {
            v.iter().map(|&r| T::from_decimal(r.checked_mul(z)?)).collect()
        };

        ConvexData::new(
            Q,
            scaled(g, zd_dec)?,
            data.AE.clone(),
            scaled(rE, zp_dec)?,
            data.AI.clone(),
            scaled(rI, zp_dec)?,
        )
        .ok()
    }

    fn refine(&mut self, start: Option<&[T]>) -> SolveResult<T> {
        let inner = self.inner_settings();
        let settings = self.core.settings.clone();
        let data = self.core.data.clone();

        let mut base = ConvexSolverEngine::new_ordinary(data.clone(), inner.clone()).solve(start);
        self.core.info.iterations = base.iterations;
        if !base.state.is_feasible() {
            return base;
        }

        let mut precise = match Precise::new(&data, &base) {
            Some(p) => p,
            None => return base,
        };

        let target = settings.extended_precision_target.to_f64().unwrap_or(1e-14);
        let growth = settings.zoom_growth.to_f64().unwrap_or(1e4);
        let zoom_max = settings.zoom_max.to_f64().unwrap_or(1e12);

        let (mut zp, mut zd) = (1f64, 1f64);
        let mut failures = 0u32;
        let mut worst = f64::INFINITY;

        for pass in 0..settings.extended_precision_max_iter {
            let (res, g, rE, rI) = match precise.residuals() {
                Some(r) => r,
                None => break,
            };
            worst = res.worst();
            tracing::debug!(
                pass,
                primal = res.primal,
                dual = res.dual,
                complementarity = res.complementarity,
                "refinement residuals"
            );
            if worst <= target {
                break;
            }

            let tiny = f64::MIN_POSITIVE;
            let zp_next = (zp * growth).min(zoom_max).min(1.0 / res.primal.max(tiny)).max(1.0);
            let zd_next = (zd * growth)
                .min(zoom_max)
                .min(1.0 / res.dual.max(res.complementarity).max(tiny))
                .max(1.0);
            if settings.extended_precision_combined_zoom {
                zp = zp_next.min(zd_next);
                zd = zp;
            } else {
                zp = zp_next;
                zd = zd_next;
            }

            let correction = self
                .correction_data(&g, &rE, &rI, zp, zd)
                .map(|cd| ConvexSolverEngine::new_ordinary(cd, inner.clone()).solve(None));

            match correction {
                Some(c) if c.state.is_feasible() && precise.apply(&c, zp, zd).is_some() => {
                    self.core.info.iterations += c.iterations;
                }
                _ => {
                    failures += 1;
                    tracing::debug!(pass, failures, "correction solve failed");
                    if failures > settings.zoom_retry_max {
                        break;
                    }
                    zp = (zp / growth).max(1.0);
                    zd = (zd / growth).max(1.0);
                }
            }
        }

        if let Some((res, ..)) = precise.residuals() {
            worst = res.worst();
        }

        let state = if worst <= target {
            SolverState::Optimal
        } else if worst <= target.sqrt() {
            SolverState::Approximate
        } else {
            SolverState::Feasible
        };

        let x: Option<Vec<T>> = precise.x.iter().map(|&v| T::from_decimal(v)).collect();
        let le: Option<Vec<T>> = precise.lambda_eq.iter().map(|&v| T::from_decimal(v)).collect();
        let li: Option<Vec<T>> = precise.lambda_ineq.iter().map(|&v| T::from_decimal(v)).collect();

        match (x, le, li) {
            (Some(x), Some(equalities), Some(inequalities)) => {
                base.x = x;
                base.multipliers = Some(Multipliers {
                    equalities,
                    inequalities,
                });
                base.state = state;
            }
            _ => base.state = SolverState::Feasible.min(base.state),
        }
        base
    }
}

impl<T> ConvexSolver<T> for ExtendedPrecisionSolver<T>
where
    T: FloatT,
{
    fn core(&self) -> &SolverCore<T> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SolverCore<T> {
        &mut self.core
    }

    fn solve(&mut self, start: Option<&[T]>) -> SolveResult<T> {
        let timers = self.core.begin();
        let result = self.refine(start);
        self.core
            .finish(timers, result.state, result.x, result.multipliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refined_simple_qp() {
        // min x² + y²  s.t.  x + y >= 1
        let Q = Matrix::from(&[[2., 0.], [0., 2.]]);
        let AI = Matrix::from(&[[-1., -1.]]);
        let data =
            ConvexData::new(Q, vec![0., 0.], Matrix::zeros((0, 2)), vec![], AI, vec![-1.]).unwrap();

        let mut settings = ConvexSettings::default();
        settings.extended_precision_enable = true;
        let mut solver = ExtendedPrecisionSolver::new(data, settings);
        let result = solver.solve(None);
        assert_eq!(result.state, SolverState::Optimal);
        assert!(result.x.norm_inf_diff(&[0.5, 0.5]) < 1e-14);
        let mult = result.multipliers.unwrap();
        assert!(f64::abs(mult.inequalities[0] - 1.) < 1e-12);
    }

    #[test]
    fn test_refinement_passes_through_failures() {
        // x <= 0 and x >= 1
        let data = ConvexData::new(
            Matrix::from(&[[2.]]),
            vec![0.],
            Matrix::zeros((0, 1)),
            vec![],
            Matrix::from(&[[1.], [-1.]]),
            vec![0., -1.],
        )
        .unwrap();
        let mut settings = ConvexSettings::default();
        settings.extended_precision_enable = true;
        let result = ExtendedPrecisionSolver::new(data, settings).solve(None);
        assert_eq!(result.state, SolverState::Infeasible);
    }
}
