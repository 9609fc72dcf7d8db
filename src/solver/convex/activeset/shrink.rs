use crate::algebra::*;
use crate::solver::ConvexData;

/// Heuristics for choosing a row to drop from the working set when the
/// reduced KKT system cannot be solved.   Successive failures alternate
/// between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ShrinkRule {
    /// drop the row with the most negative multiplier
    #[default]
    Multiplier,
    /// drop the row closest to the span of the other working rows
    Projection,
}

impl ShrinkRule {
    pub fn toggle(self) -> Self {
        match self {
            ShrinkRule::Multiplier => ShrinkRule::Projection,
            ShrinkRule::Projection => ShrinkRule::Multiplier,
        }
    }

    /// Picks an entry of `included` (inequality row indices).   Ties go to
    /// the most recently included row.
    pub fn choose<T: FloatT>(
        self,
        data: &ConvexData<T>,
        included: &[usize],
        multipliers: &[T],
    ) -> Option<usize> {
        match self {
            ShrinkRule::Multiplier => most_negative_multiplier(included, multipliers),
            ShrinkRule::Projection => most_dependent_row(data, included),
        }
    }
}

fn most_negative_multiplier<T: FloatT>(included: &[usize], multipliers: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for &i in included.iter().rev() {
        let l = multipliers[i];
        match best {
            Some((_, b)) if !(l < b) => {}
            _ => best = Some((i, l)),
        }
    }
    best.map(|(i, _)| i)
}

/// Gram-Schmidt over the equality rows and then the included rows in
/// order.   The included row with the smallest relative residual after
/// projection onto its predecessors is the most dependent.
fn most_dependent_row<T: FloatT>(data: &ConvexData<T>, included: &[usize]) -> Option<usize> {
    let n = data.nvars();
    let mut basis: Vec<Vec<T>> = Vec::new();

    let project = |mut v: Vec<T>, basis: &mut Vec<Vec<T>>| -> T {
        let norm0 = v.norm();
        if norm0 == T::zero() {
            return T::zero();
        }
        for b in basis.iter() {
            let c = v.dot(b);
            v.axpby(-c, b, T::one());
        }
        let norm = v.norm();
        if norm > T::epsilon() * norm0 {
            v.scale(T::recip(norm));
            basis.push(v);
        }
        norm / norm0
    };

    for i in 0..data.neq() {
        project(data.AE.row(i), &mut basis);
    }

    let mut best: Option<(usize, T)> = None;
    for &i in included {
        let mut row = vec![T::zero(); n];
        data.AI.row_into(i, &mut row);
        let rel = project(row, &mut basis);
        match best {
            Some((_, b)) if rel > b => {}
            _ => best = Some((i, rel)),
        }
    }
    best.map(|(i, _)| i)
}

#[test]
fn test_shrink_rules() {
    use crate::algebra::Matrix;

    #[rustfmt::skip]
    let AI = Matrix::from(
        &[[1., 0.],
          [0., 1.],
          [1., 1.]]);
    let data = ConvexData::new(
        Matrix::identity(2),
        vec![0., 0.],
        Matrix::zeros((0, 2)),
        vec![],
        AI,
        vec![1., 1., 2.],
    )
    .unwrap();

    let included = [0, 1, 2];
    let multipliers = [0.5, -2., -1.];
    assert_eq!(ShrinkRule::Multiplier.choose(&data, &included, &multipliers), Some(1));
    // the third row lies in the span of the first two
    assert_eq!(ShrinkRule::Projection.choose(&data, &included, &multipliers), Some(2));
    assert_eq!(ShrinkRule::Multiplier.toggle(), ShrinkRule::Projection);
}
