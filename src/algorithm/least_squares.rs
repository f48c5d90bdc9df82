//! Least-squares strategy selection and result type

/// Factorization used to solve `min ||A x - b||`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LeastSquaresStrategy {
    /// SVD with a divide-and-conquer bidiagonal solver (`dgelsd`).
    /// Robust for rank-deficient and ill-conditioned systems.
    #[default]
    SvdDivideAndConquer,
    /// Column-pivoted QR followed by a complete orthogonal factorization
    /// (`dgelsy`). Cheaper when `A` is well conditioned.
    CompleteOrthogonal,
}

impl LeastSquaresStrategy {
    /// Name of the kernel routine implementing this strategy
    pub fn routine(self) -> &'static str {
        match self {
            Self::SvdDivideAndConquer => "dgelsd",
            Self::CompleteOrthogonal => "dgelsy",
        }
    }
}

/// Outcome of a least-squares solve
///
/// The solution itself is written into the right-hand-side buffer; this
/// struct carries the diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresSolution {
    /// Effective numerical rank of `A`
    pub rank: usize,
    /// Number of columns of `A`
    pub cols: usize,
    /// Singular values of `A` in descending order. Empty for
    /// [`LeastSquaresStrategy::CompleteOrthogonal`].
    pub singular_values: Vec<f64>,
}

impl LeastSquaresSolution {
    /// Whether `rank < n`. This is a qualification of the result, not an
    /// error: the returned solution is the minimum-norm one.
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.cols
    }

    /// Ratio of the smallest to the largest singular value, when singular
    /// values were computed.
    pub fn reciprocal_condition(&self) -> Option<f64> {
        match (self.singular_values.first(), self.singular_values.last()) {
            (Some(&max), Some(&min)) if max > 0.0 => Some(min / max),
            (Some(_), Some(_)) => Some(0.0),
            _ => None,
        }
    }
}

/// Resolve a caller tolerance: non-positive values select
/// `f64::EPSILON * max(m, n)`.
pub fn effective_rcond(rcond: f64, m: usize, n: usize) -> f64 {
    if rcond > 0.0 {
        rcond
    } else {
        f64::EPSILON * m.max(n).max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_rcond() {
        assert_eq!(effective_rcond(1e-8, 3, 3), 1e-8);
        assert_eq!(effective_rcond(0.0, 4, 7), 7.0 * f64::EPSILON);
        assert_eq!(effective_rcond(-1.0, 0, 0), f64::EPSILON);
    }

    #[test]
    fn test_rank_deficiency() {
        let sol = LeastSquaresSolution {
            rank: 2,
            cols: 3,
            singular_values: vec![4.0, 1.0, 0.0],
        };
        assert!(sol.is_rank_deficient());
        assert_eq!(sol.reciprocal_condition(), Some(0.0));
        assert_eq!(LeastSquaresStrategy::default().routine(), "dgelsd");
    }
}
