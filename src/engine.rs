//! Typed entry point over a [`KernelProvider`]
//!
//! [`Engine`] takes validated [`MatrixView`]s, checks that operand shapes
//! conform before any output buffer is touched, dispatches to the provider
//! and turns the kernel `info` into a [`Result`].
//!
//! ```
//! use densela::prelude::*;
//!
//! let engine = Engine::new();
//! let a = [1.0, 3.0, 2.0, 4.0]; // [[1, 2], [3, 4]]
//! let b = [1.0, 0.0, 0.0, 1.0];
//! let mut c = [0.0; 4];
//! let av = MatrixView::col_major(&a, 2, 2)?;
//! let bv = MatrixView::col_major(&b, 2, 2)?;
//! let mut cv = MatrixViewMut::col_major(&mut c, 2, 2)?;
//! engine.multiply_accumulate(1.0, &av, &bv, 0.0, &mut cv)?;
//! assert_eq!(c, a);
//! # Ok::<(), densela::Error>(())
//! ```

use crate::algorithm::helpers::{validate_len, validate_square};
use crate::algorithm::{
    EigenJob, LeastSquaresSolution, LeastSquaresStrategy, SvdJob, Transpose, Triangle,
};
use crate::config::KernelConfig;
use crate::error::{Error, Result};
use crate::matrix::{MatrixView, MatrixViewMut};
use crate::provider::arguments::gesdd_output_shape;
use crate::provider::{KernelProvider, NativeKernels};

/// Dense linear-algebra engine.
///
/// The engine holds no mutable state; concurrent calls on disjoint buffers
/// are independent.
#[derive(Debug, Clone, Default)]
pub struct Engine<P: KernelProvider = NativeKernels> {
    provider: P,
}

impl Engine<NativeKernels> {
    /// Engine over the native kernels with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine over the native kernels with explicit tuning
    pub fn with_config(config: KernelConfig) -> Self {
        Self {
            provider: NativeKernels::with_config(config),
        }
    }
}

/// Borrow an optional vector output as a raw buffer, checking its shape.
///
/// Returns `None` when the job produces no vectors on this side.
fn vector_output<'b>(
    op: &'static str,
    what: &str,
    view: Option<&'b mut MatrixViewMut<'_>>,
    rows: usize,
    cols: usize,
) -> Result<Option<(&'b mut [f64], usize)>> {
    if rows == 0 || cols == 0 {
        return Ok(None);
    }
    match view {
        Some(v) if v.rows() == rows && v.cols() >= cols => {
            let ld = v.ld();
            Ok(Some((v.data_mut(), ld)))
        }
        Some(v) => Err(Error::dimension_mismatch(
            op,
            format!("{what} of shape {rows}x{cols}"),
            format!("{}x{}", v.rows(), v.cols()),
        )),
        None => Err(Error::dimension_mismatch(
            op,
            format!("{what} of shape {rows}x{cols}"),
            "no buffer",
        )),
    }
}

impl<P: KernelProvider> Engine<P> {
    /// Engine over an explicit provider
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// The kernel provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn finish(&self, op: &'static str, info: i32) -> Result<()> {
        if info > 0 {
            log::warn!(
                "{op}: {info} element(s) did not converge (provider {})",
                self.provider.name()
            );
        }
        Error::check_info(op, info)
    }

    /// `C := alpha * op(A) * op(B) + beta * C`
    ///
    /// `op` is taken from each view's transpose flag. Shapes are checked
    /// before `C` is written; with `beta == 0` the prior contents of `C` are
    /// ignored, and with `alpha == 0` neither `A` nor `B` is read.
    pub fn multiply_accumulate(
        &self,
        alpha: f64,
        a: &MatrixView<'_>,
        b: &MatrixView<'_>,
        beta: f64,
        c: &mut MatrixViewMut<'_>,
    ) -> Result<()> {
        let (m, k) = (a.rows(), a.cols());
        let n = b.cols();
        if b.rows() != k {
            return Err(Error::dimension_mismatch(
                "dgemm",
                format!("B with {k} rows"),
                format!("{}x{}", b.rows(), b.cols()),
            ));
        }
        if c.rows() != m || c.cols() != n {
            return Err(Error::dimension_mismatch(
                "dgemm",
                format!("C of shape {m}x{n}"),
                format!("{}x{}", c.rows(), c.cols()),
            ));
        }
        log::debug!("dgemm m={m} n={n} k={k} via {}", self.provider.name());
        let ldc = c.ld();
        self.provider.dgemm(
            Transpose::from_flag(a.is_transposed()),
            Transpose::from_flag(b.is_transposed()),
            m,
            n,
            k,
            alpha,
            a.data(),
            a.ld(),
            b.data(),
            b.ld(),
            beta,
            c.data_mut(),
            ldc,
        );
        Ok(())
    }

    /// Minimum-norm least-squares solution of `A X ≈ B`.
    ///
    /// `b` must have at least `max(m, n)` rows: rows `0..m` hold the
    /// right-hand sides on entry and rows `0..n` the solution on return. The
    /// contents of `a` are unspecified afterwards. Rank deficiency is
    /// reported through [`LeastSquaresSolution::rank`], not as an error.
    pub fn solve_least_squares(
        &self,
        strategy: LeastSquaresStrategy,
        a: &mut MatrixViewMut<'_>,
        b: &mut MatrixViewMut<'_>,
        rcond: f64,
    ) -> Result<LeastSquaresSolution> {
        let op = strategy.routine();
        let (m, n, nrhs) = (a.rows(), a.cols(), b.cols());
        if b.rows() < m.max(n) {
            return Err(Error::dimension_mismatch(
                op,
                format!("B with at least {} rows", m.max(n)),
                format!("{}x{}", b.rows(), b.cols()),
            ));
        }
        log::debug!(
            "{op} m={m} n={n} nrhs={nrhs} rcond={rcond:e} via {}",
            self.provider.name()
        );

        let (lda, ldb) = (a.ld(), b.ld());
        let mut rank = 0usize;
        let mut singular_values = Vec::new();
        let info = match strategy {
            LeastSquaresStrategy::SvdDivideAndConquer => {
                singular_values = vec![0.0; m.min(n)];
                self.provider.dgelsd(
                    m,
                    n,
                    nrhs,
                    a.data_mut(),
                    lda,
                    b.data_mut(),
                    ldb,
                    &mut singular_values,
                    rcond,
                    &mut rank,
                )
            }
            LeastSquaresStrategy::CompleteOrthogonal => self.provider.dgelsy(
                m,
                n,
                nrhs,
                a.data_mut(),
                lda,
                b.data_mut(),
                ldb,
                rcond,
                &mut rank,
            ),
        };
        self.finish(op, info)?;

        let solution = LeastSquaresSolution {
            rank,
            cols: n,
            singular_values,
        };
        if solution.is_rank_deficient() {
            log::debug!("{op}: rank {rank} < n={n}, returning minimum-norm solution");
        }
        Ok(solution)
    }

    /// Singular value decomposition by bidiagonal QR iteration.
    ///
    /// `s` receives the `min(m, n)` singular values in descending order.
    /// `u` (`m x m` for [`SvdJob::All`], `m x min(m, n)` for [`SvdJob::Thin`])
    /// and `vt` (`n x n` / `min(m, n) x n`) are required only when their job
    /// asks for explicit vectors; with [`SvdJob::Overwrite`] the vectors
    /// replace the leading part of `a`. `a` is otherwise left unspecified.
    pub fn svd(
        &self,
        jobu: SvdJob,
        jobvt: SvdJob,
        a: &mut MatrixViewMut<'_>,
        s: &mut [f64],
        u: Option<&mut MatrixViewMut<'_>>,
        vt: Option<&mut MatrixViewMut<'_>>,
    ) -> Result<()> {
        const OP: &str = "dgesvd";
        if jobu == SvdJob::Overwrite && jobvt == SvdJob::Overwrite {
            return Err(Error::IllegalArgument {
                op: OP,
                position: 2,
            });
        }
        let (m, n) = (a.rows(), a.cols());
        let k = m.min(n);
        validate_len(OP, "S", s.len(), k)?;
        let u_cols = match jobu {
            SvdJob::All | SvdJob::Thin => jobu.vector_count(m, k),
            _ => 0,
        };
        let vt_rows = match jobvt {
            SvdJob::All | SvdJob::Thin => jobvt.vector_count(n, k),
            _ => 0,
        };
        let u_out = vector_output(OP, "U", u, m, u_cols)?;
        let vt_out = vector_output(OP, "VT", vt, vt_rows, n)?;
        log::debug!(
            "{OP} jobu={} jobvt={} m={m} n={n} via {}",
            jobu.as_char() as char,
            jobvt.as_char() as char,
            self.provider.name()
        );

        let mut no_u: [f64; 0] = [];
        let mut no_vt: [f64; 0] = [];
        let (u_buf, ldu) = u_out.unwrap_or((&mut no_u[..], 1));
        let (vt_buf, ldvt) = vt_out.unwrap_or((&mut no_vt[..], 1));
        let lda = a.ld();
        let info = self.provider.dgesvd(
            jobu,
            jobvt,
            m,
            n,
            a.data_mut(),
            lda,
            s,
            u_buf,
            ldu,
            vt_buf,
            ldvt,
        );
        self.finish(OP, info)
    }

    /// Singular value decomposition by divide and conquer.
    ///
    /// One job for both sides. With [`SvdJob::Overwrite`], `U` overwrites `a`
    /// when `m >= n` (and `vt` must be `n x n`), otherwise `Vᵀ` overwrites
    /// `a` (and `u` must be `m x m`).
    pub fn svd_divide_conquer(
        &self,
        jobz: SvdJob,
        a: &mut MatrixViewMut<'_>,
        s: &mut [f64],
        u: Option<&mut MatrixViewMut<'_>>,
        vt: Option<&mut MatrixViewMut<'_>>,
    ) -> Result<()> {
        const OP: &str = "dgesdd";
        let (m, n) = (a.rows(), a.cols());
        validate_len(OP, "S", s.len(), m.min(n))?;
        let (u_cols, vt_rows) = gesdd_output_shape(jobz, m, n);
        let u_out = vector_output(OP, "U", u, m, u_cols)?;
        let vt_out = vector_output(OP, "VT", vt, vt_rows, n)?;
        log::debug!(
            "{OP} jobz={} m={m} n={n} via {}",
            jobz.as_char() as char,
            self.provider.name()
        );

        let mut no_u: [f64; 0] = [];
        let mut no_vt: [f64; 0] = [];
        let (u_buf, ldu) = u_out.unwrap_or((&mut no_u[..], 1));
        let (vt_buf, ldvt) = vt_out.unwrap_or((&mut no_vt[..], 1));
        let lda = a.ld();
        let info = self
            .provider
            .dgesdd(jobz, m, n, a.data_mut(), lda, s, u_buf, ldu, vt_buf, ldvt);
        self.finish(OP, info)
    }

    /// Eigenvalues (ascending, into `w`) and optionally eigenvectors (into
    /// the columns of `a`) of a symmetric matrix.
    ///
    /// Only the `triangle` half of `a` is read; symmetry is not checked.
    /// A [`Error::ConvergenceFailure`] means the values in `w` are unreliable.
    pub fn eigen_symmetric(
        &self,
        job: EigenJob,
        triangle: Triangle,
        a: &mut MatrixViewMut<'_>,
        w: &mut [f64],
    ) -> Result<()> {
        const OP: &str = "dsyev";
        let n = validate_square(OP, a.rows(), a.cols())?;
        validate_len(OP, "W", w.len(), n)?;
        log::debug!(
            "{OP} jobz={} uplo={} n={n} via {}",
            job.as_char() as char,
            triangle.as_char() as char,
            self.provider.name()
        );
        let lda = a.ld();
        let info = self
            .provider
            .dsyev(job, triangle, n, a.data_mut(), lda, w);
        self.finish(OP, info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemm_shape_mismatch_leaves_c_untouched() {
        let engine = Engine::new();
        let a = [1.0; 6];
        let b = [1.0; 6];
        let mut c = [7.0; 4];
        let av = MatrixView::col_major(&a, 2, 3).unwrap();
        let bv = MatrixView::col_major(&b, 2, 3).unwrap();
        let mut cv = MatrixViewMut::col_major(&mut c, 2, 2).unwrap();
        let err = engine
            .multiply_accumulate(1.0, &av, &bv, 0.0, &mut cv)
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { op: "dgemm", .. }));
        assert_eq!(c, [7.0; 4]);
    }

    #[test]
    fn test_gemm_uses_transpose_flag() {
        let engine = Engine::new();
        // A is 3x2, so Aᵀ A is 2x2
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut c = [0.0; 4];
        let av = MatrixView::col_major(&a, 3, 2).unwrap();
        let mut cv = MatrixViewMut::col_major(&mut c, 2, 2).unwrap();
        engine
            .multiply_accumulate(1.0, &av.t(), &av, 0.0, &mut cv)
            .unwrap();
        assert_eq!(c, [14.0, 32.0, 32.0, 77.0]);
    }

    #[test]
    fn test_svd_requires_u_for_thin_job() {
        let engine = Engine::new();
        let mut a = [1.0, 0.0, 0.0, 1.0];
        let mut s = [0.0; 2];
        let mut av = MatrixViewMut::col_major(&mut a, 2, 2).unwrap();
        let err = engine
            .svd(SvdJob::Thin, SvdJob::None, &mut av, &mut s, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { op: "dgesvd", .. }));
        assert_eq!(s, [0.0; 2]);
    }

    #[test]
    fn test_double_overwrite_is_illegal() {
        let engine = Engine::new();
        let mut a = [1.0, 0.0, 0.0, 1.0];
        let mut s = [0.0; 2];
        let mut av = MatrixViewMut::col_major(&mut a, 2, 2).unwrap();
        let err = engine
            .svd(SvdJob::Overwrite, SvdJob::Overwrite, &mut av, &mut s, None, None)
            .unwrap_err();
        assert_eq!(err.info(), Some(-2));
    }

    #[test]
    fn test_eigen_convergence_failure_is_reported() {
        let engine = Engine::with_config(KernelConfig::default().with_max_ql_iterations(0));
        let mut a = [2.0, 1.0, 1.0, 2.0];
        let mut w = [0.0; 2];
        let mut av = MatrixViewMut::col_major(&mut a, 2, 2).unwrap();
        let err = engine
            .eigen_symmetric(EigenJob::ValuesOnly, Triangle::Lower, &mut av, &mut w)
            .unwrap_err();
        assert!(matches!(err, Error::ConvergenceFailure { op: "dsyev", .. }));
    }
}
