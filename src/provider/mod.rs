//! Kernel providers
//!
//! A [`KernelProvider`] executes the six numeric kernels on raw
//! column-major buffers with reference-LAPACK argument conventions. The
//! [`Engine`](crate::engine::Engine) validates shapes, calls into a
//! provider, and maps the returned `info` to a [`Result`](crate::error::Result).
//!
//! Two providers are available:
//! * [`NativeKernels`], a pure-Rust implementation (always available)
//! * `SystemLapack`, which forwards to the system BLAS/LAPACK (feature
//!   `system-lapack`)

pub mod arguments;
mod native;
#[cfg(feature = "system-lapack")]
mod system;

pub use native::NativeKernels;
#[cfg(feature = "system-lapack")]
pub use system::SystemLapack;

use crate::algorithm::{EigenJob, SvdJob, Transpose, Triangle};

/// Backend executing the dense kernels.
///
/// All matrices are column-major with explicit leading dimensions. Kernels
/// that can fail return a LAPACK `info`: `0` on success, `-i` when the
/// `i`-th argument (1-based, in LAPACK order) is invalid, and a positive
/// count of unconverged elements when an iteration limit was hit. On a
/// negative `info` no output buffer has been written.
#[allow(clippy::too_many_arguments)]
pub trait KernelProvider: Send + Sync {
    /// Short identifier used in log messages
    fn name(&self) -> &'static str;

    /// `C = alpha * op(A) * op(B) + beta * C` for an `m x n` result and inner
    /// dimension `k`.
    ///
    /// When `beta == 0` the previous contents of `C` are not read (NaN in `C`
    /// does not propagate); when `alpha == 0` or `k == 0`, `A` and `B` are not
    /// read.
    ///
    /// Buffers must already match their shapes; there is no status to report
    /// a mismatch, so implementations may panic on one.
    fn dgemm(
        &self,
        transa: Transpose,
        transb: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: f64,
        a: &[f64],
        lda: usize,
        b: &[f64],
        ldb: usize,
        beta: f64,
        c: &mut [f64],
        ldc: usize,
    );

    /// Minimum-norm least squares through the divide-and-conquer SVD.
    ///
    /// `b` is `max(m, n) x nrhs` and receives the solution in its first `n`
    /// rows; `s` receives the `min(m, n)` singular values of `A`.
    fn dgelsd(
        &self,
        m: usize,
        n: usize,
        nrhs: usize,
        a: &mut [f64],
        lda: usize,
        b: &mut [f64],
        ldb: usize,
        s: &mut [f64],
        rcond: f64,
        rank: &mut usize,
    ) -> i32;

    /// Minimum-norm least squares through a complete orthogonal factorization.
    fn dgelsy(
        &self,
        m: usize,
        n: usize,
        nrhs: usize,
        a: &mut [f64],
        lda: usize,
        b: &mut [f64],
        ldb: usize,
        rcond: f64,
        rank: &mut usize,
    ) -> i32;

    /// SVD by bidiagonal QR iteration; `vt` receives `Vᵀ`.
    fn dgesvd(
        &self,
        jobu: SvdJob,
        jobvt: SvdJob,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        s: &mut [f64],
        u: &mut [f64],
        ldu: usize,
        vt: &mut [f64],
        ldvt: usize,
    ) -> i32;

    /// SVD by divide and conquer; `vt` receives `Vᵀ`.
    fn dgesdd(
        &self,
        jobz: SvdJob,
        m: usize,
        n: usize,
        a: &mut [f64],
        lda: usize,
        s: &mut [f64],
        u: &mut [f64],
        ldu: usize,
        vt: &mut [f64],
        ldvt: usize,
    ) -> i32;

    /// Symmetric eigendecomposition reading only the `uplo` triangle of `a`.
    ///
    /// Eigenvalues are written ascending into `w`; with
    /// [`EigenJob::ValuesAndVectors`] the orthonormal eigenvectors overwrite
    /// the columns of `a`.
    fn dsyev(
        &self,
        jobz: EigenJob,
        uplo: Triangle,
        n: usize,
        a: &mut [f64],
        lda: usize,
        w: &mut [f64],
    ) -> i32;
}
