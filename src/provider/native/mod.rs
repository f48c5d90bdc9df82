//! Pure-Rust kernel provider
//!
//! Implements every kernel on column-major slices without any external
//! library. GEMM column blocks run on the rayon pool when the `rayon`
//! feature is enabled and the product is large enough; divide-and-conquer
//! subproblems are solved in parallel the same way.

mod bidiagonal;
mod divide_conquer;
mod eigen;
pub(crate) mod gemm;
mod householder;
mod lstsq;
mod pivoted_qr;
mod rotation;
mod svd;
mod tridiagonal;

use super::KernelProvider;
use super::arguments::{check_gelsd, check_gesdd, check_gesvd, check_least_squares, check_syev};
use crate::algorithm::{EigenJob, SvdJob, Transpose, Triangle};
use crate::config::KernelConfig;

/// Kernels implemented natively in Rust.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeKernels {
    config: KernelConfig,
}

impl NativeKernels {
    /// Native kernels with default [`KernelConfig`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Native kernels with explicit tuning
    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }
}

/// `info` as returned across the kernel boundary
fn to_info(unconverged: usize) -> i32 {
    i32::try_from(unconverged).unwrap_or(i32::MAX)
}

impl KernelProvider for NativeKernels {
    fn name(&self) -> &'static str {
        "native"
    }

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
    ) {
        gemm::dgemm(
            transa,
            transb,
            m,
            n,
            k,
            alpha,
            a,
            lda,
            b,
            ldb,
            beta,
            c,
            ldc,
            self.config.parallel_flop_threshold,
        );
    }

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
    ) -> i32 {
        let info = check_gelsd(m, n, nrhs, a.len(), lda, b.len(), ldb, s.len());
        if info != 0 {
            return info;
        }
        to_info(lstsq::gelsd(m, n, nrhs, a, lda, b, ldb, s, rcond, rank, &self.config))
    }

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
    ) -> i32 {
        let info = check_least_squares(m, n, nrhs, a.len(), lda, b.len(), ldb);
        if info != 0 {
            return info;
        }
        to_info(lstsq::gelsy(m, n, nrhs, a, lda, b, ldb, rcond, rank))
    }

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
    ) -> i32 {
        let info = check_gesvd(
            jobu,
            jobvt,
            m,
            n,
            a.len(),
            lda,
            s.len(),
            u.len(),
            ldu,
            vt.len(),
            ldvt,
        );
        if info != 0 {
            return info;
        }
        to_info(svd::gesvd(
            jobu,
            jobvt,
            m,
            n,
            a,
            lda,
            s,
            u,
            ldu,
            vt,
            ldvt,
            &self.config,
        ))
    }

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
    ) -> i32 {
        let info = check_gesdd(jobz, m, n, a.len(), lda, s.len(), u.len(), ldu, vt.len(), ldvt);
        if info != 0 {
            return info;
        }
        to_info(svd::gesdd(jobz, m, n, a, lda, s, u, ldu, vt, ldvt, &self.config))
    }

    fn dsyev(
        &self,
        jobz: EigenJob,
        uplo: Triangle,
        n: usize,
        a: &mut [f64],
        lda: usize,
        w: &mut [f64],
    ) -> i32 {
        let info = check_syev(n, a.len(), lda, w.len());
        if info != 0 {
            return info;
        }
        to_info(eigen::syev(jobz, uplo, n, a, lda, w, &self.config))
    }
}
