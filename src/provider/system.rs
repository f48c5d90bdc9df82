//! Kernel provider backed by the system BLAS/LAPACK (OpenBLAS)
//!
//! Every call is validated with the same argument checks as the native
//! provider before crossing the FFI boundary, so the foreign routines
//! never see a buffer shorter than its declared shape. Workspace sizes are
//! obtained with the usual `lwork = -1` query.

extern crate openblas_src;

use super::KernelProvider;
use super::arguments::{check_gelsd, check_gesdd, check_gesvd, check_least_squares, check_syev};
use crate::algorithm::helpers::col_major_len;
use crate::algorithm::{EigenJob, SvdJob, Transpose, Triangle};

/// Kernels forwarded to the linked BLAS and LAPACK libraries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemLapack;

impl SystemLapack {
    /// Create the provider
    pub fn new() -> Self {
        Self
    }
}

/// Convert dimensions to LAPACK integers, failing at the first argument
/// position whose value does not fit.
fn lapack_ints<const N: usize>(values: [(usize, i32); N]) -> Result<[i32; N], i32> {
    let mut out = [0i32; N];
    for (slot, (value, position)) in out.iter_mut().zip(values) {
        *slot = i32::try_from(value).map_err(|_| -position)?;
    }
    Ok(out)
}

/// Workspace length reported by an `lwork = -1` query
fn workspace_len(query: f64) -> usize {
    (query.max(1.0)) as usize
}

/// `U`/`Vᵀ` buffers passed to LAPACK must be addressable even when unused.
fn scratch_if_empty(buf: &[f64]) -> Option<Vec<f64>> {
    buf.is_empty().then(|| vec![0.0; 1])
}

impl KernelProvider for SystemLapack {
    fn name(&self) -> &'static str {
        "system-lapack"
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
        if m == 0 || n == 0 {
            return;
        }
        let (a_rows, a_cols) = if transa.is_trans() { (k, m) } else { (m, k) };
        let (b_rows, b_cols) = if transb.is_trans() { (n, k) } else { (k, n) };
        let reads_operands = alpha != 0.0 && k > 0;
        let shapes_ok = lda >= a_rows.max(1)
            && ldb >= b_rows.max(1)
            && ldc >= m.max(1)
            && c.len() >= col_major_len(m, n, ldc)
            && (!reads_operands
                || (a.len() >= col_major_len(a_rows, a_cols, lda)
                    && b.len() >= col_major_len(b_rows, b_cols, ldb)));
        let ints = lapack_ints([(m, 3), (n, 4), (k, 5), (lda, 8), (ldb, 10), (ldc, 13)]);
        debug_assert!(shapes_ok, "dgemm: operand buffers do not match m={m} n={n} k={k}");
        debug_assert!(ints.is_ok(), "dgemm: dimensions exceed the BLAS integer range");
        let (true, Ok([mi, ni, ki, ldai, ldbi, ldci])) = (shapes_ok, ints) else {
            return;
        };
        if !reads_operands {
            // BLAS may still touch A and B; keep the contract that they are unread
            for j in 0..n {
                for x in &mut c[j * ldc..j * ldc + m] {
                    *x = if beta == 0.0 { 0.0 } else { beta * *x };
                }
            }
            return;
        }
        // SAFETY: every buffer was checked against its declared shape above.
        unsafe {
            blas::dgemm(
                transa.as_char(),
                transb.as_char(),
                mi,
                ni,
                ki,
                alpha,
                a,
                ldai,
                b,
                ldbi,
                beta,
                c,
                ldci,
            );
        }
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
        let [mi, ni, nrhsi, ldai, ldbi] =
            match lapack_ints([(m, 1), (n, 2), (nrhs, 3), (lda, 5), (ldb, 7)]) {
                Ok(v) => v,
                Err(info) => return info,
            };
        let mut rank_i = 0i32;
        let mut info = 0i32;
        let mut query = [0.0f64];
        let mut iquery = [0i32];
        // SAFETY: buffers validated; lwork = -1 only writes the query slots.
        unsafe {
            lapack::dgelsd(
                mi, ni, nrhsi, a, ldai, b, ldbi, s, rcond, &mut rank_i, &mut query, -1,
                &mut iquery, &mut info,
            );
        }
        if info != 0 {
            return info;
        }
        let lwork = workspace_len(query[0]);
        let mut work = vec![0.0; lwork];
        let mut iwork = vec![0i32; (iquery[0].max(1)) as usize];
        // SAFETY: workspaces sized from the query.
        unsafe {
            lapack::dgelsd(
                mi,
                ni,
                nrhsi,
                a,
                ldai,
                b,
                ldbi,
                s,
                rcond,
                &mut rank_i,
                &mut work,
                lwork as i32,
                &mut iwork,
                &mut info,
            );
        }
        *rank = rank_i.max(0) as usize;
        info
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
        let [mi, ni, nrhsi, ldai, ldbi] =
            match lapack_ints([(m, 1), (n, 2), (nrhs, 3), (lda, 5), (ldb, 7)]) {
                Ok(v) => v,
                Err(info) => return info,
            };
        // zero pivots mark every column as free
        let mut jpvt = vec![0i32; n.max(1)];
        let mut rank_i = 0i32;
        let mut info = 0i32;
        let mut query = [0.0f64];
        // SAFETY: buffers validated; lwork = -1 only writes the query slot.
        unsafe {
            lapack::dgelsy(
                mi, ni, nrhsi, a, ldai, b, ldbi, &mut jpvt, rcond, &mut rank_i, &mut query, -1,
                &mut info,
            );
        }
        if info != 0 {
            return info;
        }
        let lwork = workspace_len(query[0]);
        let mut work = vec![0.0; lwork];
        // SAFETY: workspace sized from the query.
        unsafe {
            lapack::dgelsy(
                mi,
                ni,
                nrhsi,
                a,
                ldai,
                b,
                ldbi,
                &mut jpvt,
                rcond,
                &mut rank_i,
                &mut work,
                lwork as i32,
                &mut info,
            );
        }
        *rank = rank_i.max(0) as usize;
        info
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
        let [mi, ni, ldai, ldui, ldvti] =
            match lapack_ints([(m, 3), (n, 4), (lda, 6), (ldu, 9), (ldvt, 11)]) {
                Ok(v) => v,
                Err(info) => return info,
            };
        let mut u_scratch = scratch_if_empty(u);
        let mut vt_scratch = scratch_if_empty(vt);
        let u = u_scratch.as_deref_mut().unwrap_or(u);
        let vt = vt_scratch.as_deref_mut().unwrap_or(vt);
        let (ju, jv) = (jobu.as_char(), jobvt.as_char());

        let mut info = 0i32;
        let mut query = [0.0f64];
        // SAFETY: buffers validated; lwork = -1 only writes the query slot.
        unsafe {
            lapack::dgesvd(
                ju, jv, mi, ni, a, ldai, s, u, ldui, vt, ldvti, &mut query, -1, &mut info,
            );
        }
        if info != 0 {
            return info;
        }
        let lwork = workspace_len(query[0]);
        let mut work = vec![0.0; lwork];
        // SAFETY: workspace sized from the query.
        unsafe {
            lapack::dgesvd(
                ju,
                jv,
                mi,
                ni,
                a,
                ldai,
                s,
                u,
                ldui,
                vt,
                ldvti,
                &mut work,
                lwork as i32,
                &mut info,
            );
        }
        info
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
        let [mi, ni, ldai, ldui, ldvti] =
            match lapack_ints([(m, 2), (n, 3), (lda, 5), (ldu, 8), (ldvt, 10)]) {
                Ok(v) => v,
                Err(info) => return info,
            };
        let mut u_scratch = scratch_if_empty(u);
        let mut vt_scratch = scratch_if_empty(vt);
        let u = u_scratch.as_deref_mut().unwrap_or(u);
        let vt = vt_scratch.as_deref_mut().unwrap_or(vt);
        let jz = jobz.as_char();
        let mut iwork = vec![0i32; (8 * m.min(n)).max(1)];

        let mut info = 0i32;
        let mut query = [0.0f64];
        // SAFETY: buffers validated; lwork = -1 only writes the query slot.
        unsafe {
            lapack::dgesdd(
                jz, mi, ni, a, ldai, s, u, ldui, vt, ldvti, &mut query, -1, &mut iwork, &mut info,
            );
        }
        if info != 0 {
            return info;
        }
        let lwork = workspace_len(query[0]);
        let mut work = vec![0.0; lwork];
        // SAFETY: workspaces sized from the query and 8 * min(m, n).
        unsafe {
            lapack::dgesdd(
                jz,
                mi,
                ni,
                a,
                ldai,
                s,
                u,
                ldui,
                vt,
                ldvti,
                &mut work,
                lwork as i32,
                &mut iwork,
                &mut info,
            );
        }
        info
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
        let [ni, ldai] = match lapack_ints([(n, 3), (lda, 5)]) {
            Ok(v) => v,
            Err(info) => return info,
        };
        let (jz, ul) = (jobz.as_char(), uplo.as_char());
        let mut info = 0i32;
        let mut query = [0.0f64];
        // SAFETY: buffers validated; lwork = -1 only writes the query slot.
        unsafe {
            lapack::dsyev(jz, ul, ni, a, ldai, w, &mut query, -1, &mut info);
        }
        if info != 0 {
            return info;
        }
        let lwork = workspace_len(query[0]);
        let mut work = vec![0.0; lwork];
        // SAFETY: workspace sized from the query.
        unsafe {
            lapack::dsyev(jz, ul, ni, a, ldai, w, &mut work, lwork as i32, &mut info);
        }
        info
    }
}
