//! LAPACK-style argument checking shared by every provider
//!
//! Each check returns the kernel `info` a reference implementation would
//! report: `0` when all arguments are acceptable, otherwise minus the
//! 1-based position of the first offending argument. Buffer lengths are
//! checked as well (at the position of the buffer argument), which keeps
//! the FFI-backed provider memory safe.

use crate::algorithm::helpers::col_major_len;
use crate::algorithm::SvdJob;

/// Check `dgelsd`/`dgelsy` arguments
/// (`m, n, nrhs, A, lda, B, ldb, ...`).
#[allow(clippy::too_many_arguments)]
pub fn check_least_squares(
    m: usize,
    n: usize,
    nrhs: usize,
    a_len: usize,
    lda: usize,
    b_len: usize,
    ldb: usize,
) -> i32 {
    if lda < m.max(1) {
        return -5;
    }
    if ldb < m.max(n).max(1) {
        return -7;
    }
    if a_len < col_major_len(m, n, lda) {
        return -4;
    }
    if b_len < col_major_len(m.max(n), nrhs, ldb) {
        return -6;
    }
    0
}

/// Check `dgelsd` arguments; as [`check_least_squares`] plus the
/// singular value buffer `S` at position 8.
#[allow(clippy::too_many_arguments)]
pub fn check_gelsd(
    m: usize,
    n: usize,
    nrhs: usize,
    a_len: usize,
    lda: usize,
    b_len: usize,
    ldb: usize,
    s_len: usize,
) -> i32 {
    match check_least_squares(m, n, nrhs, a_len, lda, b_len, ldb) {
        0 if s_len < m.min(n) => -8,
        info => info,
    }
}

/// Check `dgesvd` arguments
/// (`jobu, jobvt, m, n, A, lda, S, U, ldu, VT, ldvt`).
#[allow(clippy::too_many_arguments)]
pub fn check_gesvd(
    jobu: SvdJob,
    jobvt: SvdJob,
    m: usize,
    n: usize,
    a_len: usize,
    lda: usize,
    s_len: usize,
    u_len: usize,
    ldu: usize,
    vt_len: usize,
    ldvt: usize,
) -> i32 {
    let k = m.min(n);
    if jobu == SvdJob::Overwrite && jobvt == SvdJob::Overwrite {
        return -2;
    }
    if lda < m.max(1) {
        return -6;
    }
    let u_cols = match jobu {
        SvdJob::All | SvdJob::Thin => jobu.vector_count(m, k),
        _ => 0,
    };
    if ldu < 1 || (u_cols > 0 && ldu < m) {
        return -9;
    }
    let vt_rows = match jobvt {
        SvdJob::All | SvdJob::Thin => jobvt.vector_count(n, k),
        _ => 0,
    };
    if ldvt < 1 || (vt_rows > 0 && ldvt < vt_rows) {
        return -11;
    }
    if a_len < col_major_len(m, n, lda) {
        return -5;
    }
    if s_len < k {
        return -7;
    }
    if u_len < col_major_len(m, u_cols, ldu) {
        return -8;
    }
    if vt_len < col_major_len(vt_rows, n, ldvt) {
        return -10;
    }
    0
}

/// Shapes of the explicit `U` and `Vᵀ` outputs of `dgesdd` for a job,
/// as `(u_cols, vt_rows)`. With `Overwrite` one side goes into `A` instead.
pub fn gesdd_output_shape(jobz: SvdJob, m: usize, n: usize) -> (usize, usize) {
    let k = m.min(n);
    match jobz {
        SvdJob::All => (m, n),
        SvdJob::Thin => (k, k),
        SvdJob::Overwrite if m >= n => (0, n),
        SvdJob::Overwrite => (m, 0),
        SvdJob::None => (0, 0),
    }
}

/// Check `dgesdd` arguments
/// (`jobz, m, n, A, lda, S, U, ldu, VT, ldvt`).
#[allow(clippy::too_many_arguments)]
pub fn check_gesdd(
    jobz: SvdJob,
    m: usize,
    n: usize,
    a_len: usize,
    lda: usize,
    s_len: usize,
    u_len: usize,
    ldu: usize,
    vt_len: usize,
    ldvt: usize,
) -> i32 {
    let (u_cols, vt_rows) = gesdd_output_shape(jobz, m, n);
    if lda < m.max(1) {
        return -5;
    }
    if ldu < 1 || (u_cols > 0 && ldu < m) {
        return -8;
    }
    if ldvt < 1 || (vt_rows > 0 && ldvt < vt_rows) {
        return -10;
    }
    if a_len < col_major_len(m, n, lda) {
        return -4;
    }
    if s_len < m.min(n) {
        return -6;
    }
    if u_len < col_major_len(m, u_cols, ldu) {
        return -7;
    }
    if vt_len < col_major_len(vt_rows, n, ldvt) {
        return -9;
    }
    0
}

/// Check `dsyev` arguments (`jobz, uplo, n, A, lda, W`).
///
/// An empty matrix is rejected at the position of `n`.
pub fn check_syev(n: usize, a_len: usize, lda: usize, w_len: usize) -> i32 {
    if n == 0 {
        return -3;
    }
    if lda < n {
        return -5;
    }
    if a_len < col_major_len(n, n, lda) {
        return -4;
    }
    if w_len < n {
        return -6;
    }
    0
}
