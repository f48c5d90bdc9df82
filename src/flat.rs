//! Flat-buffer call surface
//!
//! Plain functions over `i32` dimensions and raw slices, returning the
//! kernel status integer (`0` success, `-i` illegal argument `i`, `>0`
//! unconverged count). Argument positions follow the LAPACK routine each
//! function wraps, so a caller holding only the status can tell which
//! argument was rejected. Validation completes before any output is
//! written.
//!
//! Every call is routed through an [`Engine`] over the
//! [`DefaultProvider`].

use crate::DefaultProvider;
use crate::algorithm::{EigenJob, LeastSquaresStrategy, SvdJob, Triangle};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::matrix::{MatrixView, MatrixViewMut};
use crate::provider::arguments::{check_gesdd, check_gesvd, gesdd_output_shape};
use crate::status::Status;

fn engine() -> Engine<DefaultProvider> {
    Engine::with_provider(DefaultProvider::default())
}

/// Non-negative dimension, or `-position`
fn dim(value: i32, position: i32) -> std::result::Result<usize, i32> {
    usize::try_from(value).map_err(|_| -position)
}

fn code(err: Error) -> i32 {
    Status::from(&err).code()
}

fn code_of(result: Result<()>) -> i32 {
    result.map_or_else(code, |()| 0)
}

fn flatten(result: std::result::Result<i32, i32>) -> i32 {
    match result {
        Ok(code) | Err(code) => code,
    }
}

/// `C := alpha * op(A) * op(B) + beta * C`.
///
/// `A` is stored as a dense column-major `a_rows x a_cols` matrix and `B`
/// as `b_rows x b_cols`; the transpose flags select `op`. `C` is dense
/// column-major with the shape of the product. Returns `false` (with `C`
/// untouched) for negative or non-conforming dimensions or short buffers.
#[allow(clippy::too_many_arguments)]
pub fn mult_matrices(
    a: &[f64],
    a_rows: i32,
    a_cols: i32,
    b: &[f64],
    b_rows: i32,
    b_cols: i32,
    c: &mut [f64],
    alpha: f64,
    beta: f64,
    trans_a: bool,
    trans_b: bool,
) -> bool {
    let dims = (
        dim(a_rows, 2),
        dim(a_cols, 3),
        dim(b_rows, 5),
        dim(b_cols, 6),
    );
    let (Ok(ar), Ok(ac), Ok(br), Ok(bc)) = dims else {
        log::debug!("mult_matrices: negative dimension");
        return false;
    };
    let av = match MatrixView::col_major(a, ar, ac) {
        Ok(v) if trans_a => v.t(),
        Ok(v) => v,
        Err(err) => return rejected(err),
    };
    let bv = match MatrixView::col_major(b, br, bc) {
        Ok(v) if trans_b => v.t(),
        Ok(v) => v,
        Err(err) => return rejected(err),
    };
    let result = MatrixViewMut::col_major(c, av.rows(), bv.cols())
        .and_then(|mut cv| engine().multiply_accumulate(alpha, &av, &bv, beta, &mut cv));
    match result {
        Ok(()) => true,
        Err(err) => rejected(err),
    }
}

fn rejected(err: Error) -> bool {
    log::debug!("mult_matrices rejected: {err}");
    false
}

#[allow(clippy::too_many_arguments)]
fn solve_ls(
    strategy: LeastSquaresStrategy,
    a: &mut [f64],
    a_rows: i32,
    a_cols: i32,
    b: &mut [f64],
    b_cols: i32,
    rcond: f64,
    rank: &mut [i32],
) -> std::result::Result<i32, i32> {
    let m = dim(a_rows, 1)?;
    let n = dim(a_cols, 2)?;
    let nrhs = dim(b_cols, 3)?;
    if rank.is_empty() {
        return Err(-10);
    }
    let mut av = MatrixViewMut::col_major(a, m, n).map_err(|_| -4)?;
    let b_rows = m.max(n);
    let mut bv = MatrixViewMut::col_major(b, b_rows, nrhs).map_err(|_| -6)?;
    let solution = engine()
        .solve_least_squares(strategy, &mut av, &mut bv, rcond)
        .map_err(code)?;
    rank[0] = i32::try_from(solution.rank).unwrap_or(i32::MAX);
    Ok(0)
}

/// Minimum-norm least squares via the divide-and-conquer SVD (`dgelsd`).
///
/// `A` is dense `a_rows x a_cols`; `B` is dense column-major with
/// `max(a_rows, a_cols)` rows and `b_cols` columns, its first `a_cols` rows
/// receive the solution. The effective rank is stored in `rank[0]`.
#[allow(clippy::too_many_arguments)]
pub fn solve_ls_dgelsd(
    a: &mut [f64],
    a_rows: i32,
    a_cols: i32,
    b: &mut [f64],
    b_cols: i32,
    rcond: f64,
    rank: &mut [i32],
) -> i32 {
    flatten(solve_ls(
        LeastSquaresStrategy::SvdDivideAndConquer,
        a,
        a_rows,
        a_cols,
        b,
        b_cols,
        rcond,
        rank,
    ))
}

/// Minimum-norm least squares via complete orthogonal factorization
/// (`dgelsy`). Same buffer conventions as [`solve_ls_dgelsd`].
#[allow(clippy::too_many_arguments)]
pub fn solve_ls_dgelsy(
    a: &mut [f64],
    a_rows: i32,
    a_cols: i32,
    b: &mut [f64],
    b_cols: i32,
    rcond: f64,
    rank: &mut [i32],
) -> i32 {
    flatten(solve_ls(
        LeastSquaresStrategy::CompleteOrthogonal,
        a,
        a_rows,
        a_cols,
        b,
        b_cols,
        rcond,
        rank,
    ))
}

/// Optional vector output; `None` when the job produces none on this side.
fn vector_view(
    buf: &mut [f64],
    rows: usize,
    cols: usize,
    ld: usize,
) -> Result<Option<MatrixViewMut<'_>>> {
    if rows == 0 || cols == 0 {
        return Ok(None);
    }
    MatrixViewMut::new(buf, rows, cols, ld).map(Some)
}

/// SVD by bidiagonal QR iteration with LAPACK `dgesvd` arguments.
///
/// Job characters are `'A'`, `'S'`, `'O'` or `'N'` (case-insensitive).
#[allow(clippy::too_many_arguments)]
pub fn svd_dgesvd(
    jobu: char,
    jobvt: char,
    m: i32,
    n: i32,
    a: &mut [f64],
    lda: i32,
    s: &mut [f64],
    u: &mut [f64],
    ldu: i32,
    vt: &mut [f64],
    ldvt: i32,
) -> i32 {
    flatten(gesvd(jobu, jobvt, m, n, a, lda, s, u, ldu, vt, ldvt))
}

#[allow(clippy::too_many_arguments)]
fn gesvd(
    jobu: char,
    jobvt: char,
    m: i32,
    n: i32,
    a: &mut [f64],
    lda: i32,
    s: &mut [f64],
    u: &mut [f64],
    ldu: i32,
    vt: &mut [f64],
    ldvt: i32,
) -> std::result::Result<i32, i32> {
    let jobu = SvdJob::parse(jobu, "dgesvd", 1).map_err(code)?;
    let jobvt = SvdJob::parse(jobvt, "dgesvd", 2).map_err(code)?;
    let (m, n) = (dim(m, 3)?, dim(n, 4)?);
    let (lda, ldu, ldvt) = (dim(lda, 6)?, dim(ldu, 9)?, dim(ldvt, 11)?);
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
        return Err(info);
    }

    let k = m.min(n);
    let u_cols = match jobu {
        SvdJob::All | SvdJob::Thin => jobu.vector_count(m, k),
        _ => 0,
    };
    let vt_rows = match jobvt {
        SvdJob::All | SvdJob::Thin => jobvt.vector_count(n, k),
        _ => 0,
    };
    let mut av = MatrixViewMut::new(a, m, n, lda).map_err(code)?;
    let mut uv = vector_view(u, m, u_cols, ldu).map_err(code)?;
    let mut vtv = vector_view(vt, vt_rows, n, ldvt).map_err(code)?;
    Ok(code_of(engine().svd(
        jobu,
        jobvt,
        &mut av,
        s,
        uv.as_mut(),
        vtv.as_mut(),
    )))
}

/// SVD by divide and conquer with LAPACK `dgesdd` arguments.
#[allow(clippy::too_many_arguments)]
pub fn svd_dgesdd(
    jobz: char,
    m: i32,
    n: i32,
    a: &mut [f64],
    lda: i32,
    s: &mut [f64],
    u: &mut [f64],
    ldu: i32,
    vt: &mut [f64],
    ldvt: i32,
) -> i32 {
    flatten(gesdd(jobz, m, n, a, lda, s, u, ldu, vt, ldvt))
}

#[allow(clippy::too_many_arguments)]
fn gesdd(
    jobz: char,
    m: i32,
    n: i32,
    a: &mut [f64],
    lda: i32,
    s: &mut [f64],
    u: &mut [f64],
    ldu: i32,
    vt: &mut [f64],
    ldvt: i32,
) -> std::result::Result<i32, i32> {
    let jobz = SvdJob::parse(jobz, "dgesdd", 1).map_err(code)?;
    let (m, n) = (dim(m, 2)?, dim(n, 3)?);
    let (lda, ldu, ldvt) = (dim(lda, 5)?, dim(ldu, 8)?, dim(ldvt, 10)?);
    let info = check_gesdd(jobz, m, n, a.len(), lda, s.len(), u.len(), ldu, vt.len(), ldvt);
    if info != 0 {
        return Err(info);
    }

    let (u_cols, vt_rows) = gesdd_output_shape(jobz, m, n);
    let mut av = MatrixViewMut::new(a, m, n, lda).map_err(code)?;
    let mut uv = vector_view(u, m, u_cols, ldu).map_err(code)?;
    let mut vtv = vector_view(vt, vt_rows, n, ldvt).map_err(code)?;
    Ok(code_of(engine().svd_divide_conquer(
        jobz,
        &mut av,
        s,
        uv.as_mut(),
        vtv.as_mut(),
    )))
}

/// Symmetric eigendecomposition with LAPACK `dsyev` arguments.
///
/// `jobz` is `'N'` or `'V'`, `uplo` is `'L'` or `'U'`.
pub fn eigen_dsyev(
    jobz: char,
    uplo: char,
    n: i32,
    a: &mut [f64],
    lda: i32,
    w: &mut [f64],
) -> i32 {
    flatten(syev(jobz, uplo, n, a, lda, w))
}

fn syev(
    jobz: char,
    uplo: char,
    n: i32,
    a: &mut [f64],
    lda: i32,
    w: &mut [f64],
) -> std::result::Result<i32, i32> {
    let job = EigenJob::parse(jobz, "dsyev", 1).map_err(code)?;
    let triangle = Triangle::parse(uplo, "dsyev", 2).map_err(code)?;
    let n = dim(n, 3)?;
    if n == 0 {
        return Err(-3);
    }
    let lda = dim(lda, 5)?;
    if lda < n {
        return Err(-5);
    }
    let mut av = MatrixViewMut::new(a, n, n, lda).map_err(|_| -4)?;
    if w.len() < n {
        return Err(-6);
    }
    Ok(code_of(engine().eigen_symmetric(job, triangle, &mut av, w)))
}

/// Eigenvalues and eigenvectors of the dense symmetric `n x n` matrix `a`,
/// reading its lower triangle.
///
/// `a` is left untouched; eigenvalues go to `eigenvalues` in ascending order
/// and the orthonormal eigenvectors to the columns of `eigenvectors`
/// (dense `n x n`).
pub fn eigen_symmetric(n: i32, a: &[f64], eigenvalues: &mut [f64], eigenvectors: &mut [f64]) -> i32 {
    let Ok(order) = dim(n, 3) else {
        return -3;
    };
    if order == 0 {
        return -3;
    }
    let len = order * order;
    if a.len() < len || eigenvectors.len() < len {
        return -4;
    }
    if eigenvalues.len() < order {
        return -6;
    }
    eigenvectors[..len].copy_from_slice(&a[..len]);
    eigen_dsyev('V', 'L', n, eigenvectors, n, eigenvalues)
}
