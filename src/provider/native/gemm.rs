//! General matrix multiply-accumulate kernel
//!
//! Computes `C := alpha * op(A) * op(B) + beta * C` over column-major
//! slices. Work is split over the columns of `C`; every column is
//! accumulated in the same order whether or not it runs on the rayon pool,
//! so results do not depend on the thread count.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::algorithm::Transpose;

/// Scale a column by `beta`, treating `beta == 0` as "overwrite with zero"
/// so uninitialized or NaN contents never leak into the result.
#[inline]
fn scale_column(beta: f64, col: &mut [f64]) {
    if beta == 0.0 {
        col.fill(0.0);
    } else if beta != 1.0 {
        for x in col.iter_mut() {
            *x *= beta;
        }
    }
}

/// Column-major GEMM.
///
/// `op(A)` is `m x k`, `op(B)` is `k x n`, `C` is `m x n`. When `alpha == 0`
/// or `k == 0` neither `A` nor `B` is read.
///
/// The caller guarantees every slice covers its matrix for the given
/// leading dimension; `c` must not alias `a` or `b` (enforced by borrows).
#[allow(clippy::too_many_arguments)]
pub fn dgemm(
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
    parallel_threshold: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    let c = &mut c[..ldc * (n - 1) + m];
    let skip_product = alpha == 0.0 || k == 0;

    let column = |j: usize, cj: &mut [f64]| {
        let cj = &mut cj[..m];
        scale_column(beta, cj);
        if skip_product {
            return;
        }
        let b_at = |l: usize| match transb {
            Transpose::NoTrans => b[l + j * ldb],
            Transpose::Trans => b[j + l * ldb],
        };
        match transa {
            Transpose::NoTrans => {
                for l in 0..k {
                    let t = alpha * b_at(l);
                    let a_col = &a[l * lda..l * lda + m];
                    for (ci, &ai) in cj.iter_mut().zip(a_col) {
                        *ci += t * ai;
                    }
                }
            }
            Transpose::Trans => {
                for (i, ci) in cj.iter_mut().enumerate() {
                    let a_col = &a[i * lda..i * lda + k];
                    let mut sum = 0.0;
                    for (l, &al) in a_col.iter().enumerate() {
                        sum += al * b_at(l);
                    }
                    *ci += alpha * sum;
                }
            }
        }
    };

    #[cfg(feature = "rayon")]
    if n > 1 && m.saturating_mul(n).saturating_mul(k.max(1)) >= parallel_threshold {
        c.par_chunks_mut(ldc)
            .enumerate()
            .for_each(|(j, cj)| column(j, cj));
        return;
    }

    #[cfg(not(feature = "rayon"))]
    let _ = parallel_threshold;

    for (j, cj) in c.chunks_mut(ldc).enumerate() {
        column(j, cj);
    }
}

/// `C := A * B` for dense column-major operands (`ld = rows`)
pub fn matmul(
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    parallel_threshold: usize,
) {
    dgemm(
        Transpose::NoTrans,
        Transpose::NoTrans,
        m,
        n,
        k,
        1.0,
        a,
        m.max(1),
        b,
        k.max(1),
        0.0,
        c,
        m.max(1),
        parallel_threshold,
    );
}
