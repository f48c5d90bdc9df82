//! Symmetric eigendecomposition (`dsyev`)

use super::rotation::sort_ascending;
use super::tridiagonal::{tql2, tridiagonalize};
use crate::algorithm::{EigenJob, Triangle};
use crate::config::KernelConfig;

/// Eigenvalues (ascending, into `w`) and optionally eigenvectors (into the
/// columns of `a`) of the symmetric matrix stored in one triangle of `a`.
///
/// Only the chosen triangle is read. Returns `0`, or the number of
/// off-diagonal elements that failed to converge; eigenvalues are then left
/// in iteration order.
#[allow(clippy::too_many_arguments)]
pub fn syev(
    job: EigenJob,
    uplo: Triangle,
    n: usize,
    a: &mut [f64],
    lda: usize,
    w: &mut [f64],
    cfg: &KernelConfig,
) -> usize {
    let mut sym = vec![0.0; n * n];
    for j in 0..n {
        for i in 0..n {
            let stored_below = i >= j;
            let (r, c) = match (uplo, stored_below) {
                (Triangle::Lower, true) | (Triangle::Upper, false) => (i, j),
                _ => (j, i),
            };
            sym[i + j * n] = a[r + c * lda];
        }
    }

    let want_vectors = job == EigenJob::ValuesAndVectors;
    let tri = tridiagonalize(&mut sym, n, want_vectors);
    let mut d = tri.d;
    let mut e = tri.e;
    let mut q = tri.q;

    let info = tql2(
        &mut d,
        &mut e,
        q.as_deref_mut().map(|z| (z, n, n)),
        cfg.max_ql_iterations,
    );
    if info == 0 {
        sort_ascending(&mut d, q.as_deref_mut().map(|z| (z, n, n)));
    }

    w[..n].copy_from_slice(&d);
    if let Some(q) = q {
        for j in 0..n {
            a[j * lda..j * lda + n].copy_from_slice(&q[j * n..(j + 1) * n]);
        }
    }
    info
}
