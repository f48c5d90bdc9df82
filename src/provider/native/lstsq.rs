//! Minimum-norm least squares: `min ||B - A X||` with the smallest `||X||`
//!
//! * [`gelsd`] uses the divide-and-conquer SVD and drops singular values at
//!   or below `rcond * s[0]`.
//! * [`gelsy`] uses QR with column pivoting, keeps the largest leading block
//!   `R11` whose estimated condition number is at most `1 / rcond` and
//!   removes the trailing block with a second orthogonal factorization
//!   (complete orthogonal decomposition).
//!
//! `B` is `max(m, n) x nrhs`: rows `0..m` hold the right-hand sides on
//! entry and rows `0..n` the solution on exit. `A` is not modified.

use super::gemm::dgemm;
use super::householder::{apply_left, make_reflector, reflector_vector};
use super::pivoted_qr::{apply_qt, estimate_rank, pivoted_qr};
use super::svd::{BidiagonalSolver, factorize};
use crate::algorithm::{Transpose, effective_rcond};
use crate::config::KernelConfig;

fn zero_solution(n: usize, nrhs: usize, b: &mut [f64], ldb: usize) {
    for j in 0..nrhs {
        b[j * ldb..j * ldb + n].fill(0.0);
    }
}

/// SVD-based solve. Returns `0`, or the number of superdiagonals that failed
/// to converge, in which case `b` is left untouched.
#[allow(clippy::too_many_arguments)]
pub fn gelsd(
    m: usize,
    n: usize,
    nrhs: usize,
    a: &[f64],
    lda: usize,
    b: &mut [f64],
    ldb: usize,
    s: &mut [f64],
    rcond: f64,
    rank: &mut usize,
    cfg: &KernelConfig,
) -> usize {
    let k = m.min(n);
    if k == 0 {
        *rank = 0;
        zero_solution(n, nrhs, b, ldb);
        return 0;
    }

    let f = factorize(a, lda, m, n, k, k, BidiagonalSolver::DivideAndConquer, cfg);
    s[..k].copy_from_slice(&f.s);
    if f.info > 0 {
        return f.info;
    }

    let thresh = effective_rcond(rcond, m, n) * f.s[0];
    let r = f.s.iter().take_while(|&&x| x > thresh).count();
    *rank = r;
    if nrhs == 0 {
        return 0;
    }

    let thr = cfg.parallel_flop_threshold;
    // c = diag(1/s) Uᵀ B, truncated to the numerical rank
    let mut c = vec![0.0; k * nrhs];
    dgemm(
        Transpose::Trans,
        Transpose::NoTrans,
        k,
        nrhs,
        m,
        1.0,
        &f.u,
        m,
        b,
        ldb,
        0.0,
        &mut c,
        k,
        thr,
    );
    for col in c.chunks_mut(k) {
        for (i, x) in col.iter_mut().enumerate() {
            *x = if i < r { *x / f.s[i] } else { 0.0 };
        }
    }
    dgemm(
        Transpose::NoTrans,
        Transpose::NoTrans,
        n,
        nrhs,
        k,
        1.0,
        &f.v,
        n,
        &c,
        k,
        0.0,
        b,
        ldb,
        thr,
    );
    0
}

/// Complete-orthogonal-factorization solve. Always succeeds.
#[allow(clippy::too_many_arguments)]
pub fn gelsy(
    m: usize,
    n: usize,
    nrhs: usize,
    a: &[f64],
    lda: usize,
    b: &mut [f64],
    ldb: usize,
    rcond: f64,
    rank: &mut usize,
) -> usize {
    let k = m.min(n);
    let mut w = vec![0.0; m * n];
    for j in 0..n {
        w[j * m..(j + 1) * m].copy_from_slice(&a[j * lda..j * lda + m]);
    }
    if k == 0 || w.iter().all(|&x| x == 0.0) {
        *rank = 0;
        zero_solution(n, nrhs, b, ldb);
        return 0;
    }

    let qr = pivoted_qr(&mut w, m, m, n);
    let r = estimate_rank(&w, m, k, effective_rcond(rcond, m, n));
    *rank = r;
    if nrhs == 0 {
        return 0;
    }

    // c = Qᵀ B
    let mut c = vec![0.0; m * nrhs];
    for j in 0..nrhs {
        c[j * m..(j + 1) * m].copy_from_slice(&b[j * ldb..j * ldb + m]);
    }
    apply_qt(&w, m, m, &qr.tau, &mut c, m, nrhs);

    let mut y = vec![0.0; n * nrhs];
    if r == n {
        // R11 y = c
        for j in 0..nrhs {
            for i in (0..r).rev() {
                let acc: f64 = (i + 1..r).map(|l| w[i + l * m] * y[l + j * n]).sum();
                y[i + j * n] = (c[i + j * m] - acc) / w[i + i * m];
            }
        }
    } else if r > 0 {
        // [R11 R12]ᵀ = Z S, so the minimum-norm y is Z S⁻ᵀ c
        let mut t = vec![0.0; n * r];
        for j in 0..r {
            for i in j..n {
                t[i + j * n] = w[j + i * m];
            }
        }
        let mut ztau = vec![0.0; r];
        for j in 0..r {
            let col = &mut t[j * n + j..(j + 1) * n];
            let (head, tail) = col.split_at_mut(1);
            ztau[j] = make_reflector(&mut head[0], tail);
            let v = reflector_vector(tail.iter().copied());
            apply_left(&mut t, n, &v, ztau[j], j, j + 1..r);
        }
        for j in 0..nrhs {
            let g = &mut y[j * n..(j + 1) * n];
            for i in 0..r {
                let acc: f64 = (0..i).map(|l| t[l + i * n] * g[l]).sum();
                g[i] = (c[i + j * m] - acc) / t[i + i * n];
            }
        }
        for j in (0..r).rev() {
            let v = reflector_vector((j + 1..n).map(|i| t[i + j * n]));
            apply_left(&mut y, n, &v, ztau[j], j, 0..nrhs);
        }
    }

    for j in 0..nrhs {
        for (i, &src) in qr.perm.iter().enumerate() {
            b[src + j * ldb] = y[i + j * n];
        }
    }
    0
}
