//! Dense SVD drivers
//!
//! Both `dgesvd` and `dgesdd` reduce to [`factorize`], which bidiagonalizes
//! a tall copy of `A` (transposing wide inputs) and diagonalizes the
//! bidiagonal with either implicit QR sweeps or divide and conquer. The
//! drivers only differ in the solver and in where the vectors are written.

use super::bidiagonal::{SingularVectors, bidiagonal_qr, bidiagonalize, form_p, form_q};
use super::divide_conquer::{DcSettings, bidiagonal_svd};
use super::gemm::matmul;
use crate::algorithm::SvdJob;
use crate::config::KernelConfig;
use crate::provider::arguments::gesdd_output_shape;

/// Method used to diagonalize the bidiagonal factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidiagonalSolver {
    /// Golub-Kahan implicit-shift QR sweeps
    QrIteration,
    /// Divide and conquer on the Golub-Kahan tridiagonal
    DivideAndConquer,
}

/// `A = U diag(s) Vᵀ` with dense, packed factors.
#[derive(Debug, Clone)]
pub struct SvdFactors {
    /// Singular values, descending when `info == 0`
    pub s: Vec<f64>,
    /// `m x u_cols` left singular vectors (empty when none were requested)
    pub u: Vec<f64>,
    /// `n x v_cols` right singular vectors, stored as `V` (not `Vᵀ`)
    pub v: Vec<f64>,
    /// `0`, or the number of superdiagonals that did not converge
    pub info: usize,
}

fn dc_settings(cfg: &KernelConfig) -> DcSettings {
    DcSettings {
        leaf_size: cfg.dc_leaf_size,
        max_ql_iterations: cfg.max_ql_iterations,
        parallel_threshold: cfg.parallel_flop_threshold,
    }
}

/// Singular value decomposition of the `m x n` matrix `a` (leading dimension
/// `lda`). `a` itself is not modified.
///
/// `u_cols` must be `0`, `min(m, n)` or `m`; `v_cols` must be `0`,
/// `min(m, n)` or `n`.
#[allow(clippy::too_many_arguments)]
pub fn factorize(
    a: &[f64],
    lda: usize,
    m: usize,
    n: usize,
    u_cols: usize,
    v_cols: usize,
    solver: BidiagonalSolver,
    cfg: &KernelConfig,
) -> SvdFactors {
    if m >= n {
        let mut work = vec![0.0; m * n];
        for j in 0..n {
            work[j * m..(j + 1) * m].copy_from_slice(&a[j * lda..j * lda + m]);
        }
        let (s, u, v, info) = factorize_tall(work, m, n, u_cols, v_cols > 0, solver, cfg);
        SvdFactors { s, u, v, info }
    } else {
        // Aᵀ = V Σ Uᵀ: the tall factorization of Aᵀ swaps the roles
        let mut work = vec![0.0; n * m];
        for j in 0..n {
            for i in 0..m {
                work[j + i * n] = a[i + j * lda];
            }
        }
        let (s, v, u, info) = factorize_tall(work, n, m, v_cols, u_cols > 0, solver, cfg);
        SvdFactors { s, u, v, info }
    }
}

/// Tall (`m >= n`) kernel; returns `(s, U (m x q_cols), V (n x n), info)`.
fn factorize_tall(
    mut work: Vec<f64>,
    m: usize,
    n: usize,
    q_cols: usize,
    want_v: bool,
    solver: BidiagonalSolver,
    cfg: &KernelConfig,
) -> (Vec<f64>, Vec<f64>, Vec<f64>, usize) {
    let bd = bidiagonalize(&mut work, m, m, n);
    let mut u = if q_cols > 0 {
        form_q(&work, m, m, n, &bd.tauq, q_cols)
    } else {
        Vec::new()
    };
    let mut v = if want_v {
        form_p(&work, m, n, &bd.taup)
    } else {
        Vec::new()
    };
    let mut d = bd.d;
    let mut e = bd.e;

    match solver {
        BidiagonalSolver::QrIteration => {
            let vecs = SingularVectors {
                u: (q_cols > 0).then_some(&mut u[..]),
                m,
                v: want_v.then_some(&mut v[..]),
            };
            let info = bidiagonal_qr(&mut d, &mut e, vecs, cfg.max_qr_sweeps * n * n);
            (d, u, v, info)
        }
        BidiagonalSolver::DivideAndConquer => match bidiagonal_svd(&d, &e, dc_settings(cfg)) {
            Ok(b) => {
                let thr = cfg.parallel_flop_threshold;
                if q_cols > 0 {
                    let mut head = vec![0.0; m * n];
                    matmul(m, n, n, &u[..m * n], &b.u, &mut head, thr);
                    u[..m * n].copy_from_slice(&head);
                }
                if want_v {
                    let mut pv = vec![0.0; n * n];
                    matmul(n, n, n, &v, &b.v, &mut pv, thr);
                    v = pv;
                }
                (b.s, u, v, 0)
            }
            Err(info) => (d, u, v, info),
        },
    }
}

/// Copy a dense `rows x cols` block into `dst` with leading dimension `ld`.
fn write_block(src: &[f64], rows: usize, cols: usize, dst: &mut [f64], ld: usize) {
    for j in 0..cols {
        dst[j * ld..j * ld + rows].copy_from_slice(&src[j * rows..(j + 1) * rows]);
    }
}

/// Write the first `rows` columns of `V` (`n x ..`) as the rows of `Vᵀ`.
fn write_transposed(v: &[f64], n: usize, rows: usize, dst: &mut [f64], ld: usize) {
    for r in 0..rows {
        for c in 0..n {
            dst[r + c * ld] = v[c + r * n];
        }
    }
}

/// `dgesvd` after argument checking: QR-iteration SVD.
#[allow(clippy::too_many_arguments)]
pub fn gesvd(
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
    cfg: &KernelConfig,
) -> usize {
    let k = m.min(n);
    let u_cols = jobu.vector_count(m, k);
    let v_cols = jobvt.vector_count(n, k);
    let f = factorize(a, lda, m, n, u_cols, v_cols, BidiagonalSolver::QrIteration, cfg);
    s[..k].copy_from_slice(&f.s);

    match jobu {
        SvdJob::All | SvdJob::Thin => write_block(&f.u, m, u_cols, u, ldu),
        SvdJob::Overwrite => write_block(&f.u, m, k, a, lda),
        SvdJob::None => {}
    }
    match jobvt {
        SvdJob::All | SvdJob::Thin => write_transposed(&f.v, n, v_cols, vt, ldvt),
        SvdJob::Overwrite => write_transposed(&f.v, n, k, a, lda),
        SvdJob::None => {}
    }
    f.info
}

/// `dgesdd` after argument checking: divide-and-conquer SVD.
#[allow(clippy::too_many_arguments)]
pub fn gesdd(
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
    cfg: &KernelConfig,
) -> usize {
    let k = m.min(n);
    let (u_out, vt_out) = gesdd_output_shape(jobz, m, n);
    let overwrite = jobz == SvdJob::Overwrite;
    let u_cols = if overwrite && m >= n { k } else { u_out };
    let v_cols = if overwrite && m < n { k } else { vt_out };

    let f = factorize(a, lda, m, n, u_cols, v_cols, BidiagonalSolver::DivideAndConquer, cfg);
    s[..k].copy_from_slice(&f.s);

    if overwrite && m >= n {
        write_block(&f.u, m, k, a, lda);
    } else if u_cols > 0 {
        write_block(&f.u, m, u_cols, u, ldu);
    }
    if overwrite && m < n {
        write_transposed(&f.v, n, k, a, lda);
    } else if v_cols > 0 {
        write_transposed(&f.v, n, v_cols, vt, ldvt);
    }
    f.info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(m: usize, n: usize) -> Vec<f64> {
        (0..m * n).map(|x| ((x * 7 + 3) % 11) as f64 - 5.0 + 0.1 * x as f64).collect()
    }

    fn reconstruct(f: &SvdFactors, m: usize, n: usize, k: usize) -> Vec<f64> {
        let mut out = vec![0.0; m * n];
        for j in 0..n {
            for i in 0..m {
                out[i + j * m] = (0..k).map(|l| f.u[i + l * m] * f.s[l] * f.v[j + l * n]).sum();
            }
        }
        out
    }

    #[test]
    fn test_factorize_tall_and_wide() {
        let cfg = KernelConfig::default();
        for &(m, n) in &[(5, 3), (3, 5), (4, 4)] {
            let a = sample(m, n);
            let k = m.min(n);
            for solver in [BidiagonalSolver::QrIteration, BidiagonalSolver::DivideAndConquer] {
                let f = factorize(&a, m, m, n, k, k, solver, &cfg);
                assert_eq!(f.info, 0);
                assert!(f.s.windows(2).all(|w| w[0] >= w[1]));
                let r = reconstruct(&f, m, n, k);
                for (x, y) in r.iter().zip(&a) {
                    assert!((x - y).abs() < 1e-10, "{m}x{n} {solver:?}");
                }
            }
        }
    }

    #[test]
    fn test_solvers_agree_on_singular_values() {
        let cfg = KernelConfig::default().with_dc_leaf_size(2);
        let a = sample(7, 6);
        let qr = factorize(&a, 7, 7, 6, 0, 0, BidiagonalSolver::QrIteration, &cfg);
        let dc = factorize(&a, 7, 7, 6, 0, 0, BidiagonalSolver::DivideAndConquer, &cfg);
        for (x, y) in qr.s.iter().zip(&dc.s) {
            assert!((x - y).abs() < 1e-10);
        }
    }

    #[test]
    fn test_gesdd_overwrite_wide_puts_vt_in_a() {
        let cfg = KernelConfig::default();
        let (m, n) = (2, 3);
        let original = sample(m, n);
        let mut a = original.clone();
        let mut s = [0.0; 2];
        let mut u = [0.0; 4];
        let mut vt = [0.0; 1];
        let info = gesdd(SvdJob::Overwrite, m, n, &mut a, m, &mut s, &mut u, m, &mut vt, 1, &cfg);
        assert_eq!(info, 0);
        // rows of Vᵀ are orthonormal
        for p in 0..m {
            for q in 0..m {
                let dot: f64 = (0..n).map(|c| a[p + c * m] * a[q + c * m]).sum();
                let expected = if p == q { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-12);
            }
        }
        // U Σ Vᵀ reproduces the input
        for c in 0..n {
            for r in 0..m {
                let x: f64 = (0..m).map(|l| u[r + l * m] * s[l] * a[l + c * m]).sum();
                assert!((x - original[r + c * m]).abs() < 1e-10);
            }
        }
    }
}
