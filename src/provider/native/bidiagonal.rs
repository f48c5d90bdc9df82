//! Householder bidiagonalization and implicit-shift bidiagonal QR
//!
//! For a tall matrix (`m >= n`) the reduction produces `A = Q B Pᵀ` with `B`
//! upper bidiagonal. [`bidiagonal_qr`] then diagonalizes `B` with
//! Golub-Kahan sweeps, accumulating the rotations into the columns of `U`
//! (initially `Q`) and `V` (initially `P`).

use super::householder::{apply_left, apply_right, make_reflector, reflector_vector};
use super::rotation::{Givens, identity_matrix, negate_column, swap_columns};

/// Result of [`bidiagonalize`]; the reflector tails live in the reduced matrix.
#[derive(Debug, Clone)]
pub struct Bidiagonal {
    /// Diagonal of `B` (length `n`)
    pub d: Vec<f64>,
    /// Superdiagonal of `B` (length `n`, last entry zero)
    pub e: Vec<f64>,
    /// Left reflector scalars (length `n`)
    pub tauq: Vec<f64>,
    /// Right reflector scalars (length `n`, last entry zero)
    pub taup: Vec<f64>,
}

/// Reduce a tall `m x n` column-major matrix to upper bidiagonal form in place.
///
/// Column `j` below the diagonal receives the tail of the left reflector
/// `H_j`; row `j` right of the superdiagonal receives the tail of the right
/// reflector `G_j`.
pub fn bidiagonalize(a: &mut [f64], lda: usize, m: usize, n: usize) -> Bidiagonal {
    debug_assert!(m >= n);
    let mut d = vec![0.0; n];
    let mut e = vec![0.0; n];
    let mut tauq = vec![0.0; n];
    let mut taup = vec![0.0; n];

    for j in 0..n {
        let col = &mut a[j * lda + j..j * lda + m];
        let (head, tail) = col.split_at_mut(1);
        tauq[j] = make_reflector(&mut head[0], tail);
        d[j] = head[0];
        let v = reflector_vector(tail.iter().copied());
        apply_left(a, lda, &v, tauq[j], j, j + 1..n);

        if j + 1 < n {
            let mut alpha = a[j + (j + 1) * lda];
            let mut row: Vec<f64> = (j + 2..n).map(|c| a[j + c * lda]).collect();
            taup[j] = make_reflector(&mut alpha, &mut row);
            e[j] = alpha;
            a[j + (j + 1) * lda] = alpha;
            for (c, &x) in (j + 2..n).zip(&row) {
                a[j + c * lda] = x;
            }
            let v = reflector_vector(row.iter().copied());
            apply_right(a, lda, &v, taup[j], j + 1, j + 1..m);
        }
    }
    Bidiagonal { d, e, tauq, taup }
}

/// Form the leading `q_cols` columns of `Q = H_0 ... H_{n-1}` (`m x q_cols`,
/// `n <= q_cols <= m`).
pub fn form_q(a: &[f64], lda: usize, m: usize, n: usize, tauq: &[f64], q_cols: usize) -> Vec<f64> {
    let mut q = identity_matrix(m, q_cols);
    for j in (0..n).rev() {
        let v = reflector_vector((j + 1..m).map(|i| a[i + j * lda]));
        apply_left(&mut q, m, &v, tauq[j], j, j..q_cols);
    }
    q
}

/// Form `P = G_0 ... G_{n-2}` (`n x n`).
pub fn form_p(a: &[f64], lda: usize, n: usize, taup: &[f64]) -> Vec<f64> {
    let mut p = identity_matrix(n, n);
    for j in (0..n.saturating_sub(1)).rev() {
        let v = reflector_vector((j + 2..n).map(|c| a[j + c * lda]));
        apply_left(&mut p, n, &v, taup[j], j + 1, j + 1..n);
    }
    p
}

/// Columns of `U` and `V` that bidiagonal rotations are applied to.
pub struct SingularVectors<'a> {
    /// `U` (`m x u_cols`, leading dimension `m`), if wanted
    pub u: Option<&'a mut [f64]>,
    /// Rows of `U`
    pub m: usize,
    /// `V` (`n x n`, leading dimension `n`), if wanted
    pub v: Option<&'a mut [f64]>,
}

/// Diagonalize the upper bidiagonal `(d, e)` with implicit-shift QR sweeps.
///
/// On success `d` holds the singular values in descending order and `0` is
/// returned. If `max_sweeps` QR sweeps are exhausted the number of
/// superdiagonal entries that are still nonzero is returned instead, and
/// `d` is left unsorted.
pub fn bidiagonal_qr(d: &mut [f64], e: &mut [f64], vecs: SingularVectors<'_>, max_sweeps: usize) -> usize {
    let n = d.len();
    debug_assert_eq!(e.len(), n);
    let SingularVectors { mut u, m, mut v } = vecs;
    let eps = f64::EPSILON;
    let tiny = 2f64.powi(-966);

    let mut sweeps = 0usize;
    let mut p = n;
    while p > 0 {
        // Largest k < p - 1 with a negligible e[k]; -1 if none.
        let mut k = p as isize - 2;
        while k >= 0 {
            let ku = k as usize;
            if e[ku].abs() <= tiny + eps * (d[ku].abs() + d[ku + 1].abs()) {
                e[ku] = 0.0;
                break;
            }
            k -= 1;
        }

        let kase;
        if k == p as isize - 2 {
            kase = 4;
        } else {
            let mut ks = p as isize - 1;
            while ks > k {
                let ksu = ks as usize;
                let t = (if ksu != p { e[ksu].abs() } else { 0.0 })
                    + (if ks != k + 1 { e[ksu - 1].abs() } else { 0.0 });
                if d[ksu].abs() <= tiny + eps * t {
                    d[ksu] = 0.0;
                    break;
                }
                ks -= 1;
            }
            if ks == k {
                kase = 3;
            } else if ks == p as isize - 1 {
                kase = 1;
            } else {
                kase = 2;
                k = ks;
            }
        }
        let k = (k + 1) as usize;

        match kase {
            // d[p-1] is negligible: chase e[p-2] out through the columns of V
            1 => {
                let mut f = e[p - 2];
                e[p - 2] = 0.0;
                for j in (k..=p - 2).rev() {
                    let (g, t) = Givens::zeroing(d[j], f);
                    d[j] = t;
                    if j != k {
                        f = -g.s * e[j - 1];
                        e[j - 1] *= g.c;
                    }
                    if let Some(v) = v.as_deref_mut() {
                        g.apply_to_columns(v, n, n, j, p - 1);
                    }
                }
            }
            // d[k-1] is negligible: split, chasing e[k-1] through U
            2 => {
                let mut f = e[k - 1];
                e[k - 1] = 0.0;
                for j in k..p {
                    let (g, t) = Givens::zeroing(d[j], f);
                    d[j] = t;
                    f = -g.s * e[j];
                    e[j] *= g.c;
                    if let Some(u) = u.as_deref_mut() {
                        g.apply_to_columns(u, m, m, j, k - 1);
                    }
                }
            }
            // One implicit-shift QR sweep on the unreduced block k..p
            3 => {
                if sweeps >= max_sweeps {
                    return e[..n.saturating_sub(1)].iter().filter(|x| **x != 0.0).count();
                }
                sweeps += 1;

                let scale = d[p - 1]
                    .abs()
                    .max(d[p - 2].abs())
                    .max(e[p - 2].abs())
                    .max(d[k].abs())
                    .max(e[k].abs());
                let sp = d[p - 1] / scale;
                let spm1 = d[p - 2] / scale;
                let epm1 = e[p - 2] / scale;
                let sk = d[k] / scale;
                let ek = e[k] / scale;
                let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / 2.0;
                let c = (sp * epm1) * (sp * epm1);
                let mut shift = 0.0;
                if b != 0.0 || c != 0.0 {
                    shift = (b * b + c).sqrt();
                    if b < 0.0 {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }
                let mut f = (sk + sp) * (sk - sp) + shift;
                let mut g = sk * ek;

                for j in k..p - 1 {
                    let (rot, t) = Givens::zeroing(f, g);
                    if j != k {
                        e[j - 1] = t;
                    }
                    f = rot.c * d[j] + rot.s * e[j];
                    e[j] = rot.c * e[j] - rot.s * d[j];
                    g = rot.s * d[j + 1];
                    d[j + 1] *= rot.c;
                    if let Some(v) = v.as_deref_mut() {
                        rot.apply_to_columns(v, n, n, j, j + 1);
                    }

                    let (rot, t) = Givens::zeroing(f, g);
                    d[j] = t;
                    f = rot.c * e[j] + rot.s * d[j + 1];
                    d[j + 1] = -rot.s * e[j] + rot.c * d[j + 1];
                    g = rot.s * e[j + 1];
                    e[j + 1] *= rot.c;
                    if let Some(u) = u.as_deref_mut() {
                        if j + 1 < m {
                            rot.apply_to_columns(u, m, m, j, j + 1);
                        }
                    }
                }
                e[p - 2] = f;
            }
            // d[k] converged: make it non-negative and sift it into place
            _ => {
                let mut k = k;
                if d[k] <= 0.0 {
                    d[k] = if d[k] < 0.0 { -d[k] } else { 0.0 };
                    if let Some(v) = v.as_deref_mut() {
                        negate_column(v, n, n, k);
                    }
                }
                while k + 1 < n {
                    if d[k] >= d[k + 1] {
                        break;
                    }
                    d.swap(k, k + 1);
                    if let Some(v) = v.as_deref_mut() {
                        swap_columns(v, n, n, k, k + 1);
                    }
                    if let Some(u) = u.as_deref_mut() {
                        swap_columns(u, m, m, k, k + 1);
                    }
                    k += 1;
                }
                p -= 1;
            }
        }
    }
    0
}
