//! Symmetric tridiagonal reduction and implicit QL iteration

use super::householder::{make_reflector, reflector_vector};
use super::rotation::identity_matrix;

/// Symmetric tridiagonal matrix `T = Qᵀ A Q`
#[derive(Debug, Clone)]
pub struct Tridiagonal {
    /// Diagonal (length `n`)
    pub d: Vec<f64>,
    /// Off-diagonal, `e[i]` couples `i` and `i + 1` (length `n`, last zero)
    pub e: Vec<f64>,
    /// Orthogonal `Q` (`n x n`), present when requested
    pub q: Option<Vec<f64>>,
}

/// Reduce a full symmetric `n x n` column-major matrix (leading dimension
/// `n`) to tridiagonal form with Householder similarity transforms.
///
/// `a` is used as workspace and holds the reflector tails on return.
pub fn tridiagonalize(a: &mut [f64], n: usize, want_q: bool) -> Tridiagonal {
    let mut d = vec![0.0; n];
    let mut e = vec![0.0; n];
    let mut taus = vec![0.0; n];

    for j in 0..n.saturating_sub(1) {
        let len = n - j - 1;
        let col = &mut a[j * n + j + 1..(j + 1) * n];
        let (head, tail) = col.split_at_mut(1);
        let tau = make_reflector(&mut head[0], tail);
        e[j] = head[0];
        taus[j] = tau;
        d[j] = a[j + j * n];
        if tau == 0.0 {
            continue;
        }
        let v = reflector_vector((j + 2..n).map(|i| a[i + j * n]));

        // Trailing block A22 := H A22 H as a symmetric rank-2 update
        let base = j + 1;
        let mut p = vec![0.0; len];
        for c in 0..len {
            let col = (base + c) * n + base;
            let vc = v[c];
            for (pr, &arc) in p.iter_mut().zip(&a[col..col + len]) {
                *pr += arc * vc;
            }
        }
        for x in p.iter_mut() {
            *x *= tau;
        }
        let k = 0.5 * tau * p.iter().zip(&v).map(|(x, y)| x * y).sum::<f64>();
        let w: Vec<f64> = p.iter().zip(&v).map(|(pi, vi)| pi - k * vi).collect();
        for c in 0..len {
            let col = (base + c) * n + base;
            let (vc, wc) = (v[c], w[c]);
            for r in 0..len {
                a[col + r] -= v[r] * wc + w[r] * vc;
            }
        }
    }
    if n > 0 {
        d[n - 1] = a[(n - 1) * n + n - 1];
    }

    let q = want_q.then(|| {
        let mut q = identity_matrix(n, n);
        for j in (0..n.saturating_sub(1)).rev() {
            if taus[j] == 0.0 {
                continue;
            }
            let v = reflector_vector((j + 2..n).map(|i| a[i + j * n]));
            super::householder::apply_left(&mut q, n, &v, taus[j], j + 1, j + 1..n);
        }
        q
    });

    Tridiagonal { d, e, q }
}

fn negligible(d: &[f64], e: &[f64], i: usize, tst1: f64) -> bool {
    e[i].abs() <= f64::EPSILON * (d[i].abs() + d[i + 1].abs()).max(tst1)
}

/// Implicit QL iteration with Wilkinson-style shifts on a symmetric
/// tridiagonal matrix.
///
/// `e[i]` couples `i` and `i + 1`; `e` must have length `n` and its content
/// is destroyed. When `z` is given (`n_rows x n`, leading dimension `ldz`)
/// the rotations are accumulated into its columns, so passing `Q` from
/// [`tridiagonalize`] yields eigenvectors of the original matrix.
///
/// An off-diagonal element is negligible when it is below `eps` times the
/// larger of its two diagonal neighbours and the running row norm
/// `max |d[i]| + |e[i]|` over the rows already visited, so blocks with a
/// zero diagonal still split.
///
/// Eigenvalues are left unsorted in `d`. Returns `0` on success, or the
/// number of off-diagonal elements that had not converged when some
/// eigenvalue exceeded `max_iter` iterations.
pub fn tql2(
    d: &mut [f64],
    e: &mut [f64],
    mut z: Option<(&mut [f64], usize, usize)>,
    max_iter: usize,
) -> usize {
    let n = d.len();
    if n > 0 {
        e[n - 1] = 0.0;
    }

    let mut tst1 = 0.0f64;
    for l in 0..n {
        tst1 = tst1.max(d[l].abs() + e[l].abs());
        let mut iter = 0;
        loop {
            let mut m = l;
            while m + 1 < n && !negligible(d, e, m, tst1) {
                m += 1;
            }
            if m == l {
                break;
            }
            if iter == max_iter {
                return (0..n - 1)
                    .filter(|&i| !negligible(d, e, i, tst1))
                    .count()
                    .max(1);
            }
            iter += 1;

            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = g.hypot(1.0);
            g = d[m] - d[l] + e[l] / (g + r.copysign(g));
            let (mut s, mut c, mut p) = (1.0, 1.0, 0.0);
            let mut underflow = false;
            let mut i = m;
            while i > l {
                i -= 1;
                let f = s * e[i];
                let b = c * e[i];
                r = f.hypot(g);
                e[i + 1] = r;
                if r == 0.0 {
                    d[i + 1] -= p;
                    e[m] = 0.0;
                    underflow = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                p = s * r;
                d[i + 1] = g + p;
                g = c * r - b;
                if let Some((zd, ldz, rows)) = z.as_mut() {
                    let (ldz, rows) = (*ldz, *rows);
                    for k in 0..rows {
                        let zf = zd[k + (i + 1) * ldz];
                        let zi = zd[k + i * ldz];
                        zd[k + (i + 1) * ldz] = s * zi + c * zf;
                        zd[k + i * ldz] = c * zi - s * zf;
                    }
                }
            }
            if underflow {
                continue;
            }
            d[l] -= p;
            e[l] = g;
            e[m] = 0.0;
        }
    }
    0
}
