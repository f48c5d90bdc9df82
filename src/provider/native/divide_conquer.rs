//! Divide-and-conquer eigensolver for symmetric tridiagonal matrices and the
//! bidiagonal SVD built on top of it
//!
//! # Algorithm
//! ```text
//! T = [T1  0 ] + beta * v vᵀ      v = e_{k-1} + e_k, k = n / 2
//!     [0   T2]
//! T1 = Q1 D1 Q1ᵀ, T2 = Q2 D2 Q2ᵀ  (recursively, QL below the leaf size)
//! T  = diag(Q1, Q2) (D + rho z zᵀ) diag(Q1, Q2)ᵀ
//! ```
//! The rank-one update `D + rho z zᵀ` is solved by deflating negligible
//! `z` components and nearly equal `d` pairs, finding the remaining
//! eigenvalues as roots of the secular equation
//! `1 + rho * sum(z_j^2 / (d_j - lambda)) = 0`, and recomputing `z` from the
//! roots (Gu-Eisenstat) so the eigenvectors come out numerically orthogonal.
//!
//! The bidiagonal SVD embeds `B` in the Golub-Kahan matrix
//! `[[0, Bᵀ], [B, 0]]`, permuted to tridiagonal form with zero diagonal and
//! off-diagonal `d0, e0, d1, e1, ..., d_{n-1}`. Its eigenvalues are `±σ`;
//! for `+σ` the eigenvector interleaves `v` (even entries) and `u` (odd
//! entries).

use super::gemm::dgemm;
use super::householder::norm2;
use super::rotation::{Givens, identity_matrix, normalize_columns, sort_ascending, swap_columns};
use super::tridiagonal::tql2;
use crate::algorithm::Transpose;

/// Upper bound on bisection steps for one secular root; enough to walk the
/// full exponent range of `f64`.
const MAX_BISECTION_STEPS: usize = 1100;

/// Settings threaded through the recursion
#[derive(Debug, Clone, Copy)]
pub struct DcSettings {
    /// Subproblems at or below this order are solved with QL directly
    pub leaf_size: usize,
    /// QL iteration limit per eigenvalue at the leaves
    pub max_ql_iterations: usize,
    /// GEMM parallelism threshold for the merge products
    pub parallel_threshold: usize,
}

/// Eigen-decompose the symmetric tridiagonal matrix with diagonal `d` and
/// off-diagonal `e` (`e.len() == d.len() - 1`).
///
/// On success `d` holds the eigenvalues in ascending order and the returned
/// `n x n` matrix holds the matching eigenvectors. A leaf QL failure is
/// reported as the number of unconverged off-diagonal elements.
pub fn tridiagonal_eigen(d: &mut [f64], e: &[f64], settings: DcSettings) -> Result<Vec<f64>, usize> {
    let n = d.len();
    if n <= settings.leaf_size.max(1) {
        let mut q = identity_matrix(n, n);
        let mut work = e.to_vec();
        work.resize(n, 0.0);
        let info = tql2(d, &mut work, Some((&mut q[..], n, n)), settings.max_ql_iterations);
        if info > 0 {
            return Err(info);
        }
        sort_ascending(d, Some((&mut q[..], n, n)));
        return Ok(q);
    }

    let k = n / 2;
    let beta = e[k - 1];
    let (q1, q2) = {
        let (d1, d2) = d.split_at_mut(k);
        d1[k - 1] -= beta;
        d2[0] -= beta;
        solve_halves(d1, &e[..k - 1], d2, &e[k..], settings)
    };
    let (q1, q2) = match (q1, q2) {
        (Ok(q1), Ok(q2)) => (q1, q2),
        (Err(a), Err(b)) => return Err(a + b),
        (Err(a), _) | (_, Err(a)) => return Err(a),
    };

    let (n1, n2) = (k, n - k);
    let scale = std::f64::consts::FRAC_1_SQRT_2;
    let z: Vec<f64> = (0..n1)
        .map(|c| q1[(n1 - 1) + c * n1] * scale)
        .chain((0..n2).map(|c| q2[c * n2] * scale))
        .collect();
    let (lambda, w) = rank_one_eigen(d, &z, 2.0 * beta);

    let mut q = vec![0.0; n * n];
    let nn = Transpose::NoTrans;
    let threshold = settings.parallel_threshold;
    dgemm(nn, nn, n1, n, n1, 1.0, &q1, n1, &w, n, 0.0, &mut q, n, threshold);
    dgemm(nn, nn, n2, n, n2, 1.0, &q2, n2, &w[n1..], n, 0.0, &mut q[n1..], n, threshold);
    d.copy_from_slice(&lambda);
    Ok(q)
}

type HalfResult = Result<Vec<f64>, usize>;

fn solve_halves(
    d1: &mut [f64],
    e1: &[f64],
    d2: &mut [f64],
    e2: &[f64],
    settings: DcSettings,
) -> (HalfResult, HalfResult) {
    #[cfg(feature = "rayon")]
    {
        let n = d1.len() + d2.len();
        if n.saturating_mul(n).saturating_mul(n) >= settings.parallel_threshold {
            return rayon::join(
                || tridiagonal_eigen(d1, e1, settings),
                || tridiagonal_eigen(d2, e2, settings),
            );
        }
    }
    (
        tridiagonal_eigen(d1, e1, settings),
        tridiagonal_eigen(d2, e2, settings),
    )
}

/// Eigen-decompose `diag(d) + rho * z zᵀ` with `||z|| = 1`.
///
/// Returns ascending eigenvalues and the `n x n` eigenvector matrix.
fn rank_one_eigen(d: &[f64], z: &[f64], rho: f64) -> (Vec<f64>, Vec<f64>) {
    let n = d.len();
    // D + rho z zᵀ = -((-D) + |rho| z zᵀ) when rho < 0
    let sign = if rho < 0.0 { -1.0 } else { 1.0 };
    let flipped: Vec<f64> = d.iter().map(|x| sign * x).collect();
    let (mut lambda, mut w) = rank_one_positive(&flipped, z, rho.abs());
    for l in lambda.iter_mut() {
        *l *= sign;
    }
    sort_ascending(&mut lambda, Some((&mut w[..], n, n)));
    (lambda, w)
}

fn rank_one_positive(d: &[f64], z: &[f64], rho: f64) -> (Vec<f64>, Vec<f64>) {
    let n = d.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| d[a].total_cmp(&d[b]));
    let mut ds: Vec<f64> = order.iter().map(|&i| d[i]).collect();
    let mut zs: Vec<f64> = order.iter().map(|&i| z[i]).collect();

    // Column c of g is the c-th working basis vector in original coordinates
    let mut g = vec![0.0; n * n];
    for (c, &i) in order.iter().enumerate() {
        g[i + c * n] = 1.0;
    }

    let dmax = ds.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
    let tol = 8.0 * f64::EPSILON * dmax.max(rho);

    let mut keep: Vec<usize> = Vec::with_capacity(n);
    let mut deflated: Vec<usize> = Vec::new();
    for j in 0..n {
        if rho * zs[j].abs() <= tol {
            deflated.push(j);
            continue;
        }
        if let Some(&i) = keep.last() {
            let (rot, r) = Givens::zeroing(zs[j], zs[i]);
            let (c, s) = (rot.c, rot.s);
            if (c * s * (ds[j] - ds[i])).abs() <= tol {
                // Rotate z_i into z_j; the (i, j) coupling left behind is below tol
                for row in 0..n {
                    let gi = g[row + i * n];
                    let gj = g[row + j * n];
                    g[row + i * n] = c * gi - s * gj;
                    g[row + j * n] = s * gi + c * gj;
                }
                let (di, dj) = (ds[i], ds[j]);
                ds[i] = c * c * di + s * s * dj;
                ds[j] = s * s * di + c * c * dj;
                zs[i] = 0.0;
                zs[j] = r;
                keep.pop();
                deflated.push(i);
            }
        }
        keep.push(j);
    }

    let kk = keep.len();
    let dk: Vec<f64> = keep.iter().map(|&j| ds[j]).collect();
    let zk: Vec<f64> = keep.iter().map(|&j| zs[j]).collect();
    let zsq: Vec<f64> = zk.iter().map(|x| x * x).collect();
    let znorm2: f64 = zsq.iter().sum();

    // Root i is stored as dk[origin[i]] + tau[i] so that differences to the
    // poles keep full relative accuracy.
    let mut origin = vec![0usize; kk];
    let mut tau = vec![0.0; kk];
    for i in 0..kk {
        let (o, lo, hi) = if i + 1 < kk {
            let half = 0.5 * (dk[i + 1] - dk[i]);
            if secular(&dk, &zsq, rho, i, half) >= 0.0 {
                (i, 0.0, half)
            } else {
                (i + 1, -half, 0.0)
            }
        } else {
            (i, 0.0, rho * znorm2)
        };
        origin[i] = o;
        tau[i] = bisect(&dk, &zsq, rho, o, lo, hi);
    }

    // lambda_i - d_j
    let gap = |i: usize, j: usize| (dk[origin[i]] - dk[j]) + tau[i];

    let mut zhat = vec![0.0; kk];
    for j in 0..kk {
        let mut prod = gap(kk - 1, j) / rho;
        for i in 0..j {
            prod *= gap(i, j) / (dk[i] - dk[j]);
        }
        for i in j..kk.saturating_sub(1) {
            prod *= gap(i, j) / (dk[i + 1] - dk[j]);
        }
        zhat[j] = prod.max(0.0).sqrt().copysign(zk[j]);
    }

    let mut lambda = Vec::with_capacity(n);
    let mut w = vec![0.0; n * n];
    let mut x = vec![0.0; kk];
    for i in 0..kk {
        for (j, xj) in x.iter_mut().enumerate() {
            let mut den = -gap(i, j);
            if den == 0.0 {
                den = f64::MIN_POSITIVE;
            }
            *xj = zhat[j] / den;
        }
        let nrm = norm2(&x);
        if nrm > 0.0 {
            for xj in x.iter_mut() {
                *xj /= nrm;
            }
        }
        let out = lambda.len();
        let col = &mut w[out * n..(out + 1) * n];
        for (&kj, &coef) in keep.iter().zip(&x) {
            if coef != 0.0 {
                for (row, cv) in col.iter_mut().enumerate() {
                    *cv += g[row + kj * n] * coef;
                }
            }
        }
        lambda.push(dk[origin[i]] + tau[i]);
    }
    for &i in &deflated {
        let out = lambda.len();
        w[out * n..(out + 1) * n].copy_from_slice(&g[i * n..(i + 1) * n]);
        lambda.push(ds[i]);
    }
    (lambda, w)
}

/// Secular function evaluated at `dk[origin] + tau`
fn secular(dk: &[f64], zsq: &[f64], rho: f64, origin: usize, tau: f64) -> f64 {
    let base = dk[origin];
    let sum: f64 = dk
        .iter()
        .zip(zsq)
        .map(|(&dj, &zj)| zj / ((dj - base) - tau))
        .sum();
    1.0 + rho * sum
}

/// Bisect the secular function on `(lo, hi)` relative to `dk[origin]`.
/// The function is increasing, negative near `lo` and positive near `hi`.
fn bisect(dk: &[f64], zsq: &[f64], rho: f64, origin: usize, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..MAX_BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let f = secular(dk, zsq, rho, origin, mid);
        if f > 0.0 {
            hi = mid;
        } else if f < 0.0 {
            lo = mid;
        } else {
            return mid;
        }
    }
    0.5 * (lo + hi)
}

/// SVD of an `n x n` upper bidiagonal matrix: `B = U diag(s) Vᵀ`
#[derive(Debug, Clone)]
pub struct BidiagonalSvd {
    /// Singular values, descending
    pub s: Vec<f64>,
    /// Left singular vectors (`n x n`)
    pub u: Vec<f64>,
    /// Right singular vectors (`n x n`)
    pub v: Vec<f64>,
}

/// Divide-and-conquer SVD of the upper bidiagonal matrix with diagonal `d`
/// and superdiagonal `e` (`e.len() >= d.len() - 1`).
pub fn bidiagonal_svd(d: &[f64], e: &[f64], settings: DcSettings) -> Result<BidiagonalSvd, usize> {
    let n = d.len();
    if n == 0 {
        return Ok(BidiagonalSvd {
            s: Vec::new(),
            u: Vec::new(),
            v: Vec::new(),
        });
    }

    let size = 2 * n;
    let mut diag = vec![0.0; size];
    let mut off = vec![0.0; size - 1];
    for i in 0..n {
        off[2 * i] = d[i];
        if i + 1 < n {
            off[2 * i + 1] = e[i];
        }
    }
    let q = tridiagonal_eigen(&mut diag, &off, settings)?;

    let mut s = vec![0.0; n];
    let mut u = vec![0.0; n * n];
    let mut v = vec![0.0; n * n];
    for c in 0..n {
        let idx = size - 1 - c;
        let col = &q[idx * size..(idx + 1) * size];
        // B v = lambda u; a negative lambda is -sigma with u flipped
        let flip = if diag[idx] < 0.0 { -1.0 } else { 1.0 };
        s[c] = diag[idx].abs();
        for i in 0..n {
            v[i + c * n] = col[2 * i];
            u[i + c * n] = flip * col[2 * i + 1];
        }
    }
    normalize_columns(&mut u, n, n, n);
    normalize_columns(&mut v, n, n, n);
    orthonormalize_columns(&mut u, n);
    orthonormalize_columns(&mut v, n);

    for i in 0..n {
        let mut best = i;
        for j in i + 1..n {
            if s[j] > s[best] {
                best = j;
            }
        }
        if best != i {
            s.swap(i, best);
            swap_columns(&mut u, n, n, i, best);
            swap_columns(&mut v, n, n, i, best);
        }
    }
    Ok(BidiagonalSvd { s, u, v })
}

/// Modified Gram-Schmidt over the columns of a square matrix, in order.
///
/// Columns belonging to (numerically) zero singular values come out of the
/// Golub-Kahan embedding with an arbitrary `u`/`v` split; any column that
/// loses more than half its length to the projection is replaced by the
/// standard basis vector with the largest component outside the span of
/// the preceding columns.
fn orthonormalize_columns(x: &mut [f64], n: usize) {
    for c in 0..n {
        let mut cand = x[c * n..(c + 1) * n].to_vec();
        project_out(&mut cand, x, n, c);
        project_out(&mut cand, x, n, c);
        let mut r = norm2(&cand);
        if r < 0.5 {
            let mut best_norm = 0.0;
            let mut best = vec![0.0; n];
            for b in 0..n {
                let mut unit = vec![0.0; n];
                unit[b] = 1.0;
                project_out(&mut unit, x, n, c);
                project_out(&mut unit, x, n, c);
                let rn = norm2(&unit);
                if rn > best_norm {
                    best_norm = rn;
                    best = unit;
                }
            }
            cand = best;
            r = best_norm;
        }
        for (dst, &val) in x[c * n..(c + 1) * n].iter_mut().zip(&cand) {
            *dst = val / r;
        }
    }
}

fn project_out(v: &mut [f64], x: &[f64], n: usize, upto: usize) {
    for p in 0..upto {
        let col = &x[p * n..(p + 1) * n];
        let dot: f64 = col.iter().zip(v.iter()).map(|(a, b)| a * b).sum();
        for (vi, &ci) in v.iter_mut().zip(col) {
            *vi -= dot * ci;
        }
    }
}
