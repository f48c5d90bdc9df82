//! Householder QR with column pivoting
//!
//! Produces `A P = Q R` where at every step the remaining column of largest
//! norm is moved to the front, so `|R[0,0]| >= |R[1,1]| >= ...` up to
//! rounding. Column norms are downdated between steps and recomputed when
//! cancellation makes the downdate unreliable.
//!
//! [`estimate_rank`] grows the leading block `R11` one column at a time while
//! tracking estimates of its largest and smallest singular values.

use super::householder::{apply_left, make_reflector, norm2, reflector_vector};
use super::rotation::swap_columns;

/// Pivoted QR factors; `R` and the reflector tails live in the input matrix.
#[derive(Debug, Clone)]
pub struct PivotedQr {
    /// Reflector scalars (length `min(m, n)`)
    pub tau: Vec<f64>,
    /// `perm[j]` is the original index of the column now at position `j`
    pub perm: Vec<usize>,
}

/// Factor the `m x n` column-major matrix `a` in place.
pub fn pivoted_qr(a: &mut [f64], lda: usize, m: usize, n: usize) -> PivotedQr {
    let k = m.min(n);
    let mut perm: Vec<usize> = (0..n).collect();
    let mut tau = vec![0.0; k];
    let mut vn1: Vec<f64> = (0..n).map(|j| norm2(&a[j * lda..j * lda + m])).collect();
    let mut vn2 = vn1.clone();
    let tol3z = f64::EPSILON.sqrt();

    for j in 0..k {
        let pvt = (j..n).fold(j, |best, c| if vn1[c] > vn1[best] { c } else { best });
        if pvt != j {
            swap_columns(a, lda, m, j, pvt);
            perm.swap(j, pvt);
            vn1[pvt] = vn1[j];
            vn2[pvt] = vn2[j];
        }

        let col = &mut a[j * lda + j..j * lda + m];
        let (head, tail) = col.split_at_mut(1);
        tau[j] = make_reflector(&mut head[0], tail);
        let v = reflector_vector(tail.iter().copied());
        apply_left(a, lda, &v, tau[j], j, j + 1..n);

        for c in j + 1..n {
            if vn1[c] == 0.0 {
                continue;
            }
            let ratio = a[j + c * lda].abs() / vn1[c];
            let temp = (1.0 - ratio * ratio).max(0.0);
            let temp2 = temp * (vn1[c] / vn2[c]).powi(2);
            if temp2 <= tol3z {
                vn1[c] = if j + 1 < m {
                    norm2(&a[c * lda + j + 1..c * lda + m])
                } else {
                    0.0
                };
                vn2[c] = vn1[c];
            } else {
                vn1[c] *= temp.sqrt();
            }
        }
    }
    PivotedQr { tau, perm }
}

/// Apply `Qᵀ = H_{k-1} ... H_0` to the `m x nrhs` matrix `b` in place.
pub fn apply_qt(
    a: &[f64],
    lda: usize,
    m: usize,
    tau: &[f64],
    b: &mut [f64],
    ldb: usize,
    nrhs: usize,
) {
    for (j, &t) in tau.iter().enumerate() {
        let v = reflector_vector((j + 1..m).map(|i| a[i + j * lda]));
        apply_left(b, ldb, &v, t, j, 0..nrhs);
    }
}

/// Which extreme singular value an incremental estimate tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Largest,
    Smallest,
}

/// Updated estimate after appending one column to a triangular matrix
#[derive(Debug, Clone, Copy)]
struct Estimate {
    sest: f64,
    s: f64,
    c: f64,
}

impl Estimate {
    fn new(sest: f64, s: f64, c: f64) -> Self {
        Self { sest, s, c }
    }
}

/// One step of incremental condition estimation.
///
/// Given `sest`, an estimate of an extreme singular value of the `j x j`
/// upper-triangular `L` with approximate singular vector `x`, return the
/// estimate for `[L w; 0 gamma]` along with `(s, c)` such that
/// `[s * x; c]` is the new vector.
fn incremental_estimate(
    extreme: Extreme,
    x: &[f64],
    sest: f64,
    w: &[f64],
    gamma: f64,
) -> Estimate {
    let eps = f64::EPSILON;
    let alpha: f64 = x.iter().zip(w).map(|(a, b)| a * b).sum();
    let absalp = alpha.abs();
    let absgam = gamma.abs();
    let absest = sest.abs();

    match extreme {
        Extreme::Largest => {
            if sest == 0.0 {
                let s1 = absgam.max(absalp);
                if s1 == 0.0 {
                    return Estimate::new(0.0, 0.0, 1.0);
                }
                let (s, c) = (alpha / s1, gamma / s1);
                let tmp = s.hypot(c);
                return Estimate::new(s1 * tmp, s / tmp, c / tmp);
            }
            if absgam <= eps * absest {
                let tmp = absest.max(absalp);
                let (s1, s2) = (absest / tmp, absalp / tmp);
                return Estimate::new(tmp * s1.hypot(s2), 1.0, 0.0);
            }
            if absalp <= eps * absest {
                return if absgam <= absest {
                    Estimate::new(absest, 1.0, 0.0)
                } else {
                    Estimate::new(absgam, 0.0, 1.0)
                };
            }
            if absest <= eps * absalp || absest <= eps * absgam {
                return if absgam <= absalp {
                    let tmp = absgam / absalp;
                    let s = (1.0 + tmp * tmp).sqrt();
                    Estimate::new(absalp * s, 1.0f64.copysign(alpha) / s, (gamma / absalp) / s)
                } else {
                    let tmp = absalp / absgam;
                    let c = (1.0 + tmp * tmp).sqrt();
                    Estimate::new(absgam * c, (alpha / absgam) / c, 1.0f64.copysign(gamma) / c)
                };
            }
            let zeta1 = alpha / absest;
            let zeta2 = gamma / absest;
            let b = (1.0 - zeta1 * zeta1 - zeta2 * zeta2) * 0.5;
            let c = zeta1 * zeta1;
            let t = if b > 0.0 {
                c / (b + (b * b + c).sqrt())
            } else {
                (b * b + c).sqrt() - b
            };
            let sine = -zeta1 / t;
            let cosine = -zeta2 / (1.0 + t);
            let tmp = sine.hypot(cosine);
            Estimate::new((t + 1.0).sqrt() * absest, sine / tmp, cosine / tmp)
        }
        Extreme::Smallest => {
            if sest == 0.0 {
                let (sine, cosine) = if absgam.max(absalp) == 0.0 {
                    (1.0, 0.0)
                } else {
                    (-gamma, alpha)
                };
                let s1 = sine.abs().max(cosine.abs());
                let (s, c) = (sine / s1, cosine / s1);
                let tmp = s.hypot(c);
                return Estimate::new(0.0, s / tmp, c / tmp);
            }
            if absgam <= eps * absest {
                return Estimate::new(absgam, 0.0, 1.0);
            }
            if absalp <= eps * absest {
                return if absgam <= absest {
                    Estimate::new(absgam, 0.0, 1.0)
                } else {
                    Estimate::new(absest, 1.0, 0.0)
                };
            }
            if absest <= eps * absalp || absest <= eps * absgam {
                return if absgam <= absalp {
                    let tmp = absgam / absalp;
                    let c = (1.0 + tmp * tmp).sqrt();
                    let sest = absest * (tmp / c);
                    Estimate::new(sest, -(gamma / absalp) / c, 1.0f64.copysign(alpha) / c)
                } else {
                    let tmp = absalp / absgam;
                    let s = (1.0 + tmp * tmp).sqrt();
                    Estimate::new(absest / s, -1.0f64.copysign(gamma) / s, (alpha / absgam) / s)
                };
            }
            let zeta1 = alpha / absest;
            let zeta2 = gamma / absest;
            let norma = (1.0 + zeta1 * zeta1 + (zeta1 * zeta2).abs())
                .max((zeta1 * zeta2).abs() + zeta2 * zeta2);
            let test = 1.0 + 2.0 * (zeta1 - zeta2) * (zeta1 + zeta2);
            let (sine, cosine, sest) = if test >= 0.0 {
                let b = (zeta1 * zeta1 + zeta2 * zeta2 + 1.0) * 0.5;
                let c = zeta2 * zeta2;
                let t = c / (b + (b * b - c).abs().sqrt());
                let sest = (t + 4.0 * eps * eps * norma).sqrt() * absest;
                (zeta1 / (1.0 - t), -zeta2 / t, sest)
            } else {
                let b = (zeta2 * zeta2 + zeta1 * zeta1 - 1.0) * 0.5;
                let c = zeta1 * zeta1;
                let t = if b >= 0.0 {
                    -c / (b + (b * b + c).sqrt())
                } else {
                    b - (b * b + c).sqrt()
                };
                let sest = (1.0 + t + 4.0 * eps * eps * norma).sqrt() * absest;
                (-zeta1 / t, -zeta2 / (1.0 + t), sest)
            };
            let tmp = sine.hypot(cosine);
            Estimate::new(sest, sine / tmp, cosine / tmp)
        }
    }
}

/// Numerical rank of a pivoted QR factorization.
///
/// `r` holds `R` (leading dimension `ldr`) from [`pivoted_qr`]. The leading
/// block `R11` is extended while the estimated condition number
/// `smax / smin` stays at or below `1 / rcond`. A zero `R[0,0]` gives rank 0.
pub fn estimate_rank(r: &[f64], ldr: usize, k: usize, rcond: f64) -> usize {
    if k == 0 || r[0] == 0.0 {
        return 0;
    }
    let mut smax = r[0].abs();
    let mut smin = smax;
    let mut xmin = vec![1.0];
    let mut xmax = vec![1.0];

    let mut rank = 1;
    while rank < k {
        let w = &r[rank * ldr..rank * ldr + rank];
        let gamma = r[rank + rank * ldr];
        let lo = incremental_estimate(Extreme::Smallest, &xmin, smin, w, gamma);
        let hi = incremental_estimate(Extreme::Largest, &xmax, smax, w, gamma);
        if hi.sest * rcond > lo.sest {
            break;
        }
        xmin.iter_mut().for_each(|x| *x *= lo.s);
        xmin.push(lo.c);
        xmax.iter_mut().for_each(|x| *x *= hi.s);
        xmax.push(hi.c);
        smin = lo.sest;
        smax = hi.sest;
        rank += 1;
    }
    log::trace!("estimate_rank: rank={rank} smax={smax:e} smin={smin:e}");
    rank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_of_r_is_non_increasing() {
        let (m, n) = (6, 4);
        let mut a: Vec<f64> = (0..m * n).map(|x| ((x * 13 + 5) % 17) as f64 - 8.0).collect();
        // make column 2 dominant
        for i in 0..m {
            a[i + 2 * m] *= 10.0;
        }
        let qr = pivoted_qr(&mut a, m, m, n);
        assert_eq!(qr.perm[0], 2);
        for j in 0..n - 1 {
            assert!(a[j + j * m].abs() + 1e-12 >= a[(j + 1) + (j + 1) * m].abs());
        }
    }

    /// Upper-triangular Kahan matrix `diag(s^i) (I - c U)` with a small
    /// diagonal perturbation so that column pivoting keeps the natural order
    fn kahan(n: usize, theta: f64) -> Vec<f64> {
        let (s, c) = theta.sin_cos();
        let mut a = vec![0.0; n * n];
        for j in 0..n {
            for i in 0..=j {
                let scale = s.powi(i as i32);
                a[i + j * n] = if i == j {
                    scale + 25.0 * f64::EPSILON * (n - i) as f64
                } else {
                    -c * scale
                };
            }
        }
        a
    }

    #[test]
    fn test_rank_of_well_conditioned_and_singular_r() {
        // R = [[2, 1], [0, 1]] is well conditioned
        assert_eq!(estimate_rank(&[2.0, 0.0, 1.0, 1.0], 2, 2, 1e-10), 2);
        // second column is a multiple of the first
        assert_eq!(estimate_rank(&[2.0, 0.0, 4.0, 0.0], 2, 2, 1e-10), 1);
        assert_eq!(estimate_rank(&[0.0, 0.0, 0.0, 0.0], 2, 2, 1e-10), 0);
        assert_eq!(estimate_rank(&[], 0, 0, 1e-10), 0);
    }

    #[test]
    fn test_kahan_diagonal_hides_ill_conditioning() {
        let n = 90;
        let mut a = kahan(n, 1.2);
        pivoted_qr(&mut a, n, n, n);

        // every |R_ii| is far above the cutoff
        let diag_min = (0..n).map(|i| a[i + i * n].abs()).fold(f64::INFINITY, f64::min);
        assert!(diag_min > 1e-4 * a[0].abs());

        // yet the leading block becomes numerically singular well before n
        let rank = estimate_rank(&a, n, n, 1e-12);
        assert!((60..n).contains(&rank), "rank {rank}");
    }

    #[test]
    fn test_qr_reproduces_permuted_matrix() {
        let (m, n) = (5, 3);
        let original: Vec<f64> = (0..m * n).map(|x| (x as f64 * 0.9).cos()).collect();
        let mut a = original.clone();
        let qr = pivoted_qr(&mut a, m, m, n);

        // Qᵀ (A P) must equal R
        let mut ap = vec![0.0; m * n];
        for (j, &src) in qr.perm.iter().enumerate() {
            ap[j * m..(j + 1) * m].copy_from_slice(&original[src * m..(src + 1) * m]);
        }
        apply_qt(&a, m, m, &qr.tau, &mut ap, m, n);
        for j in 0..n {
            for i in 0..m {
                let r = if i <= j { a[i + j * m] } else { 0.0 };
                assert!((ap[i + j * m] - r).abs() < 1e-12, "({i},{j})");
            }
        }
    }
}
