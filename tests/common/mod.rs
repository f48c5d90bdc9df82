//! Common test utilities
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Route `log` output through the test harness (idempotent)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Check that a column-major `n x n` matrix is close to identity
pub fn assert_near_identity(data: &[f64], n: usize, tol: f64, msg: &str) {
    for j in 0..n {
        for i in 0..n {
            let expected = if i == j { 1.0 } else { 0.0 };
            let actual = data[i + j * n];
            let diff = (actual - expected).abs();
            assert!(
                diff <= tol,
                "{}: element [{},{}] differs: {} vs {} (diff={})",
                msg,
                i,
                j,
                actual,
                expected,
                diff
            );
        }
    }
}

/// Uniform `[-1, 1)` column-major `rows x cols` matrix from a fixed seed
pub fn random_matrix(rows: usize, cols: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..rows * cols)
        .map(|_| rng.random_range(-1.0..1.0))
        .collect()
}

/// Random symmetric `n x n` matrix (both triangles filled)
pub fn random_symmetric(n: usize, seed: u64) -> Vec<f64> {
    let mut a = random_matrix(n, n, seed);
    for j in 0..n {
        for i in j + 1..n {
            a[j + i * n] = a[i + j * n];
        }
    }
    a
}

/// Naive column-major product of `a (m x k)` and `b (k x n)`
pub fn naive_matmul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * n];
    for j in 0..n {
        for i in 0..m {
            c[i + j * m] = (0..k).map(|l| a[i + l * m] * b[l + j * k]).sum();
        }
    }
    c
}

/// Column-major transpose of an `m x n` matrix
pub fn transpose(a: &[f64], m: usize, n: usize) -> Vec<f64> {
    let mut t = vec![0.0; m * n];
    for j in 0..n {
        for i in 0..m {
            t[j + i * n] = a[i + j * m];
        }
    }
    t
}

/// `Xᵀ X` for a column-major `rows x cols` matrix
pub fn gram(x: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    naive_matmul(&transpose(x, rows, cols), x, cols, rows, cols)
}

// ============================================================================
// Structured inputs
// ============================================================================

/// Column-major `rows x cols` matrix of ones
pub fn ones(rows: usize, cols: usize) -> Vec<f64> {
    vec![1.0; rows * cols]
}

/// Random `rows x cols` matrix of exact rank `rank` as `X Y`
pub fn low_rank_matrix(rows: usize, cols: usize, rank: usize, seed: u64) -> Vec<f64> {
    let x = random_matrix(rows, rank, seed);
    let y = random_matrix(rank, cols, seed + 1);
    naive_matmul(&x, &y, rows, rank, cols)
}

/// Random `rows x cols` matrix (`rows >= cols`) with orthonormal columns,
/// from modified Gram-Schmidt applied twice
pub fn random_orthonormal(rows: usize, cols: usize, seed: u64) -> Vec<f64> {
    let mut q = random_matrix(rows, cols, seed);
    for j in 0..cols {
        for _ in 0..2 {
            for p in 0..j {
                let dot: f64 = (0..rows).map(|i| q[i + p * rows] * q[i + j * rows]).sum();
                for i in 0..rows {
                    q[i + j * rows] -= dot * q[i + p * rows];
                }
            }
        }
        let norm = q[j * rows..(j + 1) * rows].iter().map(|x| x * x).sum::<f64>().sqrt();
        q[j * rows..(j + 1) * rows].iter_mut().for_each(|x| *x /= norm);
    }
    q
}

/// `U diag(sigma) Vᵀ` with random orthonormal `U (rows x k)` and `V (cols x k)`,
/// where `k = sigma.len() <= min(rows, cols)`
pub fn matrix_with_singular_values(rows: usize, cols: usize, sigma: &[f64], seed: u64) -> Vec<f64> {
    let k = sigma.len();
    let mut u = random_orthonormal(rows, k, seed);
    let v = random_orthonormal(cols, k, seed + 1);
    for (j, &s) in sigma.iter().enumerate() {
        u[j * rows..(j + 1) * rows].iter_mut().for_each(|x| *x *= s);
    }
    naive_matmul(&u, &transpose(&v, cols, k), rows, k, cols)
}

/// `Q diag(lambda) Qᵀ` with a random orthogonal `Q`, symmetrized exactly
pub fn symmetric_with_eigenvalues(lambda: &[f64], seed: u64) -> Vec<f64> {
    let n = lambda.len();
    let q = random_orthonormal(n, n, seed);
    let mut ql = q.clone();
    for (j, &l) in lambda.iter().enumerate() {
        ql[j * n..(j + 1) * n].iter_mut().for_each(|x| *x *= l);
    }
    let mut a = naive_matmul(&ql, &transpose(&q, n, n), n, n, n);
    for j in 0..n {
        for i in j + 1..n {
            let avg = 0.5 * (a[i + j * n] + a[j + i * n]);
            a[i + j * n] = avg;
            a[j + i * n] = avg;
        }
    }
    a
}

/// Upper-triangular Kahan matrix `diag(s^i) (I - c U)` with `s = sin(theta)`,
/// `c = cos(theta)` and `U` strictly upper triangular ones. `perturbation`
/// adds `perturbation * eps * (n - i)` to the diagonal.
pub fn kahan_matrix(n: usize, theta: f64, perturbation: f64) -> Vec<f64> {
    let (s, c) = theta.sin_cos();
    let mut a = vec![0.0; n * n];
    for j in 0..n {
        for i in 0..=j {
            let scale = s.powi(i as i32);
            a[i + j * n] = if i == j {
                scale + perturbation * f64::EPSILON * (n - i) as f64
            } else {
                -c * scale
            };
        }
    }
    a
}

/// Descending `0.5^i` for `i in 0..k`
pub fn graded_spectrum(k: usize) -> Vec<f64> {
    (0..k).map(|i| 0.5f64.powi(i as i32)).collect()
}

/// Named structured matrices that exercise deflation and splitting paths
pub fn structured_matrices() -> Vec<(String, usize, usize, Vec<f64>)> {
    let repeated: Vec<f64> = [3.0; 20].into_iter().chain([1.0; 20]).collect();
    vec![
        ("ones 45x45".into(), 45, 45, ones(45, 45)),
        ("ones 35x45".into(), 35, 45, ones(35, 45)),
        ("rank 3 50x40".into(), 50, 40, low_rank_matrix(50, 40, 3, 21)),
        ("rank 10 40x48".into(), 40, 48, low_rank_matrix(40, 48, 10, 23)),
        (
            "repeated 40x40".into(),
            40,
            40,
            matrix_with_singular_values(40, 40, &repeated, 25),
        ),
        (
            "graded 48x40".into(),
            48,
            40,
            matrix_with_singular_values(48, 40, &graded_spectrum(40), 27),
        ),
        ("zero 40x30".into(), 40, 30, vec![0.0; 40 * 30]),
    ]
}
