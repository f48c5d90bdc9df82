//! Integration tests for the symmetric eigendecomposition
//!
//! Tests verify:
//! - Eigenvalues come back ascending
//! - A V = V Λ and Vᵀ V = I
//! - Only the selected triangle is read
//! - Values-only mode matches the full decomposition
//! - Constant, low-rank, clustered and graded spectra converge
//! - Illegal order and convergence failures are reported

mod common;

use common::{
    assert_allclose_f64, assert_near_identity, graded_spectrum, gram, init_logging, naive_matmul,
    ones, random_matrix, random_symmetric, symmetric_with_eigenvalues, transpose,
};
use densela::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn eig(job: EigenJob, triangle: Triangle, a: &[f64], n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut v = a.to_vec();
    let mut w = vec![0.0; n];
    let mut av = MatrixViewMut::col_major(&mut v, n, n).unwrap();
    Engine::new()
        .eigen_symmetric(job, triangle, &mut av, &mut w)
        .unwrap();
    (w, v)
}

fn assert_eigenpairs(a: &[f64], w: &[f64], v: &[f64], n: usize, msg: &str) {
    let av = naive_matmul(a, v, n, n, n);
    let mut vl = v.to_vec();
    for (j, &lambda) in w.iter().enumerate() {
        vl[j * n..(j + 1) * n].iter_mut().for_each(|x| *x *= lambda);
    }
    assert_allclose_f64(&av, &vl, 1e-9, 1e-10, &format!("{msg}: A V = V Λ"));
    assert_near_identity(&gram(v, n, n), n, 1e-10, &format!("{msg}: Vᵀ V"));
}

// ============================================================================
// Correctness
// ============================================================================

#[test]
fn test_diagonal_matrix() {
    init_logging();
    let a = [3.0, 0.0, 0.0, 2.0];
    let (w, v) = eig(EigenJob::ValuesAndVectors, Triangle::Lower, &a, 2);
    assert_allclose_f64(&w, &[2.0, 3.0], 0.0, 1e-15, "eigenvalues");
    // e2 then e1, up to sign
    assert!((v[1].abs() - 1.0).abs() < 1e-15 && v[0].abs() < 1e-15);
    assert!((v[2].abs() - 1.0).abs() < 1e-15 && v[3].abs() < 1e-15);
}

#[test]
fn test_known_2x2() {
    // [[2, 1], [1, 2]] has eigenvalues 1 and 3
    let a = [2.0, 1.0, 1.0, 2.0];
    let (w, v) = eig(EigenJob::ValuesAndVectors, Triangle::Lower, &a, 2);
    assert_allclose_f64(&w, &[1.0, 3.0], 1e-14, 1e-14, "eigenvalues");
    assert_eigenpairs(&a, &w, &v, 2, "2x2");
}

#[test]
fn test_random_symmetric_decomposition() {
    for (seed, n) in [(1, 3), (2, 8), (3, 25)] {
        let a = random_symmetric(n, seed);
        let (w, v) = eig(EigenJob::ValuesAndVectors, Triangle::Lower, &a, n);
        assert!(w.windows(2).all(|p| p[0] <= p[1]), "n={n}: not ascending");
        assert_eigenpairs(&a, &w, &v, n, &format!("n={n}"));

        // trace is preserved
        let trace: f64 = (0..n).map(|i| a[i + i * n]).sum();
        let sum: f64 = w.iter().sum();
        assert!((trace - sum).abs() < 1e-10, "n={n}: trace");
    }
}

#[test]
fn test_repeated_eigenvalues() {
    let n = 4;
    let mut a = vec![0.0; n * n];
    for i in 0..n {
        a[i + i * n] = 5.0;
    }
    let (w, v) = eig(EigenJob::ValuesAndVectors, Triangle::Upper, &a, n);
    assert_allclose_f64(&w, &[5.0; 4], 0.0, 1e-14, "multiplicity 4");
    assert_near_identity(&gram(&v, n, n), n, 1e-12, "orthonormal basis");
}

#[test]
fn test_one_by_one() {
    let (w, v) = eig(EigenJob::ValuesAndVectors, Triangle::Lower, &[-4.5], 1);
    assert_eq!(w, [-4.5]);
    assert_eq!(v[0].abs(), 1.0);
}

#[test]
fn test_constant_matrix() {
    // J = ones(n, n) has eigenvalues 0 (n - 1 times) and n
    for n in [45, 60] {
        let a = ones(n, n);
        let (w, v) = eig(EigenJob::ValuesAndVectors, Triangle::Lower, &a, n);
        let mut expected = vec![0.0; n];
        expected[n - 1] = n as f64;
        assert_allclose_f64(&w, &expected, 0.0, 1e-12 * n as f64, &format!("n={n}"));
        assert_eigenpairs(&a, &w, &v, n, &format!("ones n={n}"));
    }
}

#[test]
fn test_structured_spectra() {
    init_logging();
    let n = 48;
    // X Xᵀ with X of rank 3
    let x = random_matrix(n, 3, 41);
    let low_rank = naive_matmul(&x, &transpose(&x, n, 3), n, 3, n);
    let clustered: Vec<f64> = (0..n).map(|i| if i < n / 2 { -1.0 } else { 2.0 }).collect();
    let graded = graded_spectrum(n);

    let cases = [
        ("rank 3", low_rank, None),
        ("clustered", symmetric_with_eigenvalues(&clustered, 43), Some(clustered.clone())),
        ("graded", symmetric_with_eigenvalues(&graded, 45), Some(graded.clone())),
    ];
    for (name, a, spectrum) in cases {
        let (w, v) = eig(EigenJob::ValuesAndVectors, Triangle::Lower, &a, n);
        assert_eigenpairs(&a, &w, &v, n, name);
        if let Some(mut expected) = spectrum {
            expected.sort_by(|p, q| p.total_cmp(q));
            assert_allclose_f64(&w, &expected, 0.0, 1e-12, name);
        } else {
            assert!(w[..n - 3].iter().all(|x| x.abs() < 1e-12), "{name}: null space {w:?}");
        }
    }
}

// ============================================================================
// Triangle and job selection
// ============================================================================

#[test]
fn test_only_selected_triangle_is_read() {
    let n = 5;
    let a = random_symmetric(n, 4);
    let (expected, _) = eig(EigenJob::ValuesOnly, Triangle::Lower, &a, n);

    let mut upper_only = a.clone();
    let mut lower_only = a.clone();
    for j in 0..n {
        for i in 0..n {
            if i > j {
                upper_only[i + j * n] = f64::NAN;
            }
            if i < j {
                lower_only[i + j * n] = f64::NAN;
            }
        }
    }
    let (wu, _) = eig(EigenJob::ValuesOnly, Triangle::Upper, &upper_only, n);
    let (wl, _) = eig(EigenJob::ValuesOnly, Triangle::Lower, &lower_only, n);
    assert_allclose_f64(&wu, &expected, 1e-12, 1e-13, "upper");
    assert_allclose_f64(&wl, &expected, 1e-12, 1e-13, "lower");
}

#[test]
fn test_values_only_matches_full() {
    let n = 7;
    let a = random_symmetric(n, 5);
    let (w_full, _) = eig(EigenJob::ValuesAndVectors, Triangle::Lower, &a, n);
    let (w_vals, _) = eig(EigenJob::ValuesOnly, Triangle::Lower, &a, n);
    assert_allclose_f64(&w_vals, &w_full, 1e-12, 1e-13, "values only");
}

#[test]
fn test_padded_leading_dimension() {
    let a_dense = random_symmetric(3, 6);
    let mut a = vec![99.0; 12];
    for j in 0..3 {
        a[j * 4..j * 4 + 3].copy_from_slice(&a_dense[j * 3..(j + 1) * 3]);
    }
    let mut w = [0.0; 3];
    let mut av = MatrixViewMut::new(&mut a, 3, 3, 4).unwrap();
    Engine::new()
        .eigen_symmetric(EigenJob::ValuesAndVectors, Triangle::Lower, &mut av, &mut w)
        .unwrap();
    assert_eq!([a[3], a[7], a[11]], [99.0; 3]);

    let (expected, _) = eig(EigenJob::ValuesOnly, Triangle::Lower, &a_dense, 3);
    assert_allclose_f64(&w, &expected, 1e-12, 1e-13, "padded");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_matrix_is_illegal() {
    let mut a: [f64; 0] = [];
    let mut w: [f64; 0] = [];
    let mut av = MatrixViewMut::col_major(&mut a, 0, 0).unwrap();
    let err = Engine::new()
        .eigen_symmetric(EigenJob::ValuesOnly, Triangle::Lower, &mut av, &mut w)
        .unwrap_err();
    assert_eq!(
        err,
        Error::IllegalArgument {
            op: "dsyev",
            position: 3
        }
    );
}

#[test]
fn test_non_square_is_rejected() {
    let mut a = [1.0; 6];
    let mut w = [0.0; 3];
    let mut av = MatrixViewMut::col_major(&mut a, 2, 3).unwrap();
    let err = Engine::new()
        .eigen_symmetric(EigenJob::ValuesOnly, Triangle::Lower, &mut av, &mut w)
        .unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { op: "dsyev", .. }));
}

#[test]
fn test_iteration_limit_reports_non_convergence() {
    let engine = Engine::with_config(KernelConfig::default().with_max_ql_iterations(0));
    let n = 4;
    let mut a = random_symmetric(n, 7);
    let mut w = vec![0.0; n];
    let mut av = MatrixViewMut::col_major(&mut a, n, n).unwrap();
    let err = engine
        .eigen_symmetric(EigenJob::ValuesOnly, Triangle::Lower, &mut av, &mut w)
        .unwrap_err();
    assert!(matches!(err, Error::ConvergenceFailure { op: "dsyev", .. }));
}
