//! Integration tests for matrix multiply-accumulate
//!
//! Tests verify:
//! - Agreement with a naive product for every transpose combination
//! - beta = 0 ignores prior contents of C (including NaN)
//! - alpha = 0 never reads A or B
//! - Sub-matrix views with a padded leading dimension
//! - Shape errors are raised before C is written

mod common;

use common::{assert_allclose_f64, init_logging, naive_matmul, random_matrix, transpose};
use densela::prelude::*;

// ============================================================================
// Correctness
// ============================================================================

#[test]
fn test_product_matches_naive() {
    init_logging();
    let engine = Engine::new();
    let (m, k, n) = (7, 5, 4);
    let a = random_matrix(m, k, 1);
    let b = random_matrix(k, n, 2);
    let mut c = vec![0.0; m * n];

    let av = MatrixView::col_major(&a, m, k).unwrap();
    let bv = MatrixView::col_major(&b, k, n).unwrap();
    let mut cv = MatrixViewMut::col_major(&mut c, m, n).unwrap();
    engine.multiply_accumulate(1.0, &av, &bv, 0.0, &mut cv).unwrap();

    assert_allclose_f64(&c, &naive_matmul(&a, &b, m, k, n), 1e-9, 1e-12, "A @ B");
}

#[test]
fn test_all_transpose_combinations() {
    let engine = Engine::new();
    let (m, k, n) = (4, 3, 5);
    let a = random_matrix(m, k, 3);
    let b = random_matrix(k, n, 4);
    let at = transpose(&a, m, k);
    let bt = transpose(&b, k, n);
    let expected = naive_matmul(&a, &b, m, k, n);

    for (ta, tb) in [(false, false), (true, false), (false, true), (true, true)] {
        let av = if ta {
            MatrixView::col_major(&at, k, m).unwrap().t()
        } else {
            MatrixView::col_major(&a, m, k).unwrap()
        };
        let bv = if tb {
            MatrixView::col_major(&bt, n, k).unwrap().t()
        } else {
            MatrixView::col_major(&b, k, n).unwrap()
        };
        let mut c = vec![0.0; m * n];
        let mut cv = MatrixViewMut::col_major(&mut c, m, n).unwrap();
        engine.multiply_accumulate(1.0, &av, &bv, 0.0, &mut cv).unwrap();
        assert_allclose_f64(&c, &expected, 1e-9, 1e-12, &format!("ta={ta} tb={tb}"));
    }
}

#[test]
fn test_alpha_beta_scaling() {
    let engine = Engine::new();
    let a = [1.0, 3.0, 2.0, 4.0]; // [[1, 2], [3, 4]]
    let b = [5.0, 7.0, 6.0, 8.0]; // [[5, 6], [7, 8]]
    let mut c = [1.0, 1.0, 1.0, 1.0];
    let av = MatrixView::col_major(&a, 2, 2).unwrap();
    let bv = MatrixView::col_major(&b, 2, 2).unwrap();
    let mut cv = MatrixViewMut::col_major(&mut c, 2, 2).unwrap();
    engine.multiply_accumulate(2.0, &av, &bv, 3.0, &mut cv).unwrap();
    // A @ B = [[19, 22], [43, 50]]
    assert_eq!(c, [41.0, 89.0, 47.0, 103.0]);
}

// ============================================================================
// beta = 0 / alpha = 0 rules
// ============================================================================

#[test]
fn test_beta_zero_ignores_nan_in_c() {
    let engine = Engine::new();
    let a = [1.0, 0.0, 0.0, 1.0];
    let b = [2.0, 3.0, 4.0, 5.0];
    let mut c = [f64::NAN; 4];
    let av = MatrixView::col_major(&a, 2, 2).unwrap();
    let bv = MatrixView::col_major(&b, 2, 2).unwrap();
    let mut cv = MatrixViewMut::col_major(&mut c, 2, 2).unwrap();
    engine.multiply_accumulate(1.0, &av, &bv, 0.0, &mut cv).unwrap();
    assert_eq!(c, b);
}

#[test]
fn test_alpha_zero_does_not_read_operands() {
    let engine = Engine::new();
    let a = [f64::NAN; 6];
    let b = [f64::INFINITY; 6];
    let mut c = [1.0, 2.0, 3.0, 4.0];
    let av = MatrixView::col_major(&a, 2, 3).unwrap();
    let bv = MatrixView::col_major(&b, 3, 2).unwrap();
    let mut cv = MatrixViewMut::col_major(&mut c, 2, 2).unwrap();
    engine.multiply_accumulate(0.0, &av, &bv, 0.5, &mut cv).unwrap();
    assert_eq!(c, [0.5, 1.0, 1.5, 2.0]);

    let mut cv = MatrixViewMut::col_major(&mut c, 2, 2).unwrap();
    engine.multiply_accumulate(0.0, &av, &bv, 0.0, &mut cv).unwrap();
    assert_eq!(c, [0.0; 4]);
}

// ============================================================================
// Strided views
// ============================================================================

#[test]
fn test_padded_leading_dimension() {
    let engine = Engine::new();
    // 2x2 blocks stored with ld = 3; the padding row must stay untouched
    let a = [1.0, 2.0, -9.0, 3.0, 4.0, -9.0];
    let b = [1.0, 0.0, -9.0, 0.0, 1.0, -9.0];
    let mut c = [0.0, 0.0, 42.0, 0.0, 0.0, 42.0];
    let av = MatrixView::new(&a, 2, 2, 3, false).unwrap();
    let bv = MatrixView::new(&b, 2, 2, 3, false).unwrap();
    let mut cv = MatrixViewMut::new(&mut c, 2, 2, 3).unwrap();
    engine.multiply_accumulate(1.0, &av, &bv, 0.0, &mut cv).unwrap();
    assert_eq!(c, [1.0, 2.0, 42.0, 3.0, 4.0, 42.0]);
}

#[test]
fn test_large_product_parallel_path() {
    let engine = Engine::with_config(KernelConfig::default().with_parallel_flop_threshold(1));
    let (m, k, n) = (33, 17, 29);
    let a = random_matrix(m, k, 5);
    let b = random_matrix(k, n, 6);
    let mut c = vec![0.0; m * n];
    let av = MatrixView::col_major(&a, m, k).unwrap();
    let bv = MatrixView::col_major(&b, k, n).unwrap();
    let mut cv = MatrixViewMut::col_major(&mut c, m, n).unwrap();
    engine.multiply_accumulate(1.0, &av, &bv, 0.0, &mut cv).unwrap();
    assert_allclose_f64(&c, &naive_matmul(&a, &b, m, k, n), 1e-9, 1e-12, "parallel");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_inner_dimension_mismatch() {
    let engine = Engine::new();
    let a = [1.0; 6];
    let b = [1.0; 4];
    let mut c = [7.0; 4];
    let av = MatrixView::col_major(&a, 2, 3).unwrap();
    let bv = MatrixView::col_major(&b, 2, 2).unwrap();
    let mut cv = MatrixViewMut::col_major(&mut c, 2, 2).unwrap();
    let err = engine
        .multiply_accumulate(1.0, &av, &bv, 1.0, &mut cv)
        .unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
    assert_eq!(c, [7.0; 4]);
}

#[test]
fn test_round_trip_through_solve() {
    // x from a least-squares solve of a full-rank system reproduces b
    let engine = Engine::new();
    let n = 4;
    let a = random_matrix(n, n, 7);
    let b = random_matrix(n, 1, 8);

    let mut a_work = a.clone();
    let mut x = b.clone();
    let mut av = MatrixViewMut::col_major(&mut a_work, n, n).unwrap();
    let mut xv = MatrixViewMut::col_major(&mut x, n, 1).unwrap();
    let sol = engine
        .solve_least_squares(LeastSquaresStrategy::default(), &mut av, &mut xv, -1.0)
        .unwrap();
    assert_eq!(sol.rank, n);

    let mut b2 = vec![0.0; n];
    let av = MatrixView::col_major(&a, n, n).unwrap();
    let xv = MatrixView::col_major(&x, n, 1).unwrap();
    let mut bv = MatrixViewMut::col_major(&mut b2, n, 1).unwrap();
    engine.multiply_accumulate(1.0, &av, &xv, 0.0, &mut bv).unwrap();
    assert_allclose_f64(&b2, &b, 1e-8, 1e-10, "A x = b");
}
