//! Householder reflector primitives
//!
//! A reflector is `H = I - tau * v * vᵀ` with `v[0] = 1`. Only the tail of
//! `v` is stored; callers rebuild the full vector with [`reflector_vector`]
//! before applying it.

/// Euclidean norm with scaling so intermediate squares cannot overflow.
pub fn norm2(x: &[f64]) -> f64 {
    let mut scale = 0.0f64;
    let mut ssq = 1.0f64;
    for &v in x {
        if v != 0.0 {
            let a = v.abs();
            if scale < a {
                let r = scale / a;
                ssq = 1.0 + ssq * r * r;
                scale = a;
            } else {
                let r = a / scale;
                ssq += r * r;
            }
        }
    }
    scale * ssq.sqrt()
}

/// Generate a reflector annihilating `x` below `alpha`.
///
/// On return `alpha` holds `beta` (so that `H [alpha; x] = [beta; 0]`) and
/// `x` holds the tail of `v`. Returns `tau`; `tau == 0` means `H = I`.
pub fn make_reflector(alpha: &mut f64, x: &mut [f64]) -> f64 {
    let xnorm = norm2(x);
    if xnorm == 0.0 {
        return 0.0;
    }
    let beta = -alpha.hypot(xnorm).copysign(*alpha);
    let tau = (beta - *alpha) / beta;
    let scale = 1.0 / (*alpha - beta);
    for v in x.iter_mut() {
        *v *= scale;
    }
    *alpha = beta;
    tau
}

/// Full reflector vector `[1, tail...]`
pub fn reflector_vector(tail: impl IntoIterator<Item = f64>) -> Vec<f64> {
    std::iter::once(1.0).chain(tail).collect()
}

/// Apply `H` from the left to rows `row0..row0 + v.len()` of the columns
/// `cols` of a column-major matrix.
pub fn apply_left(
    a: &mut [f64],
    lda: usize,
    v: &[f64],
    tau: f64,
    row0: usize,
    cols: std::ops::Range<usize>,
) {
    if tau == 0.0 {
        return;
    }
    for j in cols {
        let start = j * lda + row0;
        let col = &mut a[start..start + v.len()];
        let w: f64 = col.iter().zip(v).map(|(x, y)| x * y).sum();
        if w != 0.0 {
            let f = tau * w;
            for (x, &y) in col.iter_mut().zip(v) {
                *x -= f * y;
            }
        }
    }
}

/// Apply `H` from the right to columns `col0..col0 + v.len()` of the rows
/// `rows` of a column-major matrix.
pub fn apply_right(
    a: &mut [f64],
    lda: usize,
    v: &[f64],
    tau: f64,
    col0: usize,
    rows: std::ops::Range<usize>,
) {
    if tau == 0.0 {
        return;
    }
    let mut w = vec![0.0; rows.len()];
    for (c, &vc) in v.iter().enumerate() {
        let col = (col0 + c) * lda;
        for (wi, i) in w.iter_mut().zip(rows.clone()) {
            *wi += a[col + i] * vc;
        }
    }
    for (c, &vc) in v.iter().enumerate() {
        let col = (col0 + c) * lda;
        let f = tau * vc;
        for (wi, i) in w.iter().zip(rows.clone()) {
            a[col + i] -= f * wi;
        }
    }
}
