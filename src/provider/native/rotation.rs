//! Plane rotations and column bookkeeping shared by the SVD and eigen kernels
//!
//! All matrices are column-major with an explicit leading dimension.

/// Plane rotation parameters (cosine and sine).
///
/// ```text
/// G = [ c  s ]
///     [-s  c ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Givens {
    /// Cosine of rotation angle
    pub c: f64,
    /// Sine of rotation angle
    pub s: f64,
}

impl Givens {
    /// The identity rotation
    pub const IDENTITY: Self = Self { c: 1.0, s: 0.0 };

    /// Rotation mapping `(f, g)` to `(r, 0)`; returns the rotation and `r`.
    ///
    /// `f = g = 0` yields the identity with `r = 0`.
    #[inline]
    pub fn zeroing(f: f64, g: f64) -> (Self, f64) {
        let r = f.hypot(g);
        if r == 0.0 {
            return (Self::IDENTITY, 0.0);
        }
        (Self { c: f / r, s: g / r }, r)
    }

    /// Rotate two columns in place:
    /// `col_p' = c * col_p + s * col_q`, `col_q' = -s * col_p + c * col_q`.
    #[inline]
    pub fn apply_to_columns(&self, data: &mut [f64], ld: usize, rows: usize, p: usize, q: usize) {
        if *self == Self::IDENTITY || p == q {
            return;
        }
        let (c, s) = (self.c, self.s);
        for i in 0..rows {
            let xp = data[p * ld + i];
            let xq = data[q * ld + i];
            data[p * ld + i] = c * xp + s * xq;
            data[q * ld + i] = -s * xp + c * xq;
        }
    }
}

/// Swap two columns of a column-major matrix
pub fn swap_columns(data: &mut [f64], ld: usize, rows: usize, p: usize, q: usize) {
    if p == q {
        return;
    }
    for i in 0..rows {
        data.swap(p * ld + i, q * ld + i);
    }
}

/// Negate one column of a column-major matrix
pub fn negate_column(data: &mut [f64], ld: usize, rows: usize, j: usize) {
    for x in &mut data[j * ld..j * ld + rows] {
        *x = -*x;
    }
}

/// Dense `rows x cols` identity (ones on the leading diagonal)
pub fn identity_matrix(rows: usize, cols: usize) -> Vec<f64> {
    let mut m = vec![0.0; rows * cols];
    for i in 0..rows.min(cols) {
        m[i + i * rows] = 1.0;
    }
    m
}

/// Sort `values` ascending, permuting the matching columns of `vectors`
/// (if any) alongside. Selection sort, so at most `n - 1` swaps.
pub fn sort_ascending(values: &mut [f64], mut vectors: Option<(&mut [f64], usize, usize)>) {
    let n = values.len();
    for i in 0..n {
        let mut best = i;
        for j in i + 1..n {
            if values[j] < values[best] {
                best = j;
            }
        }
        if best != i {
            values.swap(i, best);
            if let Some((data, ld, rows)) = vectors.as_mut() {
                swap_columns(data, *ld, *rows, i, best);
            }
        }
    }
}

/// Normalize each column to unit length (zero columns are left alone)
pub fn normalize_columns(data: &mut [f64], ld: usize, rows: usize, cols: usize) {
    for j in 0..cols {
        let col = &mut data[j * ld..j * ld + rows];
        let norm = super::householder::norm2(col);
        if norm > 0.0 {
            for x in col.iter_mut() {
                *x /= norm;
            }
        }
    }
}
