//! Validation helpers shared by the engine and the native kernels

use crate::error::{Error, Result};

/// Validate a matrix is square, returning its order
pub fn validate_square(op: &'static str, rows: usize, cols: usize) -> Result<usize> {
    if rows != cols {
        return Err(Error::dimension_mismatch(
            op,
            format!("{rows}x{rows}"),
            format!("{rows}x{cols}"),
        ));
    }
    Ok(rows)
}

/// Validate an output slice holds at least `needed` elements
pub fn validate_len(op: &'static str, what: &str, len: usize, needed: usize) -> Result<()> {
    if len < needed {
        return Err(Error::dimension_mismatch(
            op,
            format!("{what} of length >= {needed}"),
            format!("length {len}"),
        ));
    }
    Ok(())
}

/// Minimum length of a column-major `rows x cols` buffer with leading
/// dimension `ld` (zero for an empty matrix)
#[inline]
pub fn col_major_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        ld * (cols - 1) + rows
    }
}
