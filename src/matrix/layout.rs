//! Layout: logical shape, leading dimension and transpose flag

use std::fmt;

use crate::error::{Error, Result};

/// Layout of a column-major matrix inside a flat buffer
///
/// `rows` and `cols` are the LOGICAL shape, i.e. the shape after the
/// transpose flag has been applied. The stored matrix is
/// `stored_rows() x stored_cols()` with element `(i, j)` of the stored matrix
/// at offset `i + j * ld`.
///
/// # Example
/// ```
/// use densela::matrix::Layout;
/// let layout = Layout::new(2, 3, 4, true).unwrap();
/// assert_eq!(layout.stored_rows(), 3);
/// assert_eq!(layout.required_len(), 4 * 1 + 3);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    rows: usize,
    cols: usize,
    ld: usize,
    transposed: bool,
}

impl Layout {
    /// Create a layout, validating the leading dimension
    ///
    /// Fails with `InvalidShape` unless `ld >= max(1, stored_rows)`.
    pub fn new(rows: usize, cols: usize, ld: usize, transposed: bool) -> Result<Self> {
        let stored_rows = if transposed { cols } else { rows };
        if ld < stored_rows.max(1) {
            return Err(Error::invalid_shape(format!(
                "leading dimension {ld} is smaller than max(1, {stored_rows})"
            )));
        }
        Ok(Self {
            rows,
            cols,
            ld,
            transposed,
        })
    }

    /// Create a layout from signed dimensions as they arrive over a flat call
    /// surface; negative values fail with `InvalidShape`.
    pub fn from_signed(rows: i64, cols: i64, ld: i64, transposed: bool) -> Result<Self> {
        let to_usize = |value: i64, what: &str| {
            usize::try_from(value)
                .map_err(|_| Error::invalid_shape(format!("{what} must be non-negative, got {value}")))
        };
        Self::new(
            to_usize(rows, "rows")?,
            to_usize(cols, "cols")?,
            to_usize(ld, "leading dimension")?,
            transposed,
        )
    }

    /// Dense, non-transposed layout (`ld = max(1, rows)`)
    pub fn col_major(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ld: rows.max(1),
            transposed: false,
        }
    }

    /// Logical row count
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Logical column count
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Leading dimension of the stored matrix
    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Whether the logical matrix is the transpose of the stored one
    #[inline]
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Rows of the matrix as stored
    #[inline]
    pub fn stored_rows(&self) -> usize {
        if self.transposed { self.cols } else { self.rows }
    }

    /// Columns of the matrix as stored
    #[inline]
    pub fn stored_cols(&self) -> usize {
        if self.transposed { self.rows } else { self.cols }
    }

    /// Whether the matrix has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Minimum buffer length able to hold the stored matrix
    pub fn required_len(&self) -> usize {
        match (self.stored_rows(), self.stored_cols()) {
            (0, _) | (_, 0) => 0,
            (r, c) => self.ld * (c - 1) + r,
        }
    }

    /// Buffer offset of logical element `(i, j)`
    #[inline]
    pub fn offset(&self, i: usize, j: usize) -> usize {
        if self.transposed {
            j + i * self.ld
        } else {
            i + j * self.ld
        }
    }

    /// Layout of the logical transpose (flips the flag, keeps the buffer)
    pub fn t(&self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            ld: self.ld,
            transposed: !self.transposed,
        }
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout({}x{}, ld={}{})",
            self.rows,
            self.cols,
            self.ld,
            if self.transposed { ", T" } else { "" }
        )
    }
}
