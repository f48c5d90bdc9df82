//! Borrowed matrix views over flat `f64` buffers

use crate::error::{Error, Result};

use super::Layout;

fn check_len(layout: &Layout, len: usize) -> Result<()> {
    let required = layout.required_len();
    if len < required {
        return Err(Error::invalid_shape(format!(
            "buffer holds {len} elements but {layout:?} needs {required}"
        )));
    }
    Ok(())
}

/// Read-only view of a column-major matrix
///
/// The transpose flag lets GEMM consume `Aᵀ` without materializing it.
#[derive(Clone, Copy, Debug)]
pub struct MatrixView<'a> {
    data: &'a [f64],
    layout: Layout,
}

impl<'a> MatrixView<'a> {
    /// Describe `data` with an explicit leading dimension and transpose flag
    pub fn new(
        data: &'a [f64],
        rows: usize,
        cols: usize,
        ld: usize,
        transposed: bool,
    ) -> Result<Self> {
        Self::from_layout(data, Layout::new(rows, cols, ld, transposed)?)
    }

    /// Describe a dense column-major `rows x cols` matrix
    pub fn col_major(data: &'a [f64], rows: usize, cols: usize) -> Result<Self> {
        Self::from_layout(data, Layout::col_major(rows, cols))
    }

    /// Pair a validated layout with a buffer
    pub fn from_layout(data: &'a [f64], layout: Layout) -> Result<Self> {
        check_len(&layout, data.len())?;
        Ok(Self { data, layout })
    }

    /// The logical transpose, sharing the same buffer
    pub fn t(&self) -> Self {
        Self {
            data: self.data,
            layout: self.layout.t(),
        }
    }

    /// Layout metadata
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Logical row count
    #[inline]
    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    /// Logical column count
    #[inline]
    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    /// Leading dimension of the stored matrix
    #[inline]
    pub fn ld(&self) -> usize {
        self.layout.ld()
    }

    /// Whether the view is transposed
    #[inline]
    pub fn is_transposed(&self) -> bool {
        self.layout.is_transposed()
    }

    /// The underlying buffer
    #[inline]
    pub fn data(&self) -> &'a [f64] {
        self.data
    }

    /// Logical element `(i, j)`, `None` when out of range
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.rows() && j < self.cols() {
            Some(self.data[self.layout.offset(i, j)])
        } else {
            None
        }
    }

    /// Copy the logical matrix into a dense column-major vector
    pub fn to_col_major_vec(&self) -> Vec<f64> {
        let (rows, cols) = (self.rows(), self.cols());
        let mut out = Vec::with_capacity(rows * cols);
        for j in 0..cols {
            for i in 0..rows {
                out.push(self.data[self.layout.offset(i, j)]);
            }
        }
        out
    }
}

/// Exclusive view of a column-major matrix used for outputs and in-place
/// operands. Outputs are never transposed.
#[derive(Debug)]
pub struct MatrixViewMut<'a> {
    data: &'a mut [f64],
    layout: Layout,
}

impl<'a> MatrixViewMut<'a> {
    /// Describe `data` with an explicit leading dimension
    pub fn new(data: &'a mut [f64], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        let layout = Layout::new(rows, cols, ld, false)?;
        check_len(&layout, data.len())?;
        Ok(Self { data, layout })
    }

    /// Describe a dense column-major `rows x cols` matrix
    pub fn col_major(data: &'a mut [f64], rows: usize, cols: usize) -> Result<Self> {
        let layout = Layout::col_major(rows, cols);
        check_len(&layout, data.len())?;
        Ok(Self { data, layout })
    }

    /// Layout metadata
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Row count
    #[inline]
    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    /// Column count
    #[inline]
    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    /// Leading dimension
    #[inline]
    pub fn ld(&self) -> usize {
        self.layout.ld()
    }

    /// Reborrow as a read-only view
    pub fn as_view(&self) -> MatrixView<'_> {
        MatrixView {
            data: &*self.data,
            layout: self.layout,
        }
    }

    /// The underlying buffer
    #[inline]
    pub fn data(&self) -> &[f64] {
        &*self.data
    }

    /// The underlying buffer, mutably
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut *self.data
    }

    /// Element `(i, j)`, `None` when out of range
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.as_view().get(i, j)
    }

    /// Overwrite element `(i, j)`; returns false when out of range
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> bool {
        if i < self.rows() && j < self.cols() {
            let idx = self.layout.offset(i, j);
            self.data[idx] = value;
            true
        } else {
            false
        }
    }
}
