//! Tuning knobs for the native kernels

/// Iteration limits and thresholds used by [`NativeKernels`](crate::provider::NativeKernels).
///
/// The defaults follow the reference LAPACK choices. Lowering the iteration
/// limits is mostly useful for exercising convergence-failure paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Bidiagonal QR sweeps allowed, as a multiple of `n * n`
    pub max_qr_sweeps: usize,
    /// Implicit QL iterations allowed per eigenvalue
    pub max_ql_iterations: usize,
    /// Tridiagonal problems at or below this order are solved directly
    /// instead of being split further
    pub dc_leaf_size: usize,
    /// GEMM calls below this many multiply-adds stay on the calling thread
    pub parallel_flop_threshold: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_qr_sweeps: 6,
            max_ql_iterations: 30,
            dc_leaf_size: 25,
            parallel_flop_threshold: 1 << 16,
        }
    }
}

impl KernelConfig {
    /// Set the bidiagonal QR sweep factor
    pub fn with_max_qr_sweeps(mut self, factor: usize) -> Self {
        self.max_qr_sweeps = factor;
        self
    }

    /// Set the per-eigenvalue QL iteration limit
    pub fn with_max_ql_iterations(mut self, iterations: usize) -> Self {
        self.max_ql_iterations = iterations;
        self
    }

    /// Set the divide-and-conquer leaf size (clamped to at least 1)
    pub fn with_dc_leaf_size(mut self, size: usize) -> Self {
        self.dc_leaf_size = size.max(1);
        self
    }

    /// Set the GEMM parallelism threshold
    pub fn with_parallel_flop_threshold(mut self, flops: usize) -> Self {
        self.parallel_flop_threshold = flops;
        self
    }
}
