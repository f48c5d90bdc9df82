//! # densela
//!
//! **Dense linear algebra over column-major `f64` buffers.**
//!
//! densela exposes five LAPACK-shaped operations on caller-owned buffers:
//! general matrix multiply-accumulate, minimum-norm least squares (SVD or
//! complete orthogonal factorization), singular value decomposition (QR
//! iteration or divide and conquer) and the symmetric eigendecomposition.
//!
//! ## Why densela?
//!
//! - **Zero-copy views**: matrices are borrowed slices plus a leading
//!   dimension and a transpose flag
//! - **LAPACK status codes**: every failure maps bit-for-bit onto the
//!   reference `info` convention
//! - **Pure Rust by default**: native kernels, with an optional switch to the
//!   system BLAS/LAPACK
//!
//! ## Quick Start
//!
//! ```rust
//! use densela::prelude::*;
//!
//! let engine = Engine::new();
//! let mut a = [2.0, 0.0, 0.0, 3.0];
//! let mut w = [0.0; 2];
//! let mut av = MatrixViewMut::col_major(&mut a, 2, 2)?;
//! engine.eigen_symmetric(EigenJob::ValuesAndVectors, Triangle::Lower, &mut av, &mut w)?;
//! assert_eq!(w, [2.0, 3.0]);
//! # Ok::<(), densela::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): column-parallel GEMM and parallel divide-and-conquer
//! - `system-lapack`: link OpenBLAS and expose `SystemLapack`; the [`flat`]
//!   functions then route through it

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod config;
pub mod engine;
pub mod error;
pub mod flat;
pub mod matrix;
pub mod provider;
pub mod status;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::{
        EigenJob, LeastSquaresSolution, LeastSquaresStrategy, SvdJob, Transpose, Triangle,
    };
    pub use crate::config::KernelConfig;
    pub use crate::engine::Engine;
    pub use crate::error::{Error, Result};
    pub use crate::matrix::{Layout, MatrixView, MatrixViewMut};
    pub use crate::provider::{KernelProvider, NativeKernels};
    pub use crate::status::Status;

    #[cfg(feature = "system-lapack")]
    pub use crate::provider::SystemLapack;
}

/// Default kernel provider based on enabled features
#[cfg(feature = "system-lapack")]
pub type DefaultProvider = provider::SystemLapack;

/// Default kernel provider based on enabled features
#[cfg(not(feature = "system-lapack"))]
pub type DefaultProvider = provider::NativeKernels;
