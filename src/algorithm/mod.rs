//! Operation contracts shared by every kernel provider
//!
//! The types here describe WHAT an operation computes, independent of which
//! [`KernelProvider`](crate::provider::KernelProvider) executes it:
//!
//! - [`Transpose`], [`SvdJob`], [`EigenJob`], [`Triangle`] - closed job-mode
//!   enums mapping 1:1 onto the kernel character codes
//! - [`LeastSquaresStrategy`] / [`LeastSquaresSolution`] - strategy selection
//!   and rank diagnostics for least-squares solves
//! - [`helpers`] - dimension validation used before any buffer is written

pub mod helpers;
mod jobs;
mod least_squares;

pub use jobs::{EigenJob, SvdJob, Transpose, Triangle};
pub use least_squares::{LeastSquaresSolution, LeastSquaresStrategy, effective_rcond};
