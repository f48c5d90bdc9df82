//! Error types for densela

use thiserror::Error;

/// Result type alias using densela's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in densela operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A matrix view could not be described over the supplied buffer
    #[error("Invalid matrix shape: {reason}")]
    InvalidShape {
        /// Description of the violated constraint
        reason: String,
    },

    /// Operand dimensions do not conform for the requested operation
    #[error("Dimension mismatch in '{op}': expected {expected}, got {got}")]
    DimensionMismatch {
        /// The operation name
        op: &'static str,
        /// Expected dimensions, human readable
        expected: String,
        /// Actual dimensions, human readable
        got: String,
    },

    /// The kernel rejected an argument (negative status)
    #[error("Illegal value for argument {position} of '{op}'")]
    IllegalArgument {
        /// The kernel routine name
        op: &'static str,
        /// 1-based position of the offending argument
        position: u32,
    },

    /// An iterative method stopped before converging (positive status)
    #[error("'{op}' failed to converge: {unconverged} element(s) did not converge")]
    ConvergenceFailure {
        /// The kernel routine name
        op: &'static str,
        /// Number of off-diagonal elements (or eigenvalues) left unconverged
        unconverged: u32,
    },
}

impl Error {
    /// Create an invalid shape error
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        op: &'static str,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self::DimensionMismatch {
            op,
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Map a kernel `info` value to an error, `Ok(())` for zero.
    ///
    /// Negative values name the 1-based position of an illegal argument,
    /// positive values count unconverged elements.
    pub fn check_info(op: &'static str, info: i32) -> Result<()> {
        match info {
            0 => Ok(()),
            i if i < 0 => Err(Self::IllegalArgument {
                op,
                position: i.unsigned_abs(),
            }),
            i => Err(Self::ConvergenceFailure {
                op,
                unconverged: i as u32,
            }),
        }
    }

    /// The kernel status integer this error corresponds to, if any.
    ///
    /// Shape and dimension errors are detected before any kernel call and
    /// therefore carry no kernel status.
    pub fn info(&self) -> Option<i32> {
        match self {
            Self::IllegalArgument { position, .. } => Some(-(*position as i32)),
            Self::ConvergenceFailure { unconverged, .. } => Some(*unconverged as i32),
            Self::InvalidShape { .. } | Self::DimensionMismatch { .. } => None,
        }
    }
}
