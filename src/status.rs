//! Kernel status codes
//!
//! Every LAPACK-level operation reports an integer `info`:
//!
//! | code | meaning                                                    |
//! |------|------------------------------------------------------------|
//! | `0`  | success                                                    |
//! | `<0` | argument at position `-code` was illegal                   |
//! | `>0` | the iterative solver left `code` elements unconverged      |
//!
//! [`Status`] is the typed form of that integer. Conversions in both
//! directions are lossless so a status can be handed back to a caller that
//! expects the raw code.

use crate::error::Error;

/// Outcome of a kernel call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// The call completed normally
    #[default]
    Success,
    /// The argument at this 1-based position was rejected
    IllegalArgument(u32),
    /// The iterative method stopped with this many unconverged elements
    NotConverged(u32),
}

impl Status {
    /// Decode a raw kernel `info` value.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            c if c < 0 => Self::IllegalArgument(c.unsigned_abs()),
            c => Self::NotConverged(c as u32),
        }
    }

    /// The raw kernel `info` value.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::IllegalArgument(position) => -(position as i32),
            Self::NotConverged(count) => count as i32,
        }
    }

    /// Returns true for [`Status::Success`]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Convert into a `Result`, attaching the routine name to failures.
    pub fn into_result(self, op: &'static str) -> crate::error::Result<()> {
        Error::check_info(op, self.code())
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl From<&Error> for Status {
    /// Shape errors have no kernel code of their own; they surface as an
    /// illegal first argument.
    fn from(err: &Error) -> Self {
        Self::from_code(err.info().unwrap_or(-1))
    }
}
