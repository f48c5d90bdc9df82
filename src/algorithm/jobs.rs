//! Job-mode enums
//!
//! Each enum maps 1:1 onto the single-character code the reference kernels
//! take (`as_char`). Parsing from a character is case-insensitive and fails
//! with `IllegalArgument` at the caller-supplied argument position.

use crate::error::{Error, Result};

/// Whether a GEMM operand is used as stored or transposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transpose {
    /// `op(X) = X` (`'N'`)
    #[default]
    NoTrans,
    /// `op(X) = Xᵀ` (`'T'`)
    Trans,
}

impl Transpose {
    /// Kernel character code
    pub fn as_char(self) -> u8 {
        match self {
            Self::NoTrans => b'N',
            Self::Trans => b'T',
        }
    }

    /// Transpose flag of a view
    pub fn from_flag(transposed: bool) -> Self {
        if transposed { Self::Trans } else { Self::NoTrans }
    }

    /// Whether this is [`Transpose::Trans`]
    pub fn is_trans(self) -> bool {
        self == Self::Trans
    }

    /// Parse `'N'`/`'T'` (`'C'` is accepted as `'T'` for real data)
    pub fn parse(code: char, op: &'static str, position: u32) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'N' => Ok(Self::NoTrans),
            'T' | 'C' => Ok(Self::Trans),
            _ => Err(Error::IllegalArgument { op, position }),
        }
    }
}

/// Which singular vectors an SVD computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SvdJob {
    /// All columns of U (or rows of Vᵀ) (`'A'`)
    All,
    /// The leading `min(m, n)` columns of U (or rows of Vᵀ) (`'S'`)
    Thin,
    /// The leading `min(m, n)` vectors overwrite the input matrix (`'O'`)
    Overwrite,
    /// No vectors (`'N'`)
    None,
}

impl SvdJob {
    /// Kernel character code
    pub fn as_char(self) -> u8 {
        match self {
            Self::All => b'A',
            Self::Thin => b'S',
            Self::Overwrite => b'O',
            Self::None => b'N',
        }
    }

    /// Parse one of `A`, `S`, `O`, `N`
    pub fn parse(code: char, op: &'static str, position: u32) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'A' => Ok(Self::All),
            'S' => Ok(Self::Thin),
            'O' => Ok(Self::Overwrite),
            'N' => Ok(Self::None),
            _ => Err(Error::IllegalArgument { op, position }),
        }
    }

    /// Number of vectors produced for a side of dimension `dim` when
    /// `k = min(m, n)`
    pub fn vector_count(self, dim: usize, k: usize) -> usize {
        match self {
            Self::All => dim,
            Self::Thin | Self::Overwrite => k,
            Self::None => 0,
        }
    }
}

/// Whether a symmetric eigendecomposition returns eigenvectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EigenJob {
    /// Eigenvalues only (`'N'`)
    ValuesOnly,
    /// Eigenvalues and eigenvectors (`'V'`); eigenvectors overwrite the input
    #[default]
    ValuesAndVectors,
}

impl EigenJob {
    /// Kernel character code
    pub fn as_char(self) -> u8 {
        match self {
            Self::ValuesOnly => b'N',
            Self::ValuesAndVectors => b'V',
        }
    }

    /// Parse `'N'`/`'V'`
    pub fn parse(code: char, op: &'static str, position: u32) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'N' => Ok(Self::ValuesOnly),
            'V' => Ok(Self::ValuesAndVectors),
            _ => Err(Error::IllegalArgument { op, position }),
        }
    }
}

/// Triangle of a symmetric matrix that is read
///
/// The other triangle is never accessed, so it may hold anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Triangle {
    /// Lower triangle (`'L'`)
    #[default]
    Lower,
    /// Upper triangle (`'U'`)
    Upper,
}

impl Triangle {
    /// Kernel character code
    pub fn as_char(self) -> u8 {
        match self {
            Self::Lower => b'L',
            Self::Upper => b'U',
        }
    }

    /// Parse `'L'`/`'U'`
    pub fn parse(code: char, op: &'static str, position: u32) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'L' => Ok(Self::Lower),
            'U' => Ok(Self::Upper),
            _ => Err(Error::IllegalArgument { op, position }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svd_job_parse() {
        for (c, job) in [
            ('A', SvdJob::All),
            ('s', SvdJob::Thin),
            ('O', SvdJob::Overwrite),
            ('n', SvdJob::None),
        ] {
            let parsed = SvdJob::parse(c, "dgesvd", 1).unwrap();
            assert_eq!(parsed, job);
            assert_eq!(parsed.as_char(), c.to_ascii_uppercase() as u8);
        }
        assert_eq!(
            SvdJob::parse('X', "dgesvd", 2),
            Err(Error::IllegalArgument {
                op: "dgesvd",
                position: 2
            })
        );
    }

    #[test]
    fn test_vector_count() {
        assert_eq!(SvdJob::All.vector_count(5, 3), 5);
        assert_eq!(SvdJob::Thin.vector_count(5, 3), 3);
        assert_eq!(SvdJob::Overwrite.vector_count(5, 3), 3);
        assert_eq!(SvdJob::None.vector_count(5, 3), 0);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Triangle::default(), Triangle::Lower);
        assert_eq!(EigenJob::default(), EigenJob::ValuesAndVectors);
        assert_eq!(Transpose::parse('c', "dgemm", 1), Ok(Transpose::Trans));
        assert!(Triangle::parse('x', "dsyev", 2).is_err());
    }
}
