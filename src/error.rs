//! Error types for alignment operations.
//!
//! Only conditions that abort an alignment are modelled here. Degenerate
//! similarity values and optimizer non-convergence are not errors: they flow
//! through the optimization landscape as non-finite costs or best-effort points.

use thiserror::Error;

/// Fatal alignment errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    /// Two images (or two paired pyramid levels) differ in shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Reference and target pyramids have a different number of levels.
    #[error("Pyramid mismatch: reference has {reference} levels, target has {target}")]
    PyramidMismatch { reference: usize, target: usize },

    /// An image with zero rows or columns was supplied.
    #[error("Image is empty")]
    EmptyImage,

    /// A configuration value or argument is out of its valid domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl AlignError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Fails with `ShapeMismatch` unless both shapes are identical.
    pub fn check_shapes(expected: (usize, usize), actual: (usize, usize)) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::ShapeMismatch { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_shapes() {
        assert!(AlignError::check_shapes((4, 5), (4, 5)).is_ok());
        let err = AlignError::check_shapes((4, 5), (5, 4)).unwrap_err();
        assert_eq!(
            err,
            AlignError::ShapeMismatch {
                expected: (4, 5),
                actual: (5, 4)
            }
        );
        assert!(err.to_string().contains("(5, 4)"));
    }
}
