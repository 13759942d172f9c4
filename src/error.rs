//! Error types for the checked vector API

use thiserror::Error;

/// Result type for checked vector operations
pub type Result<T> = std::result::Result<T, SimdError>;

/// Errors reported by the checked (non-`unsafe`) entry points
///
/// The raw lane operations have no failure modes: out-of-range indices and
/// undersized buffers are caller contract violations. These variants only
/// surface through the `try_*` constructors and accessors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimdError {
    /// Buffer holds fewer elements than the vector has lanes
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Lane count of the vector
        expected: usize,
        /// Elements available in the buffer
        actual: usize,
    },

    /// Lane index outside `0..lanes`
    #[error("Lane index {index} out of bounds for {lanes} lanes")]
    IndexOutOfBounds {
        /// Requested lane
        index: usize,
        /// Lane count of the vector
        lanes: usize,
    },

    /// A lane value has no exact representation in the target kind
    #[error("Lane {lane} is not representable in the target kind")]
    NotRepresentable {
        /// First offending lane
        lane: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_error() {
        let err = SimdError::SizeMismatch {
            expected: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Size mismatch: expected 4, got 3");
    }

    #[test]
    fn test_index_out_of_bounds_error() {
        let err = SimdError::IndexOutOfBounds { index: 3, lanes: 3 };
        assert_eq!(err.to_string(), "Lane index 3 out of bounds for 3 lanes");
    }

    #[test]
    fn test_not_representable_error() {
        let err = SimdError::NotRepresentable { lane: 1 };
        assert_eq!(
            err.to_string(),
            "Lane 1 is not representable in the target kind"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = SimdError::IndexOutOfBounds { index: 5, lanes: 2 };
        let err2 = SimdError::IndexOutOfBounds { index: 5, lanes: 2 };
        assert_eq!(err1, err2);
        assert_ne!(err1, SimdError::NotRepresentable { lane: 0 });
    }
}
