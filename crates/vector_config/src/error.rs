//! Error types for the named-vector map.

use thiserror::Error;

/// Errors that can occur when reading or updating a [`VectorConfig`](crate::VectorConfig).
#[derive(Debug, Error, PartialEq)]
pub enum VectorConfigError {
    /// Lookup of a key that is not in the map
    #[error("VectorConfig: invalid key \"{0}\"")]
    InvalidKey(String),

    /// A delta or addend has a different length than the stored vector
    #[error("VectorConfig: mismatched dimensions for key \"{key}\" (stored {expected}, got {actual})")]
    DimensionMismatch {
        /// Key whose vectors disagree
        key: String,
        /// Length of the stored vector
        expected: usize,
        /// Length of the incoming vector
        actual: usize,
    },

    /// A flat delta does not cover the total dimension of the map
    #[error("VectorConfig: flat delta has {actual} entries, map dimension is {expected}")]
    FlatDimensionMismatch {
        /// Total dimension of the map
        expected: usize,
        /// Length of the flat delta
        actual: usize,
    },
}

/// Result type for vector map operations.
pub type VectorConfigResult<T> = Result<T, VectorConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VectorConfigError::InvalidKey("x1".to_string());
        assert_eq!(err.to_string(), "VectorConfig: invalid key \"x1\"");

        let err = VectorConfigError::DimensionMismatch {
            key: "l1".to_string(),
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "VectorConfig: mismatched dimensions for key \"l1\" (stored 2, got 3)"
        );

        let err = VectorConfigError::FlatDimensionMismatch {
            expected: 4,
            actual: 5,
        };
        assert_eq!(err.to_string(), "VectorConfig: flat delta has 5 entries, map dimension is 4");
    }
}
