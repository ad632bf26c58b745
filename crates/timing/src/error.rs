//! Error types for the timing outline.

use thiserror::Error;

/// Errors that can occur while driving or reporting a timing tree.
#[derive(Debug, Error)]
pub enum TimingError {
    /// A `toc` named a different region than the one currently open
    #[error("Mismatched tic/toc: toc({found}) called when last tic was tic({expected})")]
    MismatchedToc {
        /// Label of the region that is actually open
        expected: String,
        /// Label passed to `toc`
        found: String,
    },

    /// A `toc` was issued while no region was open
    #[error("Unbalanced toc({label}): no open region to close")]
    UnbalancedToc {
        /// Label passed to `toc`
        label: String,
    },

    /// Failed to write a report to its sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to (de)serialize a config or snapshot
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for timing operations.
pub type TimingResult<T> = Result<T, TimingError>;
