//! Error types for the index.

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur in the index
///
/// Missing and duplicate keys are not errors: `insert`, `delete` and
/// `search` report them through `bool` and `Option`.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Minimum degree below the smallest legal branching factor
    #[error("Invalid minimum degree {min_degree} (min: {min})")]
    InvalidMinDegree { min_degree: usize, min: usize },

    /// A node violates one of the B-tree invariants
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Tree export could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IndexError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}
