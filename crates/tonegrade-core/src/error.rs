//! Error types for tonegrade.

use thiserror::Error;

/// Main error type for tonegrade operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TonegradeError {
    /// Malformed tone parameters or a buffer that is not an RGB image.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No cached image for the requested preview key.
    #[error("No cached image for '{0}'. Please run the node first.")]
    NotFound(String),

    #[error("Dimension mismatch: expected {expected} samples, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Encoder error: {0}")]
    Encoder(String),
}

impl TonegradeError {
    /// Whether the caller can fix this by re-running the producing step.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for TonegradeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for tonegrade operations.
pub type Result<T> = std::result::Result<T, TonegradeError>;
