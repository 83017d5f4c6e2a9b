//! Graph anomaly detection error types.

use thiserror::Error;

/// Graph anomaly detection errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnomalyError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid graph at index {index}: {reason}")]
    InvalidGraph { index: usize, reason: String },

    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Insufficient data: required {required}, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Embedding error: {0}")]
    Embedding(String),
}

impl AnomalyError {
    /// Shorthand for [`AnomalyError::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AnomalyError::InvalidGraph`].
    pub fn invalid_graph(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGraph {
            index,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's configuration.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::InsufficientData { .. } | Self::NotImplemented(_)
        )
    }

    /// True for errors caused by the input graphs themselves.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::InvalidGraph { .. })
    }
}

/// Result type for graph anomaly detection operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;
