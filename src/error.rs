//! Error types for corelax.
//!
//! All errors are strongly typed using thiserror. The solver itself is a pure
//! numerical procedure, so most variants describe caller bugs (bad mentions,
//! bad weights, bad configuration) rather than recoverable runtime failures.

use thiserror::Error;

use crate::mention::MentionId;

/// Validation errors raised before any solving takes place.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Weight for pair ({anaphor}, {antecedent}) is not finite: {weight}")]
    NonFiniteWeight {
        anaphor: MentionId,
        antecedent: MentionId,
        weight: f64,
    },

    #[error("Two different mentions share the identifier {id}")]
    DuplicateMentionId {
        id: MentionId,
    },

    #[error("Mention {id} has an inverted span [{begin}, {end}]")]
    InvalidSpan {
        id: MentionId,
        begin: u32,
        end: u32,
    },

    #[error("Invalid configuration field '{field}': {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Vertex {vertex} is out of range (problem has {vertices} vertices)")]
    VertexOutOfRange {
        vertex: usize,
        vertices: usize,
    },

    #[error("Label {label} is out of range for vertex {vertex}")]
    LabelOutOfRange {
        vertex: usize,
        label: usize,
    },

    #[error("Constraint weight for ({vertex}, {label}) is not finite: {weight}")]
    NonFiniteConstraint {
        vertex: usize,
        label: usize,
        weight: f64,
    },
}

/// Execution errors raised by the batch runtime.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Resolution timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Resolution queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Resolution worker disconnected")]
    Disconnected,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error type for corelax.
#[derive(Debug, Error)]
pub enum CorefError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl CorefError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this error is retryable.
    ///
    /// A timeout is final: intermediate probability states are not partial answers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Execution(e) => matches!(e, ExecutionError::QueueFull { .. }),
            Self::Validation(_) | Self::Config(_) | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for corelax operations.
pub type CorefResult<T> = Result<T, CorefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_weight_message() {
        let err = ValidationError::NonFiniteWeight {
            anaphor: MentionId::new(3),
            antecedent: MentionId::new(1),
            weight: f64::NAN,
        };
        let msg = format!("{err}");
        assert!(msg.contains("(3, 1)"));
        assert!(msg.contains("NaN"));
    }

    #[test]
    fn test_duplicate_mention_message() {
        let err = ValidationError::DuplicateMentionId { id: MentionId::new(7) };
        assert!(format!("{err}").contains('7'));
    }

    #[test]
    fn test_timeout_message() {
        let err = ExecutionError::Timeout { duration_ms: 250 };
        assert!(format!("{err}").contains("250ms"));
    }

    #[test]
    fn test_coref_error_from_validation() {
        let err: CorefError = ValidationError::InvalidConfig {
            field: "epsilon".to_string(),
            reason: "must be finite".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_coref_error_retryable() {
        let full: CorefError = ExecutionError::QueueFull { capacity: 4 }.into();
        assert!(full.is_execution());
        assert!(full.is_retryable());

        let timeout: CorefError = ExecutionError::Timeout { duration_ms: 10 }.into();
        assert!(!timeout.is_retryable());

        let internal = CorefError::internal("unexpected state");
        assert!(!internal.is_retryable());
        assert!(format!("{internal}").contains("unexpected state"));
    }
}
