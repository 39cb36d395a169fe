//! Error types for the Codechat client.

use serde::Serialize;
use thiserror::Error;

use crate::ingest::{IngestionKind, RejectionReason, UrlRejection};

/// A shared error type for the entire Codechat client.
///
/// Gateway failures are normalized into [`CodechatError::Gateway`] or
/// [`CodechatError::Timeout`] before they reach the store, coordinators or
/// conversation engine; HTTP status codes never leak past the gateway.
#[derive(Error, Debug, Clone, Serialize)]
pub enum CodechatError {
    /// Any failed gateway call (transport error, non-2xx, `success: false`).
    #[error("Gateway error during {operation}: {message}")]
    Gateway {
        operation: &'static str,
        message: String,
    },

    /// A gateway call exceeded its configured deadline.
    #[error("{operation} timed out after {after_secs}s")]
    Timeout {
        operation: &'static str,
        after_secs: u64,
    },

    /// Client-side admission rejected an item before it reached the network.
    #[error("'{name}' rejected: {reason}")]
    Admission {
        name: String,
        reason: RejectionReason,
    },

    /// The repository URL failed validation.
    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(UrlRejection),

    /// Another ingestion already holds the session's operation slot.
    #[error("An ingestion is already in progress ({current})")]
    OperationInProgress { current: IngestionKind },

    /// A chat turn is still unresolved.
    #[error("A previous message is still being answered")]
    TurnInFlight,

    /// The conversation mode has not been decided yet.
    #[error("Conversation mode has not been decided yet")]
    ModeUndecided,

    /// The composed message was blank.
    #[error("Message is empty")]
    EmptyMessage,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CodechatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Gateway error
    pub fn gateway(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Gateway {
            operation,
            message: message.into(),
        }
    }

    /// Creates a Timeout error
    pub fn timeout(operation: &'static str, after_secs: u64) -> Self {
        Self::Timeout {
            operation,
            after_secs,
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error came from the remote gateway (including timeouts).
    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway { .. } | Self::Timeout { .. })
    }

    /// Check if this is a Timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error was raised before any network call was made.
    pub fn is_admission(&self) -> bool {
        matches!(
            self,
            Self::Admission { .. } | Self::InvalidRepositoryUrl(_) | Self::EmptyMessage
        )
    }

    /// Check if this error is a busy/precondition rejection that can be retried later.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::OperationInProgress { .. } | Self::TurnInFlight)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CodechatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CodechatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CodechatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CodechatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<UrlRejection> for CodechatError {
    fn from(err: UrlRejection) -> Self {
        Self::InvalidRepositoryUrl(err)
    }
}

/// Conversion from anyhow::Error (used at crate boundaries only)
impl From<anyhow::Error> for CodechatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, CodechatError>`.
pub type Result<T> = std::result::Result<T, CodechatError>;
