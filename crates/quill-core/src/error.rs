//! Error types for Quill.

use crate::action::ActionKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while running an AI edit session.
///
/// Every variant is session-scoped: none of them is fatal to the process.
/// `Parse` is recovered inside the stream decoder and `Aborted` is the
/// signature of a cancellation, so neither is ever shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssistError {
    /// Endpoint, credential or model missing; raised before any network call.
    #[error("AI service is not configured: {0}")]
    Config(String),

    /// No usable text for the requested action; raised before any network call.
    #[error("Nothing to {action}: no text available")]
    EmptyInput { action: ActionKind },

    /// A template identifier that the catalog does not know.
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    /// Non-success response status. The body is never read as a stream.
    #[error("AI request failed with HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response carried no readable body.
    #[error("AI response has no readable body")]
    StreamUnavailable,

    /// A single malformed stream record.
    #[error("Malformed stream record: {0}")]
    Parse(String),

    /// The stream was cancelled by the user or the controller.
    #[error("Request aborted")]
    Aborted,

    /// Anything else (transport failures, unexpected states).
    #[error("Unexpected AI error: {0}")]
    Unknown(String),
}

impl AssistError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Check if this error is a cancellation
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Whether the error ends the session with a visible notice.
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, Self::Parse(_) | Self::Aborted)
    }

    /// Short message for the transient error notice.
    pub fn notice(&self) -> String {
        match self {
            Self::Config(_) => "AI is not configured. Check the API settings.".to_string(),
            Self::EmptyInput { action } => format!("Nothing to {action}: write or select some text first."),
            Self::UnknownTemplate(id) => format!("Unknown template: {id}"),
            Self::Http { status, .. } => format!("AI request failed (HTTP {status})"),
            Self::StreamUnavailable => "AI response could not be read.".to_string(),
            Self::Parse(_) | Self::Aborted => String::new(),
            Self::Unknown(message) => format!("AI request failed: {message}"),
        }
    }
}

impl From<QuillError> for AssistError {
    fn from(err: QuillError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Error type for configuration and storage plumbing.
#[derive(Error, Debug, Clone)]
pub enum QuillError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuillError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
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

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for QuillError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for QuillError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for QuillError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, QuillError>`.
pub type Result<T> = std::result::Result<T, QuillError>;
