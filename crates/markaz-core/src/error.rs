//! Error types for the Markaz engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Markaz crate.
///
/// Variants are structured so callers can branch on the failure class
/// (malformed assistant output vs. transport vs. storage) without parsing
/// messages.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MarkazError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Caller supplied input that cannot be processed (e.g. an empty prompt)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Graph data from the assistant did not have the expected shape
    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),

    /// Network or protocol failure while talking to the assistant
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarkazError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a MalformedFragment error
    pub fn malformed_fragment(message: impl Into<String>) -> Self {
        Self::MalformedFragment(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a MalformedFragment error
    pub fn is_malformed_fragment(&self) -> bool {
        matches!(self, Self::MalformedFragment(_))
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MarkazError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MarkazError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MarkazError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MarkazError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<semver::Error> for MarkazError {
    fn from(err: semver::Error) -> Self {
        Self::Config(format!("invalid schema version: {}", err))
    }
}

/// A type alias for `Result<T, MarkazError>`.
pub type Result<T> = std::result::Result<T, MarkazError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: MarkazError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "chat file missing").into();
        assert!(matches!(err, MarkazError::Io { .. }));
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_json_error_is_serialization() {
        let err: MarkazError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        match err {
            MarkazError::Serialization { format, .. } => assert_eq!(format, "JSON"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_predicates() {
        assert!(MarkazError::not_found("chat", "chat_1").is_not_found());
        assert!(MarkazError::malformed_fragment("no nodes").is_malformed_fragment());
        assert!(MarkazError::transport("refused").is_transport());
        assert!(MarkazError::config("bad").is_config());
    }
}
