//! Unified error system for Trellis
//!
//! A single, flat error type shared across crates. Domain crates keep their
//! own precise error enums and convert into this one at their boundaries.

use serde::{Deserialize, Serialize};

/// Unified error type for all Trellis operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TrellisError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Permission denied
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message describing the permission issue
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Internal invariant violated
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl TrellisError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller can reasonably surface this to an end user
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Invalid { .. } | Self::NotFound { .. } | Self::PermissionDenied { .. }
        )
    }
}

/// Standard Result type for Trellis operations
pub type Result<T> = std::result::Result<T, TrellisError>;

impl From<std::io::Error> for TrellisError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for TrellisError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid(format!("Invalid TOML: {err}"))
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid(format!("Invalid JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_category() {
        let err = TrellisError::storage("policy batch rejected");
        assert_eq!(err.to_string(), "Storage error: policy batch rejected");
    }

    #[test]
    fn missing_config_file_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "trellis.toml");
        assert!(matches!(
            TrellisError::from(io_err),
            TrellisError::NotFound { .. }
        ));
    }

    #[test]
    fn malformed_toml_is_invalid() {
        let err = toml::from_str::<toml::Value>("enforce = ").unwrap_err();
        assert!(matches!(TrellisError::from(err), TrellisError::Invalid { .. }));
    }

    #[test]
    fn only_caller_errors_are_user_facing() {
        assert!(TrellisError::permission_denied("nope").is_user_facing());
        assert!(!TrellisError::internal("duplicate rule name").is_user_facing());
        assert!(!TrellisError::storage("disk").is_user_facing());
    }
}
