//! Custom error types for Gauntlet.
//!
//! Per-check failures never appear here: they are absorbed by the check
//! runner and turned into [`CheckResult`](crate::check::CheckResult) data.
//! This module covers the errors that abort a run outright - malformed
//! configuration and a provider that is unusable for the run as a whole.

use std::path::PathBuf;
use thiserror::Error;

use crate::provider::ProviderError;

/// Main error type for Gauntlet operations
#[derive(Error, Debug)]
pub enum GauntletError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    /// The isolation provider is unusable for the run as a whole
    #[error("Infrastructure error: {message}")]
    Infrastructure { message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GauntletError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an invalid-configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure {
            message: message.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error was detected before any check executed
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidConfig { .. })
    }

    /// Check if this error aborted an in-progress run
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Infrastructure { .. })
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Infrastructure { .. } => 2,
            Self::Config { .. } | Self::InvalidConfig { .. } => 7,
            _ => 1,
        }
    }
}

impl From<ProviderError> for GauntletError {
    fn from(err: ProviderError) -> Self {
        Self::Infrastructure {
            message: err.to_string(),
        }
    }
}

/// Type alias for Gauntlet results
pub type Result<T> = std::result::Result<T, GauntletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GauntletError::invalid_config("ruff", "empty command");
        assert!(err.to_string().contains("ruff"));
        assert!(err.to_string().contains("empty command"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(GauntletError::config("test").exit_code(), 7);
        assert_eq!(GauntletError::invalid_config("a", "b").exit_code(), 7);
        assert_eq!(GauntletError::infrastructure("down").exit_code(), 2);
        assert_eq!(GauntletError::Other(anyhow::anyhow!("boom")).exit_code(), 1);
    }

    #[test]
    fn test_classification() {
        assert!(GauntletError::config("test").is_config());
        assert!(!GauntletError::config("test").is_infrastructure());
        assert!(GauntletError::infrastructure("down").is_infrastructure());
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/test/path.env");
        let err = GauntletError::config_with_path("failed to parse", path.clone());
        if let GauntletError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_from_provider_error() {
        let err: GauntletError =
            ProviderError::Unavailable("no container runtime found".to_string()).into();
        assert!(err.is_infrastructure());
        assert!(err.to_string().contains("no container runtime"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: GauntletError = io_err.into();
        assert!(matches!(err, GauntletError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
