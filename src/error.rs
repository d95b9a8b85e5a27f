//! Error handling for combo-forge

use std::path::Path;

use thiserror::Error;

/// Main error type for combo-forge
#[derive(Error, Debug, Clone)]
pub enum ComboForgeError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ComboForgeError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Io {
            message: message.into(),
            path,
        }
    }

    /// Create an IO error tied to the file it happened on
    pub fn io_at(err: std::io::Error, path: &Path) -> Self {
        Self::io(err.to_string(), Some(path.display().to_string()))
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error was raised before any file was touched
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => {
                format!("❌ Invalid settings: {}\n💡 Make sure 1 <= min <= max and intervals are positive", message)
            }
            Self::Io { message, path } => {
                let path_info = path.as_ref().map_or(String::new(), |p| format!(" ({})", p));
                format!("❌ File error{}: {}\n💡 Check file permissions and free disk space", path_info, message)
            }
            Self::Internal { message } => {
                format!("❌ Internal error: {}\n💡 This is a bug, please report it", message)
            }
        }
    }
}

impl From<std::io::Error> for ComboForgeError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string(), None)
    }
}

impl From<serde_json::Error> for ComboForgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("Failed to serialize report: {}", err))
    }
}

impl From<tokio::task::JoinError> for ComboForgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Enumeration task failed: {}", err))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ComboForgeError>;

/// Helper macro for validation failures
#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::error::ComboForgeError::validation($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ComboForgeError::validation(format!($fmt, $($arg)*))
    };
}
