//! Domain-specific error types for chart-studio

use std::fmt;

use thiserror::Error;

use crate::messages::{self, Locale, Operation};

/// Main error type for chart-studio
#[derive(Error, Debug)]
pub enum ChartStudioError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The model output could not be decoded. `diagnostic` holds the decoder's
    /// own report and is meant for logs only.
    #[error("Parse error: model response was not in the expected JSON format")]
    Parse { diagnostic: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse error class, logged alongside failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Parse,
    Validation,
    Persistence,
    Config,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Persistence => "persistence",
            ErrorCategory::Config => "config",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChartStudioError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChartStudioError::Transport { .. } => ErrorCategory::Transport,
            ChartStudioError::Parse { .. } => ErrorCategory::Parse,
            ChartStudioError::Validation { .. } | ChartStudioError::InvalidParams { .. } => {
                ErrorCategory::Validation
            }
            ChartStudioError::Persistence { .. } => ErrorCategory::Persistence,
            ChartStudioError::Config { .. } => ErrorCategory::Config,
            ChartStudioError::Serialization { .. } | ChartStudioError::Internal { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// Localized text to show for a failed `operation`. Same text for every
    /// category.
    pub fn user_message(&self, locale: Locale, operation: Operation) -> &'static str {
        messages::failure_message(locale, operation)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ChartStudioError::Validation {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ChartStudioError::Transport {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ChartStudioError {
    fn from(err: anyhow::Error) -> Self {
        ChartStudioError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChartStudioError {
    fn from(err: serde_json::Error) -> Self {
        ChartStudioError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ChartStudioError {
    fn from(err: reqwest::Error) -> Self {
        ChartStudioError::Transport {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<std::io::Error> for ChartStudioError {
    fn from(err: std::io::Error) -> Self {
        ChartStudioError::Persistence {
            message: err.to_string(),
        }
    }
}

/// Result type alias for chart-studio operations
pub type Result<T> = std::result::Result<T, ChartStudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_hides_diagnostic() {
        let err = ChartStudioError::Parse {
            diagnostic: "expected value at line 1 column 1".into(),
        };
        let shown = err.to_string();
        assert!(!shown.contains("line 1 column 1"));
        assert_eq!(err.category(), ErrorCategory::Parse);
    }

    #[test]
    fn user_message_is_per_operation_not_per_category() {
        let parse = ChartStudioError::Parse {
            diagnostic: "eof".into(),
        };
        let transport = ChartStudioError::transport("connection refused");
        assert_eq!(
            parse.user_message(Locale::Es, Operation::GenerateData),
            transport.user_message(Locale::Es, Operation::GenerateData)
        );
        assert_ne!(
            parse.user_message(Locale::Es, Operation::GenerateData),
            parse.user_message(Locale::Es, Operation::GenerateInsights)
        );
    }

    #[test]
    fn io_errors_map_to_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ChartStudioError = io.into();
        assert_eq!(err.category(), ErrorCategory::Persistence);
    }
}
