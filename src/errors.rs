//! Error types for the relato CLI
//!
//! Each error type has a corresponding error code for programmatic handling.

use thiserror::Error;

/// Result type alias for relato operations
pub type Result<T> = std::result::Result<T, RelatoError>;

/// Main error type for all relato operations
#[derive(Debug, Error)]
pub enum RelatoError {
    /// A required context field is absent for the state being entered
    #[error("Context is not valid for state {state}: missing {field}")]
    Validation { state: String, field: String },

    /// A discriminant field holds a value outside its enumerated domain
    #[error("Routing error: {0}")]
    Routing(String),

    /// A handler proposed a transition the map does not allow
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Invalid JSON format
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// External engine (fetch/transcribe/generate/render) error
    #[error("Engine error: {0}")]
    EngineError(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Operation was interrupted (e.g., by SIGINT or prompt cancellation)
    #[error("Operation interrupted")]
    Interrupted,

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error with context
    #[error("{context}: {message}")]
    Wrapped { context: String, message: String },
}

impl RelatoError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            RelatoError::Validation { .. } => "VALIDATION",
            RelatoError::Routing(_) => "ROUTING",
            RelatoError::InvalidTransition { .. } => "INVALID_TRANSITION",
            RelatoError::InvalidJson(_) => "INVALID_JSON",
            RelatoError::FileNotFound(_) => "FILE_NOT_FOUND",
            RelatoError::ConfigError(_) => "CONFIG_ERROR",
            RelatoError::EngineError(_) => "ENGINE_ERROR",
            RelatoError::Timeout(_) => "TIMEOUT",
            RelatoError::Interrupted => "INTERRUPTED",
            RelatoError::Io(_) => "IO_ERROR",
            RelatoError::Wrapped { .. } => "WRAPPED_ERROR",
        }
    }

    /// Wrap an error with additional context
    pub fn wrap<E: std::fmt::Display>(error: E, context: impl Into<String>) -> Self {
        RelatoError::Wrapped {
            context: context.into(),
            message: error.to_string(),
        }
    }
}

/// Convert an error to an appropriate exit code
pub fn to_exit_code(error: &RelatoError) -> i32 {
    match error {
        RelatoError::Interrupted => 130, // Standard Unix exit code for SIGINT
        _ => 1,
    }
}
