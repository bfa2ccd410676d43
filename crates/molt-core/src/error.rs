//! Unified error types for the molt agent

use thiserror::Error;

/// Unified error type for all agent operations
#[derive(Error, Debug)]
pub enum MoltError {
    // Startup errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Gateway errors
    #[error("Blocked by allowlist: {0}")]
    Security(String),

    #[error("Moltbook request failed after {attempts} attempts: {last_error}")]
    RequestFailed { attempts: u32, last_error: String },

    // State store errors
    #[error("State store integrity error: {0}")]
    StoreIntegrity(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl MoltError {
    /// Errors that must stop a continuously running agent rather than just
    /// abort the current cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MoltError::Config(_) | MoltError::Security(_) | MoltError::StoreIntegrity(_)
        )
    }

    /// Process exit code the binary reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MoltError::Config(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias using MoltError
pub type Result<T> = std::result::Result<T, MoltError>;
