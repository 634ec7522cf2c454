//! Error types for crewloop
//!
//! Everything that can go wrong below the binary funnels into [`AgentError`].
//! Only [`AgentError::OracleUnavailable`] is meant to escape a conversation
//! turn; the other variants are caught at the capability boundary and turned
//! into transcript text.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the agent crew
#[derive(Error, Debug)]
pub enum AgentError {
    /// A tool path resolved outside the workspace root
    #[error("Access denied: '{path}' resolves outside the workspace {}", root.display())]
    PathViolation { path: String, root: PathBuf },

    /// Static sandbox rejection of a code execution request
    #[error("Security Violation:\n{}", reasons.join("\n"))]
    SecurityViolation { reasons: Vec<String> },

    /// The model backend could not be reached or returned garbage
    #[error("Model oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// State machine transition errors
    #[error("Invalid state transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    /// Tool arguments did not match the capability schema
    #[error("Invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A capability ran but could not complete
    #[error("{0}")]
    ToolFailed(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AgentError {
    /// Whether this error should abort the current conversation turn
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::OracleUnavailable(_))
    }
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
