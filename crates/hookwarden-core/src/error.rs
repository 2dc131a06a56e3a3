//! Error types for hook evaluation
//!
//! Failures in primary obligations (reading the event, parsing configuration,
//! compiling user patterns, writing a new session artifact) surface as
//! [`HookError`] and end the invocation. Failures while gathering advisory
//! signals are downgraded by the evaluators and never reach the caller.

use thiserror::Error;

/// Main error type for hook evaluation
#[derive(Error, Debug)]
pub enum HookError {
    /// Malformed configuration document or option
    #[error("Config error: {0}")]
    Config(String),

    /// Malformed hook event payload
    #[error("Event error: {0}")]
    Event(String),

    /// A user-supplied regular expression failed to compile
    #[error("Invalid pattern '{pattern}' in {source_name}: {reason}")]
    Match {
        source_name: String,
        pattern: String,
        reason: String,
    },

    /// An external measurement could not be obtained
    #[error("Signal unavailable: {0}")]
    SignalUnavailable(String),

    /// Artifact or event I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while encoding output
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl HookError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        HookError::Config(msg.into())
    }

    /// Create an event error
    pub fn event(msg: impl Into<String>) -> Self {
        HookError::Event(msg.into())
    }

    /// Create a signal-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        HookError::SignalUnavailable(msg.into())
    }

    /// Create a pattern compilation error
    pub fn invalid_pattern(
        source_name: impl Into<String>,
        pattern: impl Into<String>,
        err: &regex::Error,
    ) -> Self {
        HookError::Match {
            source_name: source_name.into(),
            pattern: pattern.into(),
            reason: err.to_string(),
        }
    }

    /// Check if this error stems from user input (event or configuration)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            HookError::Config(_) | HookError::Event(_) | HookError::Match { .. }
        )
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        HookError::Serialization(err.to_string())
    }
}

/// Result type alias for hook operations
pub type Result<T> = std::result::Result<T, HookError>;
