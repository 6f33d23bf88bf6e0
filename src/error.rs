//! Error types for idea-forge operations.
//!
//! Defines the error types shared across subsystems:
//! - LLM API interactions
//! - Process configuration loaded from the environment
//!
//! Pipeline-level failures live in [`crate::agents::error`].

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("LLM request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Errors raised while loading process-wide configuration.
///
/// These are startup-time conditions: the binary exits instead of serving
/// requests with a half-configured client.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing API key: set GEMINI_API_KEY, GOOGLE_API_KEY or LLM_API_KEY")]
    MissingApiKey,

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}
