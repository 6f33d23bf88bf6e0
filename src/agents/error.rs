//! Error types for the idea generation agents.
//!
//! Only a handful of these ever reach a caller of the orchestrator: stage
//! failures are absorbed into fallback scores or retries, and the run as a
//! whole either returns an idea or [`AgentError::GenerationFailed`].

use thiserror::Error;

/// Errors that can occur during agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The caller supplied unusable input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The composer could not produce an idea paragraph.
    #[error("Idea composition failed: {0}")]
    CompositionFailed(String),

    /// No acceptable idea was produced within the retry budget.
    #[error("Idea generation failed: {0}")]
    GenerationFailed(String),

    /// Error from the LLM provider.
    #[error("LLM error: {0}")]
    LlmError(String),

    /// Channel communication error.
    #[error("Channel communication failed: {0}")]
    ChannelError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::error::LlmError> for AgentError {
    fn from(err: crate::error::LlmError) -> Self {
        AgentError::LlmError(err.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AgentError {
    fn from(err: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AgentError::ChannelError(format!("Failed to send on channel: {}", err))
    }
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
