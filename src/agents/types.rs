//! Shared types for the idea generation pipeline.
//!
//! Contains the returned [`IdeaResult`], the [`PipelineStage`] checkpoints and
//! the [`StatusEvent`] records streamed while a run is in progress.

use serde::{Deserialize, Serialize};

use super::error::AgentResult;

/// A finished, polished idea. The only artifact the pipeline returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaResult {
    /// Polished idea paragraph.
    pub idea: String,
    /// Novelty score in [0, 1].
    pub novelty: f64,
    /// Coherence score in [0, 1].
    pub coherence: f64,
    /// Version string of the generator that produced this idea.
    pub version: String,
}

/// Checkpoints reported through the status callback, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Mining assumptions about the topic.
    Mining,
    /// Composing an idea that inverts one assumption.
    Composing,
    /// Judging internal consistency.
    CoherenceCheck,
    /// Coherence gate rejected the attempt; a new one follows.
    Refining,
    /// Judging how unprecedented the idea is.
    NoveltyCheck,
    /// Rewriting the accepted idea for readability.
    Polishing,
}

impl PipelineStage {
    /// Returns the status message emitted when this checkpoint is reached.
    pub fn status_message(&self) -> &'static str {
        match self {
            PipelineStage::Mining => "mining assumptions",
            PipelineStage::Composing => "composing",
            PipelineStage::CoherenceCheck => "checking coherence",
            PipelineStage::Refining => "refining",
            PipelineStage::NoveltyCheck => "scoring novelty",
            PipelineStage::Polishing => "polishing",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status_message())
    }
}

/// Callback invoked synchronously with each status message.
pub type StatusCallback = dyn Fn(&str) + Send + Sync;

/// Events produced by a streaming generation run.
///
/// Serialized as `{"type": "status", "message": ...}`,
/// `{"type": "result", "data": {...}}` or `{"type": "error", "message": ...}`.
/// [`StatusEvent::Done`] is an in-process sentinel and is never forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StatusEvent {
    /// Progress message from a pipeline checkpoint.
    Status { message: String },
    /// The finished idea.
    Result { data: IdeaResult },
    /// The run failed.
    Error { message: String },
    /// End-of-stream marker sent after the final result or error.
    Done,
}

impl StatusEvent {
    /// Creates a status event.
    pub fn status(message: impl Into<String>) -> Self {
        StatusEvent::Status {
            message: message.into(),
        }
    }

    /// Creates a result event.
    pub fn result(data: IdeaResult) -> Self {
        StatusEvent::Result { data }
    }

    /// Creates an error event.
    pub fn error(message: impl Into<String>) -> Self {
        StatusEvent::Error {
            message: message.into(),
        }
    }

    /// Returns true for the end-of-stream sentinel.
    pub fn is_done(&self) -> bool {
        matches!(self, StatusEvent::Done)
    }

    /// Renders the event as a server-sent-events frame: `data: {json}\n\n`.
    pub fn to_sse_frame(&self) -> AgentResult<String> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}
