//! idea-forge: a "never-before-thought" idea generator.
//!
//! Mines the assumptions behind a topic, inverts one into a speculative
//! paragraph, gates it on coherence and novelty judged by LLMs, and polishes
//! the survivor. Runs synchronously or streams progress from a background
//! worker.

pub mod agents;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;

// Re-export commonly used types
pub use agents::{AgentError, AgentResult, IdeaOrchestrator, IdeaResult, StatusEvent};
pub use error::{ConfigError, LlmError};
