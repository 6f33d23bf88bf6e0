//! Seams between the orchestrator and the individual pipeline stages.
//!
//! Each stage is an explicitly constructed object injected into
//! [`IdeaOrchestrator`](super::orchestrator::IdeaOrchestrator). The LLM-backed
//! agents implement these traits; tests substitute deterministic stubs.

use async_trait::async_trait;

use super::error::AgentResult;

/// Produces the premises a topic rests on.
#[async_trait]
pub trait AssumptionMiner: Send + Sync {
    /// Returns a best-effort list of assumptions. Malformed model output
    /// degrades to a partial or empty list; only transport failures error.
    async fn mine_assumptions(&self, topic: &str) -> AgentResult<Vec<String>>;
}

/// Turns one inverted assumption into a speculative paragraph.
#[async_trait]
pub trait IdeaComposer: Send + Sync {
    async fn compose_idea(&self, topic: &str, assumption: &str, wildness: i32)
        -> AgentResult<String>;
}

/// Rates internal consistency on [0, 1]. Never fails: failures score 0.0.
#[async_trait]
pub trait CoherenceJudge: Send + Sync {
    async fn is_coherent(&self, text: &str) -> f64;
}

/// Rates how unprecedented an idea is on [0, 1]. Never fails: failures
/// score a neutral fallback.
#[async_trait]
pub trait NoveltyJudge: Send + Sync {
    async fn score_novelty(&self, text: &str) -> f64;
}

/// Final readability pass. Its output is always accepted.
#[async_trait]
pub trait IdeaRewriter: Send + Sync {
    async fn safe_rewrite(&self, text: &str) -> String;
}
