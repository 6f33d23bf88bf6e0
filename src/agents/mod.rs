//! Agents for mining, composing, judging and polishing ideas.

pub mod coherence;
pub mod composer;
pub mod error;
pub mod miner;
pub mod novelty;
pub mod orchestrator;
pub mod rewriter;
pub mod scoring;
pub mod stages;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use coherence::{CoherenceConfig, CoherenceJudgeAgent};
pub use composer::{wildness_to_temperature, ComposerAgent, ComposerConfig};
pub use error::{AgentError, AgentResult};
pub use miner::{parse_assumptions, MinerAgent, MinerConfig, ParsedAssumptions};
pub use novelty::{NoveltyConfig, NoveltyJudgeAgent};
pub use orchestrator::{
    IdeaOrchestrator, IdeaStages, OrchestratorConfig, COHERENCE_THRESHOLD, MAX_RETRIES,
    NOVELTY_THRESHOLD,
};
pub use rewriter::{RewriterAgent, RewriterConfig};
pub use stages::{AssumptionMiner, CoherenceJudge, IdeaComposer, IdeaRewriter, NoveltyJudge};
pub use types::{IdeaResult, PipelineStage, StatusCallback, StatusEvent};
