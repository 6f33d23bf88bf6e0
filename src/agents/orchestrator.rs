//! Idea Orchestrator.
//!
//! Sequences the pipeline stages with quality gates and bounded retries:
//!
//! 1. Mining - list the assumptions behind the topic
//! 2. Composing - invert one random assumption into a paragraph
//! 3. Coherence check - reject the attempt below the coherence threshold
//! 4. Novelty check - reject below the novelty threshold, except on the last attempt
//! 5. Polishing - clarity rewrite of the accepted paragraph
//!
//! The coherence gate is always enforced. The novelty gate is waived on the
//! final attempt so a run with coherent output always returns something.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::{Settings, StageModels};
use crate::error::LlmError;
use crate::llm::{LiteLlmClient, LlmProvider};

use super::coherence::{CoherenceConfig, CoherenceJudgeAgent};
use super::composer::{ComposerAgent, ComposerConfig};
use super::error::{AgentError, AgentResult};
use super::miner::{MinerAgent, MinerConfig};
use super::novelty::{NoveltyConfig, NoveltyJudgeAgent};
use super::rewriter::{RewriterAgent, RewriterConfig};
use super::stages::{AssumptionMiner, CoherenceJudge, IdeaComposer, IdeaRewriter, NoveltyJudge};
use super::types::{IdeaResult, PipelineStage, StatusCallback};

/// Total attempts per run.
pub const MAX_RETRIES: usize = 3;

/// Attempts scoring below this coherence are discarded.
pub const COHERENCE_THRESHOLD: f64 = 0.3;

/// Attempts scoring below this novelty are discarded unless it is the last one.
pub const NOVELTY_THRESHOLD: f64 = 0.4;

/// Configuration for the Idea Orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Total attempts before giving up.
    pub max_retries: usize,
    /// Minimum coherence to keep an attempt.
    pub coherence_threshold: f64,
    /// Minimum novelty to keep a non-final attempt.
    pub novelty_threshold: f64,
    /// Version string stamped on every result.
    pub version: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            coherence_threshold: COHERENCE_THRESHOLD,
            novelty_threshold: NOVELTY_THRESHOLD,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the version string reported in results.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the number of attempts (at least one).
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Sets the coherence threshold.
    pub fn with_coherence_threshold(mut self, threshold: f64) -> Self {
        self.coherence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Sets the novelty threshold.
    pub fn with_novelty_threshold(mut self, threshold: f64) -> Self {
        self.novelty_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// The stage implementations an orchestrator drives.
#[derive(Clone)]
pub struct IdeaStages {
    pub miner: Arc<dyn AssumptionMiner>,
    pub composer: Arc<dyn IdeaComposer>,
    pub coherence: Arc<dyn CoherenceJudge>,
    pub novelty: Arc<dyn NoveltyJudge>,
    pub rewriter: Arc<dyn IdeaRewriter>,
}

impl IdeaStages {
    /// Builds the LLM-backed stages sharing one provider, each with its own model.
    pub fn from_llm(llm_client: Arc<dyn LlmProvider>, models: &StageModels) -> Self {
        Self {
            miner: Arc::new(MinerAgent::new(
                Arc::clone(&llm_client),
                MinerConfig::new().with_model(models.miner.clone()),
            )),
            composer: Arc::new(ComposerAgent::new(
                Arc::clone(&llm_client),
                ComposerConfig::new().with_model(models.composer.clone()),
            )),
            coherence: Arc::new(CoherenceJudgeAgent::new(
                Arc::clone(&llm_client),
                CoherenceConfig::default().with_model(models.judge.clone()),
            )),
            novelty: Arc::new(NoveltyJudgeAgent::new(
                Arc::clone(&llm_client),
                NoveltyConfig::default().with_model(models.judge.clone()),
            )),
            rewriter: Arc::new(RewriterAgent::new(
                llm_client,
                RewriterConfig::default().with_model(models.rewriter.clone()),
            )),
        }
    }
}

/// Outcome of a single attempt.
enum AttemptOutcome {
    Accepted(IdeaResult),
    Rejected,
}

/// Orchestrator that runs the retry loop over the pipeline stages.
pub struct IdeaOrchestrator {
    stages: IdeaStages,
    config: OrchestratorConfig,
}

impl std::fmt::Debug for IdeaOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdeaOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IdeaOrchestrator {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "idea_orchestrator";

    /// Creates a new orchestrator from explicit stages.
    pub fn new(stages: IdeaStages, config: OrchestratorConfig) -> Self {
        Self { stages, config }
    }

    /// Creates an orchestrator wired to the configured LLM endpoint.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let client: Arc<dyn LlmProvider> = Arc::new(LiteLlmClient::from_settings(settings)?);
        Ok(Self::new(
            IdeaStages::from_llm(client, &settings.models),
            OrchestratorConfig::new().with_version(settings.version.clone()),
        ))
    }

    /// Returns the orchestrator configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generates one idea about `topic`.
    ///
    /// `status` is invoked synchronously at each checkpoint, in pipeline
    /// order, once per attempt that reaches it.
    ///
    /// # Errors
    ///
    /// - [`AgentError::InvalidInput`] for a blank topic.
    /// - [`AgentError::GenerationFailed`] when mining fails or every attempt
    ///   is rejected.
    pub async fn generate_idea(
        &self,
        topic: &str,
        wildness: i32,
        status: Option<&StatusCallback>,
    ) -> AgentResult<IdeaResult> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AgentError::InvalidInput("topic must not be empty".to_string()));
        }

        let span = tracing::info_span!(
            "generate_idea",
            agent = Self::AGENT_NAME,
            run_id = %Uuid::new_v4(),
            topic,
            wildness
        );

        async move {
            let max_retries = self.config.max_retries;
            for attempt in 0..max_retries {
                let is_last = attempt + 1 == max_retries;
                match self.run_attempt(topic, wildness, is_last, status).await? {
                    AttemptOutcome::Accepted(result) => {
                        tracing::info!(
                            attempt = attempt + 1,
                            novelty = result.novelty,
                            coherence = result.coherence,
                            "Idea accepted"
                        );
                        return Ok(result);
                    }
                    AttemptOutcome::Rejected => {
                        tracing::debug!(attempt = attempt + 1, "Attempt rejected");
                    }
                }
            }

            tracing::warn!(attempts = max_retries, "Retry budget exhausted");
            Err(AgentError::GenerationFailed(
                "no novel idea generated".to_string(),
            ))
        }
        .instrument(span)
        .await
    }

    /// Runs one mine, compose, judge pass. Only a mining failure is an error.
    async fn run_attempt(
        &self,
        topic: &str,
        wildness: i32,
        is_last: bool,
        status: Option<&StatusCallback>,
    ) -> AgentResult<AttemptOutcome> {
        emit(status, PipelineStage::Mining);
        let assumptions = self
            .stages
            .miner
            .mine_assumptions(topic)
            .await
            .map_err(|e| AgentError::GenerationFailed(format!("assumption mining failed: {}", e)))?;

        let Some(assumption) = pick_assumption(&assumptions) else {
            tracing::warn!("Miner returned no assumptions");
            return Ok(AttemptOutcome::Rejected);
        };

        emit(status, PipelineStage::Composing);
        let raw_idea = match self
            .stages
            .composer
            .compose_idea(topic, &assumption, wildness)
            .await
        {
            Ok(idea) => idea,
            Err(e) => {
                tracing::warn!(error = %e, "Composition failed");
                return Ok(AttemptOutcome::Rejected);
            }
        };

        emit(status, PipelineStage::CoherenceCheck);
        let coherence = self.stages.coherence.is_coherent(&raw_idea).await;
        if coherence < self.config.coherence_threshold {
            tracing::debug!(coherence, "Coherence gate rejected idea");
            emit(status, PipelineStage::Refining);
            return Ok(AttemptOutcome::Rejected);
        }

        emit(status, PipelineStage::NoveltyCheck);
        let novelty = self.stages.novelty.score_novelty(&raw_idea).await;
        if novelty < self.config.novelty_threshold && !is_last {
            tracing::debug!(novelty, "Novelty gate rejected idea");
            return Ok(AttemptOutcome::Rejected);
        }

        emit(status, PipelineStage::Polishing);
        let idea = self.stages.rewriter.safe_rewrite(&raw_idea).await;

        Ok(AttemptOutcome::Accepted(IdeaResult {
            idea,
            novelty,
            coherence,
            version: self.config.version.clone(),
        }))
    }
}

fn emit(status: Option<&StatusCallback>, stage: PipelineStage) {
    if let Some(callback) = status {
        callback(stage.status_message());
    }
}

/// Picks one assumption uniformly at random.
fn pick_assumption(assumptions: &[String]) -> Option<String> {
    use rand::seq::IndexedRandom;

    assumptions.choose(&mut rand::rng()).cloned()
}
