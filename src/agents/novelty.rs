//! Novelty Judge Agent.
//!
//! Rates how unprecedented an idea is. Unlike the coherence judge, failures
//! here are absorbed into a neutral score instead of sinking the attempt.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{GenerationRequest, LlmProvider, Message};

use super::scoring::parse_unit_score;
use super::stages::NoveltyJudge;

/// System prompt with the novelty rubric.
const NOVELTY_SYSTEM_PROMPT: &str = r#"You judge how unprecedented an idea is compared with existing common knowledge, popular science and well-worn fiction tropes.

Rubric:
0   = a reshuffled cliche; the idea or something very close is widely known
0.5 = a fresh angle on a familiar idea
1   = a genuinely new thought that you have never encountered in any form

Reply with exactly one decimal number between 0 and 1 and nothing else."#;

/// Score used when the judge call fails or its reply has no number.
pub const FALLBACK_SCORE: f64 = 0.5;

/// Configuration for the Novelty Judge.
#[derive(Debug, Clone)]
pub struct NoveltyConfig {
    /// Model identifier; empty uses the client default.
    pub model: String,
    /// Cap on response tokens. `None` sends no cap, leaving room for
    /// the reasoning tokens thinking models bill against the same budget.
    pub max_tokens: Option<u32>,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: None,
        }
    }
}

impl NoveltyConfig {
    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Caps the response length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// LLM-backed novelty judge.
pub struct NoveltyJudgeAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: NoveltyConfig,
}

impl NoveltyJudgeAgent {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "novelty_judge";

    pub fn new(llm_client: Arc<dyn LlmProvider>, config: NoveltyConfig) -> Self {
        Self { llm_client, config }
    }

    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, NoveltyConfig::default())
    }
}

#[async_trait]
impl NoveltyJudge for NoveltyJudgeAgent {
    async fn score_novelty(&self, text: &str) -> f64 {
        let mut request = GenerationRequest::new(
            self.config.model.clone(),
            vec![Message::system(NOVELTY_SYSTEM_PROMPT), Message::user(text)],
        )
        .with_temperature(0.0);
        request.max_tokens = self.config.max_tokens;

        match self.llm_client.generate(request).await {
            Ok(response) => {
                let reply = response.first_content().unwrap_or_default();
                parse_unit_score(reply).unwrap_or_else(|| {
                    tracing::warn!(
                        agent = Self::AGENT_NAME,
                        reply,
                        "Novelty judge reply had no score, using fallback"
                    );
                    FALLBACK_SCORE
                })
            }
            Err(e) => {
                tracing::warn!(
                    agent = Self::AGENT_NAME,
                    error = %e,
                    "Novelty judge call failed, using fallback"
                );
                FALLBACK_SCORE
            }
        }
    }
}
