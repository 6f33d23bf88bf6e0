//! Coherence Judge Agent.
//!
//! Rates how internally consistent an idea paragraph is. Cheap local checks
//! run first so obviously broken text never costs an API call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{GenerationRequest, LlmProvider, Message};

use super::scoring::parse_unit_score;
use super::stages::CoherenceJudge;

/// System prompt with the coherence rubric.
const COHERENCE_SYSTEM_PROMPT: &str = r#"You are a strict editor judging the internal logical consistency of a speculative paragraph. Do not judge whether it is true, only whether it hangs together.

Rubric:
0   = incoherent or self-contradictory
0.5 = readable, but with logical gaps or unsupported leaps
1   = fully coherent; every step follows from the previous one

Reply with exactly one decimal number between 0 and 1 and nothing else."#;

/// Texts shorter than this many words score 0.0 without a judge call.
pub const MIN_WORD_COUNT: usize = 10;

/// Score for text that is too short to judge.
pub const TOO_SHORT_SCORE: f64 = 0.0;

/// Score for text that does not end a sentence.
pub const UNTERMINATED_SCORE: f64 = 0.1;

/// Score used when the judge call fails or its reply has no number.
pub const FAILURE_SCORE: f64 = 0.0;

/// Local pre-filter. Returns a score when the text can be rejected without
/// asking the judge.
pub fn prefilter(text: &str) -> Option<f64> {
    if text.split_whitespace().count() < MIN_WORD_COUNT {
        return Some(TOO_SHORT_SCORE);
    }
    if !text.trim_end().ends_with(['.', '?', '!']) {
        return Some(UNTERMINATED_SCORE);
    }
    None
}

/// Configuration for the Coherence Judge.
#[derive(Debug, Clone)]
pub struct CoherenceConfig {
    /// Model identifier; empty uses the client default.
    pub model: String,
    /// Cap on response tokens. `None` sends no cap, leaving room for
    /// the reasoning tokens thinking models bill against the same budget.
    pub max_tokens: Option<u32>,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: None,
        }
    }
}

impl CoherenceConfig {
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

/// LLM-backed coherence judge.
pub struct CoherenceJudgeAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: CoherenceConfig,
}

impl CoherenceJudgeAgent {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "coherence_judge";

    pub fn new(llm_client: Arc<dyn LlmProvider>, config: CoherenceConfig) -> Self {
        Self { llm_client, config }
    }

    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, CoherenceConfig::default())
    }
}

#[async_trait]
impl CoherenceJudge for CoherenceJudgeAgent {
    async fn is_coherent(&self, text: &str) -> f64 {
        if let Some(score) = prefilter(text) {
            tracing::debug!(
                agent = Self::AGENT_NAME,
                score,
                "Coherence decided by local pre-filter"
            );
            return score;
        }

        let mut request = GenerationRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(COHERENCE_SYSTEM_PROMPT),
                Message::user(text),
            ],
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
                        "Coherence judge reply had no score"
                    );
                    FAILURE_SCORE
                })
            }
            Err(e) => {
                tracing::warn!(agent = Self::AGENT_NAME, error = %e, "Coherence judge call failed");
                FAILURE_SCORE
            }
        }
    }
}
