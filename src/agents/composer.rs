//! Idea Composer Agent.
//!
//! Inverts one assumption about a topic and writes a short speculative
//! paragraph about the result. The user's "wildness" knob maps directly onto
//! the sampling temperature.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{GenerationRequest, LlmProvider, Message};

use super::error::{AgentError, AgentResult};
use super::stages::IdeaComposer;

/// System prompt describing the paragraph structure and style.
const COMPOSER_SYSTEM_PROMPT: &str = r#"You are an avant-garde science writer.
Output a single paragraph of 80-120 words at an 11th-grade reading level (Flesch reading ease 50-60).

Structure:
1. Begin with "Current view:" followed by a three-item, comma-separated list of accepted premises about the topic.
2. Continue with a sentence starting "What if instead..." that flips the supplied assumption.
3. Explain the speculative mechanism in vivid but precise language. No mystical terms, and avoid jargon longer than three syllables unless unavoidable.
4. End with a concise consequence beginning "This would mean...".

Never repeat a clause. Avoid science-fiction cliches (wormholes, simulations, parallel universes, ancient aliens)."#;

/// User prompt template for composition.
const COMPOSER_USER_TEMPLATE: &str = "Topic: {topic}\nAssumption to flip: {assumption}\n\nParagraph:";

/// Highest accepted wildness value.
pub const MAX_WILDNESS: i32 = 100;

/// Temperature reached at maximum wildness.
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Maps wildness to a sampling temperature: `clamp(w, 0, 100) / 100 * 2.0`.
pub fn wildness_to_temperature(wildness: i32) -> f64 {
    let clamped = wildness.clamp(0, MAX_WILDNESS);
    f64::from(clamped) / f64::from(MAX_WILDNESS) * MAX_TEMPERATURE
}

/// Configuration for the Composer Agent.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Model identifier; empty uses the client default.
    pub model: String,
    /// Nucleus sampling parameter.
    pub top_p: f64,
    /// Cap on response tokens. `None` sends no cap, leaving room for
    /// the reasoning tokens thinking models bill against the same budget.
    pub max_tokens: Option<u32>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            top_p: 0.95,
            max_tokens: None,
        }
    }
}

impl ComposerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

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

    /// Sets the top_p parameter.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p.clamp(0.0, 1.0);
        self
    }
}

/// Idea Composer Agent backed by an LLM.
pub struct ComposerAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: ComposerConfig,
}

impl std::fmt::Debug for ComposerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposerAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ComposerAgent {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "idea_composer";

    /// Creates a new composer agent with the given LLM client and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: ComposerConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new composer agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, ComposerConfig::default())
    }

    /// Builds the user prompt for composition.
    fn build_prompt(topic: &str, assumption: &str) -> String {
        COMPOSER_USER_TEMPLATE
            .replace("{topic}", topic)
            .replace("{assumption}", assumption)
    }

    /// Returns the agent configuration.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }
}

#[async_trait]
impl IdeaComposer for ComposerAgent {
    async fn compose_idea(
        &self,
        topic: &str,
        assumption: &str,
        wildness: i32,
    ) -> AgentResult<String> {
        let temperature = wildness_to_temperature(wildness);
        let prompt = Self::build_prompt(topic, assumption);

        tracing::debug!(
            agent = Self::AGENT_NAME,
            topic,
            assumption,
            wildness,
            temperature,
            "Composing idea"
        );

        let mut request = GenerationRequest::new(
            self.config.model.clone(),
            vec![Message::system(COMPOSER_SYSTEM_PROMPT), Message::user(prompt)],
        )
        .with_temperature(temperature)
        .with_top_p(self.config.top_p);
        request.max_tokens = self.config.max_tokens;

        let response = self
            .llm_client
            .generate(request)
            .await
            .map_err(|e| AgentError::CompositionFailed(e.to_string()))?;

        let idea = response.first_content().map(str::trim).unwrap_or_default();
        if idea.is_empty() {
            return Err(AgentError::CompositionFailed(
                "Empty LLM response".to_string(),
            ));
        }

        Ok(idea.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::MockLlmProvider;

    #[test]
    fn test_wildness_maps_linearly() {
        assert_eq!(wildness_to_temperature(0), 0.0);
        assert_eq!(wildness_to_temperature(50), 1.0);
        assert_eq!(wildness_to_temperature(100), 2.0);
        for w in 0..=100 {
            let expected = f64::from(w) / 100.0 * 2.0;
            assert!((wildness_to_temperature(w) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wildness_is_clamped() {
        assert_eq!(wildness_to_temperature(150), wildness_to_temperature(100));
        assert_eq!(wildness_to_temperature(-20), 0.0);
        assert_eq!(wildness_to_temperature(i32::MAX), 2.0);
    }

    #[tokio::test]
    async fn test_compose_idea_request_and_trim() {
        let mock = Arc::new(MockLlmProvider::new("  Current view: a, b, c. What if instead...  \n"));
        let agent = ComposerAgent::new(mock.clone(), ComposerConfig::new().with_model("writer"));

        let idea = agent
            .compose_idea("gravity", "Mass attracts mass", 150)
            .await
            .expect("composed");
        assert_eq!(idea, "Current view: a, b, c. What if instead...");

        let requests = mock.requests();
        assert_eq!(requests[0].model, "writer");
        assert_eq!(requests[0].temperature, Some(2.0));
        assert_eq!(requests[0].top_p, Some(0.95));
        assert!(requests[0].messages[0].content.contains("What if instead"));
        assert_eq!(
            requests[0].messages[1].content,
            "Topic: gravity\nAssumption to flip: Mass attracts mass\n\nParagraph:"
        );
    }

    #[tokio::test]
    async fn test_compose_idea_empty_reply_fails() {
        let agent = ComposerAgent::with_defaults(Arc::new(MockLlmProvider::new("   ")));
        let err = agent
            .compose_idea("gravity", "x", 50)
            .await
            .expect_err("empty reply");
        assert!(matches!(err, AgentError::CompositionFailed(_)));
    }

    #[tokio::test]
    async fn test_compose_idea_transport_error_fails() {
        let agent = ComposerAgent::with_defaults(Arc::new(MockLlmProvider::failing("timeout")));
        let err = agent
            .compose_idea("gravity", "x", 50)
            .await
            .expect_err("transport error");
        assert!(matches!(err, AgentError::CompositionFailed(ref m) if m.contains("timeout")));
    }

    #[tokio::test]
    async fn test_sampling_overrides_forwarded() {
        let mock = Arc::new(MockLlmProvider::new("Current view: x. What if instead y?"));
        let config = ComposerConfig::new().with_top_p(1.7).with_max_tokens(4000);
        let agent = ComposerAgent::new(mock.clone(), config);
        assert_eq!(agent.config().top_p, 1.0);

        agent.compose_idea("gravity", "x", 0).await.expect("composed");
        let requests = mock.requests();
        assert_eq!(requests[0].top_p, Some(1.0));
        assert_eq!(requests[0].max_tokens, Some(4000));
        assert_eq!(requests[0].temperature, Some(0.0));
    }
}
