//! Polish/Safety Rewriter Agent.
//!
//! A clarity edit of the accepted idea. The pass is never gated, so a failed
//! or empty rewrite hands back the original paragraph.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{GenerationRequest, LlmProvider, Message};

use super::stages::IdeaRewriter;

/// System prompt for the clarity edit.
const REWRITER_SYSTEM_PROMPT: &str = r#"You are a clarity editor.
Keep the paragraph's imaginative and technical content intact and do not change its meaning.
Fix grammar and merge redundant or duplicated clauses, but never delete creative or technical wording.
Do not add hedging, disclaimers or commentary.
Target an 11th-grade reading level (Flesch reading ease 50-60).
Output only the edited paragraph."#;

/// User prompt template for the rewrite.
const REWRITER_USER_TEMPLATE: &str = "Paragraph:\n{paragraph}";

/// Configuration for the Rewriter Agent.
#[derive(Debug, Clone)]
pub struct RewriterConfig {
    /// Model identifier; empty uses the client default.
    pub model: String,
    /// Cap on response tokens. `None` sends no cap, leaving room for
    /// the reasoning tokens thinking models bill against the same budget.
    pub max_tokens: Option<u32>,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: None,
        }
    }
}

impl RewriterConfig {
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

/// LLM-backed rewriter.
pub struct RewriterAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: RewriterConfig,
}

impl RewriterAgent {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "safety_rewriter";

    pub fn new(llm_client: Arc<dyn LlmProvider>, config: RewriterConfig) -> Self {
        Self { llm_client, config }
    }

    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, RewriterConfig::default())
    }
}

#[async_trait]
impl IdeaRewriter for RewriterAgent {
    async fn safe_rewrite(&self, text: &str) -> String {
        let mut request = GenerationRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(REWRITER_SYSTEM_PROMPT),
                Message::user(REWRITER_USER_TEMPLATE.replace("{paragraph}", text)),
            ],
        )
        .with_temperature(0.0);
        request.max_tokens = self.config.max_tokens;

        match self.llm_client.generate(request).await {
            Ok(response) => match response.first_content().map(str::trim) {
                Some(polished) if !polished.is_empty() => polished.to_string(),
                _ => {
                    tracing::warn!(
                        agent = Self::AGENT_NAME,
                        "Rewriter returned empty content, keeping original text"
                    );
                    text.trim().to_string()
                }
            },
            Err(e) => {
                tracing::warn!(
                    agent = Self::AGENT_NAME,
                    error = %e,
                    "Rewriter call failed, keeping original text"
                );
                text.trim().to_string()
            }
        }
    }
}
