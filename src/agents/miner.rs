//! Assumption Miner Agent.
//!
//! Asks a low-temperature LLM for the bedrock premises people hold about a
//! topic. These premises are what the composer later inverts.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{GenerationRequest, LlmProvider, Message};

use super::error::AgentResult;
use super::stages::AssumptionMiner;

/// System prompt for assumption mining.
const MINER_SYSTEM_PROMPT: &str = r#"You are the Assumption Miner for a "never-before-thought" idea generator.

Extract the bedrock assumptions people hold about the given topic. Another writer will later invert one of them to produce a radical but internally consistent speculation.

Rules:
- Return 5 to 10 premises as a JSON array of strings.
- Each premise must be 18 words or fewer, with no trailing period.
- Roughly the first half must be widely accepted textbook facts that everyone knows.
- The rest must be subtler axioms that experts take for granted but rarely state: implicit scales, assumed irreversibility, hidden dependencies between concepts.
- Prefer premises whose inversion would be the most surprising yet still coherent.
- No opinions, value judgments or unfalsifiable claims.

Output ONLY the JSON array."#;

/// User prompt template for assumption mining.
const MINER_USER_TEMPLATE: &str = "Topic: {topic}";

/// Configuration for the Miner Agent.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Model identifier; empty uses the client default.
    pub model: String,
    /// Deterministic by default so the premise list is stable.
    pub temperature: f64,
    /// Cap on response tokens. `None` sends no cap, leaving room for
    /// the reasoning tokens thinking models bill against the same budget.
    pub max_tokens: Option<u32>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

impl MinerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum tokens for responses.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// How a miner reply was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAssumptions {
    /// The reply decoded as a JSON array of strings.
    JsonArray(Vec<String>),
    /// The reply was split into non-blank lines.
    Lines(Vec<String>),
}

impl ParsedAssumptions {
    /// Returns the assumptions regardless of how they were parsed.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ParsedAssumptions::JsonArray(items) | ParsedAssumptions::Lines(items) => items,
        }
    }
}

/// Parses a miner reply: JSON array first, newline split otherwise.
///
/// Never fails; an unusable reply yields an empty list.
pub fn parse_assumptions(text: &str) -> ParsedAssumptions {
    let body = strip_code_fence(text.trim());

    if body.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(body) {
            let items = items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            return ParsedAssumptions::JsonArray(items);
        }
    }

    ParsedAssumptions::Lines(
        body.lines()
            .map(strip_list_marker)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Removes a surrounding ```/```json fence if the reply is wrapped in one.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Trims a line and drops a leading bullet or "3." / "3)" numbering.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
    {
        return rest.trim();
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim();
        }
    }

    line
}

/// Assumption Miner Agent backed by an LLM.
pub struct MinerAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: MinerConfig,
}

impl std::fmt::Debug for MinerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinerAgent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MinerAgent {
    /// Agent name constant for identification.
    pub const AGENT_NAME: &'static str = "assumption_miner";

    /// Creates a new miner agent with the given LLM client and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: MinerConfig) -> Self {
        Self { llm_client, config }
    }

    /// Creates a new miner agent with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, MinerConfig::default())
    }

    /// Returns the agent configuration.
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }
}

#[async_trait]
impl AssumptionMiner for MinerAgent {
    async fn mine_assumptions(&self, topic: &str) -> AgentResult<Vec<String>> {
        let mut request = GenerationRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(MINER_SYSTEM_PROMPT),
                Message::user(MINER_USER_TEMPLATE.replace("{topic}", topic)),
            ],
        )
        .with_temperature(self.config.temperature);
        request.max_tokens = self.config.max_tokens;

        let response = self.llm_client.generate(request).await?;
        let content = response.first_content().unwrap_or_default();

        let parsed = parse_assumptions(content);
        if matches!(parsed, ParsedAssumptions::Lines(_)) {
            tracing::debug!(
                agent = Self::AGENT_NAME,
                topic,
                "Miner reply was not a JSON array, fell back to line split"
            );
        }

        let assumptions = parsed.into_vec();
        tracing::debug!(
            agent = Self::AGENT_NAME,
            topic,
            count = assumptions.len(),
            "Mined assumptions"
        );
        Ok(assumptions)
    }
}
