//! In-memory LLM providers shared by the agent unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::StageModels;
use crate::error::LlmError;
use crate::llm::{Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, Usage};

/// Mock provider that replays scripted replies and records every request.
///
/// When the script runs out, the last reply is repeated.
pub struct MockLlmProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockLlmProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(response.into())])
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted(vec![Err(message.into())])
    }

    pub fn scripted(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("lock not poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("lock not poisoned").len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.requests
            .lock()
            .expect("lock not poisoned")
            .push(request);

        let next = self.replies.lock().expect("lock not poisoned").pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().expect("lock not poisoned") = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .expect("lock not poisoned")
                .clone()
                .unwrap_or_else(|| Err("no scripted reply".to_string())),
        };

        let content = reply.map_err(LlmError::RequestFailed)?;
        Ok(GenerationResponse {
            id: "mock-id".to_string(),
            model: "mock-model".to_string(),
            choices: vec![Choice {
                index: 0,
                message: Message::assistant(content),
                finish_reason: "stop".to_string(),
            }],
            usage: Usage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            },
        })
    }
}

/// Polished text returned by [`StageRoutingProvider`] for the rewriter model.
pub const ROUTED_POLISHED: &str = "Polished: gravity is a slowly fading habit of matter.";

/// Stage models recognised by [`StageRoutingProvider`].
pub fn routing_models() -> StageModels {
    StageModels {
        default: "unused".to_string(),
        miner: "miner".to_string(),
        composer: "composer".to_string(),
        judge: "judge".to_string(),
        rewriter: "rewriter".to_string(),
    }
}

/// Answers each stage with a canned reply, routed by model and system prompt.
pub struct StageRoutingProvider {
    coherence: String,
    novelty: String,
}

impl StageRoutingProvider {
    pub fn new(coherence: impl Into<String>, novelty: impl Into<String>) -> Self {
        Self {
            coherence: coherence.into(),
            novelty: novelty.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for StageRoutingProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let system = request
            .messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let reply = match request.model.as_str() {
            "miner" => r#"["Mass attracts mass", "Gravity is constant"]"#.to_string(),
            "composer" => "Current view: mass attracts, orbits hold, things fall. What if instead gravity were a habit that matter slowly forgets?".to_string(),
            "judge" if system.contains("cliche") => self.novelty.clone(),
            "judge" => self.coherence.clone(),
            "rewriter" => ROUTED_POLISHED.to_string(),
            other => return Err(LlmError::RequestFailed(format!("unexpected model {}", other))),
        };
        Ok(GenerationResponse {
            id: "routed".to_string(),
            model: request.model,
            choices: vec![Choice {
                index: 0,
                message: Message::assistant(reply),
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::default(),
        })
    }
}
