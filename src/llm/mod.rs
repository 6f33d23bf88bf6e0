//! LLM integration for idea-forge.
//!
//! Every pipeline stage issues exactly one chat-completions request through
//! the [`LlmProvider`] trait. The production implementation is
//! [`LiteLlmClient`]; tests substitute in-memory providers.
//!
//! ```ignore
//! use idea_forge::config::Settings;
//! use idea_forge::llm::{GenerationRequest, LiteLlmClient, LlmProvider, Message};
//!
//! let settings = Settings::from_env()?;
//! let client = LiteLlmClient::from_settings(&settings)?;
//! let request = GenerationRequest::new("", vec![Message::user("Hello")]);
//! let response = client.generate(request).await?;
//! ```

pub mod litellm;

pub use litellm::{
    Choice, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider, Message, Usage,
};
