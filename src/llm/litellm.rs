//! OpenAI-compatible chat-completions client for idea-forge.
//!
//! Every pipeline stage talks to its model through [`LlmProvider`]; the
//! concrete [`LiteLlmClient`] speaks the `/chat/completions` dialect that
//! LiteLLM, OpenRouter and Gemini's OpenAI endpoint all accept.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;
use crate::error::LlmError;

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (e.g., "system", "user", "assistant").
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request for text generation from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier to use for generation. Empty means the client default.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Sampling temperature (0.0 - 2.0). Higher values = more random.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling parameter (0.0 - 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl GenerationRequest {
    /// Create a new generation request with default parameters.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            top_p: None,
        }
    }

    /// Set the temperature for this request.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens for this request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the top_p for this request.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Unique identifier for this response.
    pub id: String,
    /// Model that generated this response.
    pub model: String,
    /// Generated choices/completions.
    pub choices: Vec<Choice>,
    /// Token usage statistics.
    pub usage: Usage,
}

impl GenerationResponse {
    /// Get the content of the first choice, if available.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// A single generated choice from the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Index of this choice in the response.
    pub index: u32,
    /// Generated message.
    pub message: Message,
    /// Reason the generation stopped (e.g., "stop", "length").
    pub finish_reason: String,
}

/// Token usage statistics for a generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,
    /// Number of tokens generated.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// Trait for LLM providers that can generate text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a response for the given request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

/// Client for OpenAI-compatible chat-completions APIs.
pub struct LiteLlmClient {
    /// Base URL for the API.
    api_base: String,
    /// Optional API key for authentication.
    api_key: Option<String>,
    /// Default model to use for requests.
    default_model: String,
    /// Per-request timeout, also reported in [`LlmError::Timeout`].
    timeout: Duration,
    /// HTTP client for making API requests.
    http_client: Client,
}

impl std::fmt::Debug for LiteLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiteLlmClient")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LiteLlmClient {
    /// Create a new client with explicit configuration.
    ///
    /// # Arguments
    ///
    /// * `api_base` - Base URL of the API (e.g., "http://localhost:4000")
    /// * `api_key` - Optional API key for bearer authentication
    /// * `default_model` - Model used when a request leaves `model` empty
    /// * `timeout` - Upper bound for each request, connect through body
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            default_model: default_model.into(),
            timeout,
            http_client,
        })
    }

    /// Create a client from loaded [`Settings`].
    ///
    /// The default model is the general `LLM_MODEL`; stages override it per
    /// request with their own configured model.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        Self::new(
            settings.api_base.clone(),
            Some(settings.api_key.clone()),
            settings.models.default.clone(),
            settings.timeout,
        )
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Get the default model.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Check if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// List the model identifiers the endpoint advertises.
    ///
    /// Uses the OpenAI-compatible `GET /models` route.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/models", self.api_base);

        let mut http_request = self.http_client.get(&url);
        if let Some(ref api_key) = self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {}", api_key));
        }

        let http_response = http_request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = http_response.status();
        if !status.is_success() {
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(api_error(status.as_u16(), error_text));
        }

        let listing: ModelListResponse = http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse model list: {}", e)))?;

        Ok(listing.data.into_iter().map(|m| m.id).collect())
    }

    fn map_send_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}

/// Internal request structure for the OpenAI-compatible API.
#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

/// Internal response structure from the OpenAI-compatible API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

/// Internal choice structure from the API response.
#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    index: u32,
    message: ApiMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Internal message structure from the API response.
///
/// Some gateways send `content: null` for filtered completions.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// Internal usage structure from the API response.
#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Error response from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// Error detail from the API.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // Fields kept for complete API error deserialization
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<serde_json::Value>,
}

/// `GET /models` listing.
#[derive(Debug, Deserialize)]
struct ModelListResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Maps a non-success status and body to the matching [`LlmError`].
fn api_error(status_code: u16, error_text: String) -> LlmError {
    // Gemini's OpenAI endpoint wraps errors in a one-element array.
    let structured = serde_json::from_str::<ApiErrorResponse>(&error_text)
        .or_else(|_| {
            serde_json::from_str::<Vec<ApiErrorResponse>>(&error_text)
                .map_err(|_| ())
                .and_then(|v| v.into_iter().next().ok_or(()))
        })
        .ok();

    let message = structured
        .map(|response| response.error.message)
        .unwrap_or(error_text);

    if status_code == 429 {
        return LlmError::RateLimited(message);
    }

    LlmError::ApiError {
        code: status_code,
        message,
    }
}

#[async_trait]
impl LlmProvider for LiteLlmClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let api_request = ApiRequest {
            model: model.clone(),
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
        };

        let url = format!("{}/chat/completions", self.api_base);

        let mut http_request = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-Title", "idea-forge");

        if let Some(ref api_key) = self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {}", api_key));
        }

        tracing::debug!(model = %model, url = %url, "Sending chat completion request");

        let http_response = http_request
            .json(&api_request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = http_response.status();

        if !status.is_success() {
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(api_error(status.as_u16(), error_text));
        }

        let api_response: ApiResponse = http_response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                LlmError::ParseError(format!("Failed to parse API response: {}", e))
            }
        })?;

        let choices = api_response
            .choices
            .into_iter()
            .map(|choice| Choice {
                index: choice.index,
                message: Message {
                    role: choice.message.role,
                    content: choice.message.content.unwrap_or_default(),
                },
                finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            })
            .collect();

        let usage = api_response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(GenerationResponse {
            id: api_response.id,
            model: if api_response.model.is_empty() {
                model
            } else {
                api_response.model
            },
            choices,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_client() -> LiteLlmClient {
        LiteLlmClient::new(
            "http://localhost:65535",
            None,
            "gemini-2.5-flash",
            Duration::from_secs(2),
        )
        .expect("client should build")
    }

    #[test]
    fn test_message_constructors() {
        let system = Message::system("You are helpful.");
        assert_eq!(system.role, "system");
        assert_eq!(system.content, "You are helpful.");

        let user = Message::user("Hello");
        assert_eq!(user.role, "user");

        let assistant = Message::assistant("Hi there!");
        assert_eq!(assistant.role, "assistant");
        assert_eq!(assistant.content, "Hi there!");
    }

    #[test]
    fn test_generation_request_builder() {
        let request = GenerationRequest::new("gemini-2.5-flash", vec![Message::user("test")])
            .with_temperature(1.3)
            .with_max_tokens(400)
            .with_top_p(0.95);

        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.temperature, Some(1.3));
        assert_eq!(request.max_tokens, Some(400));
        assert_eq!(request.top_p, Some(0.95));
    }

    #[test]
    fn test_generation_response_first_content() {
        let response = GenerationResponse {
            id: "test-id".to_string(),
            model: "gemini-2.5-flash".to_string(),
            choices: vec![Choice {
                index: 0,
                message: Message::assistant("0.8"),
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::default(),
        };
        assert_eq!(response.first_content(), Some("0.8"));

        let empty_response = GenerationResponse {
            id: "test-id".to_string(),
            model: "gemini-2.5-flash".to_string(),
            choices: vec![],
            usage: Usage::default(),
        };
        assert_eq!(empty_response.first_content(), None);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = LiteLlmClient::new(
            "https://example.test/v1/",
            Some("key".to_string()),
            "m",
            Duration::from_secs(30),
        )
        .expect("client should build");

        assert_eq!(client.api_base(), "https://example.test/v1");
        assert_eq!(client.default_model(), "m");
        assert!(client.has_api_key());
    }

    #[test]
    fn test_client_without_key() {
        assert!(!local_client().has_api_key());
    }

    #[tokio::test]
    async fn test_generate_connection_error() {
        let client = local_client();
        let request = GenerationRequest::new("", vec![Message::user("test")]);

        let err = client
            .generate(request)
            .await
            .expect_err("no server is listening");
        assert!(matches!(
            err,
            LlmError::RequestFailed(_) | LlmError::Timeout { .. }
        ));
    }

    #[test]
    fn test_api_request_serialization() {
        let request = ApiRequest {
            model: "gemini-2.5-flash".to_string(),
            messages: vec![Message::user("test")],
            temperature: Some(0.0),
            max_tokens: None,
            top_p: None,
        };

        let json = serde_json::to_string(&request).expect("serialization should succeed");
        assert!(json.contains("\"model\":\"gemini-2.5-flash\""));
        assert!(json.contains("\"temperature\":0.0"));
        assert!(!json.contains("max_tokens"));
        assert!(!json.contains("top_p"));
    }

    #[test]
    fn test_api_response_tolerates_null_content_and_missing_usage() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(body).expect("should parse");
        assert!(parsed.usage.is_none());
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_api_error_mapping() {
        let err = api_error(429, r#"{"error":{"message":"slow down"}}"#.to_string());
        assert!(matches!(err, LlmError::RateLimited(ref m) if m == "slow down"));

        let err = api_error(
            400,
            r#"[{"error":{"code":400,"message":"bad key","status":"INVALID_ARGUMENT"}}]"#
                .to_string(),
        );
        assert!(matches!(err, LlmError::ApiError { code: 400, ref message } if message == "bad key"));

        let err = api_error(502, "upstream gone".to_string());
        assert!(matches!(err, LlmError::ApiError { code: 502, ref message } if message == "upstream gone"));
    }
}
