//! Process-wide configuration loaded from the environment.
//!
//! Settings are read once at startup and shared read-only afterwards. A
//! missing API key is fatal here rather than surfacing per request.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Model used by every stage unless overridden.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// The rewriter only cleans grammar, so a lighter model is enough.
pub const DEFAULT_REWRITER_MODEL: &str = "gemini-2.0-flash-lite";

/// Per-call timeout applied to every LLM request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Model identifiers for each pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageModels {
    pub default: String,
    pub miner: String,
    pub composer: String,
    pub judge: String,
    pub rewriter: String,
}

impl Default for StageModels {
    fn default() -> Self {
        Self {
            default: DEFAULT_MODEL.to_string(),
            miner: DEFAULT_MODEL.to_string(),
            composer: DEFAULT_MODEL.to_string(),
            judge: DEFAULT_MODEL.to_string(),
            rewriter: DEFAULT_REWRITER_MODEL.to_string(),
        }
    }
}

/// Loaded runtime settings.
#[derive(Clone)]
pub struct Settings {
    pub api_base: String,
    pub api_key: String,
    pub models: StageModels,
    pub timeout: Duration,
    /// Version string stamped on every returned idea.
    pub version: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .field("version", &self.version)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first if present.
    ///
    /// Recognised variables:
    /// - `GEMINI_API_KEY`, `GOOGLE_API_KEY` or `LLM_API_KEY` (required, first set wins)
    /// - `LLM_API_BASE` (default: Gemini OpenAI-compatible endpoint)
    /// - `LLM_MODEL`, `MINER_MODEL`, `COMPOSER_MODEL`, `JUDGE_MODEL`, `REWRITER_MODEL`
    /// - `LLM_TIMEOUT_SECS` (default: 30)
    /// - `IDEA_VERSION` (default: the crate version)
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal in deployed environments.
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars())
    }

    /// Build settings from an explicit set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        let get = |name: &str| vars.get(name).map(|v| v.trim().to_string());

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("GOOGLE_API_KEY"))
            .or_else(|| get("LLM_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let default_model = get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let models = StageModels {
            miner: get("MINER_MODEL").unwrap_or_else(|| default_model.clone()),
            composer: get("COMPOSER_MODEL").unwrap_or_else(|| default_model.clone()),
            judge: get("JUDGE_MODEL").unwrap_or_else(|| default_model.clone()),
            rewriter: get("REWRITER_MODEL").unwrap_or_else(|| DEFAULT_REWRITER_MODEL.to_string()),
            default: default_model,
        };

        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidValue {
                        name: "LLM_TIMEOUT_SECS".to_string(),
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        name: "LLM_TIMEOUT_SECS".to_string(),
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base: get("LLM_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key,
            models,
            timeout: Duration::from_secs(timeout_secs),
            version: get("IDEA_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        })
    }
}
