//! # Foresight Models
//!
//! Centralized LLM configuration types shared by the analyst skills and
//! the pipeline runner.

use serde::{Deserialize, Serialize};

/// Supported LLM providers
///
/// Each provider loads its credential from a well-known environment
/// variable (see [`LlmProvider::api_key_env`]). An OpenAI-compatible
/// endpoint such as a local Ollama server is reached by selecting the
/// OpenAI provider and setting a base URL override.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    OpenRouter,
    Grok,
    DeepSeek,
}

impl LlmProvider {
    /// Get all available providers
    pub fn all() -> Vec<LlmProvider> {
        vec![
            LlmProvider::Anthropic,
            LlmProvider::OpenAI,
            LlmProvider::Gemini,
            LlmProvider::OpenRouter,
            LlmProvider::Grok,
            LlmProvider::DeepSeek,
        ]
    }

    /// Parse a provider id as it appears in configuration ("anthropic", "openai", ...)
    pub fn parse(id: &str) -> Option<LlmProvider> {
        match id.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Some(LlmProvider::Anthropic),
            "openai" => Some(LlmProvider::OpenAI),
            "gemini" => Some(LlmProvider::Gemini),
            "openrouter" => Some(LlmProvider::OpenRouter),
            "grok" => Some(LlmProvider::Grok),
            "deepseek" => Some(LlmProvider::DeepSeek),
            _ => None,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Grok => "Grok",
            LlmProvider::DeepSeek => "DeepSeek",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
            LlmProvider::Grok => "XAI_API_KEY",
            LlmProvider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Default model when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::Gemini => "gemini-2.0-flash-exp",
            LlmProvider::OpenRouter => "anthropic/claude-3.5-sonnet",
            LlmProvider::Grok => "grok-2",
            LlmProvider::DeepSeek => "deepseek-chat",
        }
    }

    /// Whether this provider supports custom base URL
    pub fn supports_base_url(&self) -> bool {
        matches!(self, LlmProvider::OpenAI)
    }
}

/// Configuration for LLM model selection
///
/// Used by every analyst skill to decide which provider and model backs
/// its calls. Resolved from the environment at startup; per-analyst
/// overrides are applied by the runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// LLM provider to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g., "claude-sonnet-4-20250514", "gpt-4o")
    pub model: String,
    /// Optional base URL override for OpenAI-compatible APIs (e.g. Ollama)
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let provider = LlmProvider::default();
        Self {
            model: provider.default_model().to_string(),
            provider,
            base_url: None,
        }
    }
}

impl ModelConfig {
    /// Create a new model config with the default provider
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::default(),
            model: model.into(),
            base_url: None,
        }
    }

    /// Create config for a specific provider
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
        }
    }

    /// Set base URL (for OpenAI-compatible endpoints)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Resolve the model configuration from the process environment.
    ///
    /// Reads `FORESIGHT_PROVIDER`, `FORESIGHT_MODEL` and
    /// `FORESIGHT_BASE_URL`; unset variables fall back to the provider
    /// defaults. An unrecognized provider id falls back to the default
    /// provider with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let provider = match get("FORESIGHT_PROVIDER") {
            Some(id) => LlmProvider::parse(&id).unwrap_or_else(|| {
                tracing::warn!(provider = %id, "unknown FORESIGHT_PROVIDER, using default");
                LlmProvider::default()
            }),
            None => LlmProvider::default(),
        };
        let model = get("FORESIGHT_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let base_url = get("FORESIGHT_BASE_URL").filter(|url| !url.is_empty());
        Self {
            provider,
            model,
            base_url,
        }
    }
}
