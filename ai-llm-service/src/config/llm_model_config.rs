use crate::config::llm_provider::LlmProvider;

/// Configuration for one model endpoint.
///
/// # Fields
///
/// - `provider`: which backend serves the model.
/// - `model`: the model identifier (e.g., `"gpt-4o-mini"`, `"text-embedding-3-small"`).
/// - `endpoint`: base URL of the API, without the `/v1/...` path.
/// - `api_key`: bearer token for providers that require authentication.
/// - `max_tokens`: generation cap (chat only).
/// - `temperature`: sampling temperature (chat only).
/// - `timeout_secs`: per-request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-4o-mini".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: None,
///     temperature: Some(0.5),
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.timeout().as_secs(), 60);
/// ```
#[derive(Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

/// Timeout used when a config leaves `timeout_secs` unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

impl LlmModelConfig {
    /// Effective request timeout.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for LlmModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
