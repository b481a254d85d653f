//! Default model configs loaded strictly from environment variables.
//!
//! Two roles are supported:
//!
//! - **Chat**      → OpenAI-compatible chat completions
//! - **Embedding** → OpenAI embeddings or a local Ollama embedding model
//!
//! # Environment variables
//!
//! Common:
//! - `OPENAI_API_KEY`   = credential (mandatory for every OpenAI call)
//! - `OPENAI_BASE_URL`  = API base URL (default `https://api.openai.com`)
//! - `LLM_TIMEOUT_SECS` = per-request timeout (default 60)
//!
//! Chat:
//! - `CHAT_MODEL`       = model (default `gpt-4o-mini`)
//! - `CHAT_TEMPERATURE` = sampling temperature in `0.0..=2.0` (default 0.5)
//! - `LLM_MAX_TOKENS`   = optional generation cap (u32)
//!
//! Embedding:
//! - `EMBEDDING_KIND`   = `openai` (default) or `ollama`
//! - `EMBEDDING_MODEL`  = model (default depends on kind)
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory for `ollama`)

use crate::{
    config::{
        env_source::EnvSource, llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
    },
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_parse, env_opt_u32, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "all-minilm";

/// Name of the credential variable. Checked before anything else at startup.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

fn openai_base_url(env: &dyn EnvSource) -> Result<String, AiLlmError> {
    let url = env_opt(env, "OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into());
    validate_http_endpoint("OPENAI_BASE_URL", url.trim())?;
    Ok(url.trim().to_string())
}

fn timeout_secs(env: &dyn EnvSource) -> Result<Option<u64>, AiLlmError> {
    env_opt_parse::<u64>(env, "LLM_TIMEOUT_SECS", "expected whole seconds (u64)")
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint(env: &dyn EnvSource) -> Result<String, AiLlmError> {
    if let Some(url) = env_opt(env, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", url.trim())?;
        return Ok(url.trim().to_string());
    }
    if let Some(port) = env_opt(env, "OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Constructs the config for the **chat** model.
///
/// # Errors
/// Missing credential, malformed numbers, out-of-range temperature, or a
/// base URL without an http(s) scheme.
pub fn config_openai_chat(env: &dyn EnvSource) -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env(env, API_KEY_VAR)?;
    let endpoint = openai_base_url(env)?;
    let model = env_opt(env, "CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.into());
    let temperature = env_opt_parse::<f32>(env, "CHAT_TEMPERATURE", "expected a decimal number")?
        .unwrap_or(DEFAULT_CHAT_TEMPERATURE);
    validate_range_f32("CHAT_TEMPERATURE", temperature, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: model.trim().to_string(),
        endpoint,
        api_key: Some(api_key),
        max_tokens: env_opt_u32(env, "LLM_MAX_TOKENS")?,
        temperature: Some(temperature),
        timeout_secs: timeout_secs(env)?,
    })
}

/// Constructs the config for the **embedding** model.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `EMBEDDING_KIND`
/// - missing credential (OpenAI) or endpoint (Ollama)
pub fn config_embedding(env: &dyn EnvSource) -> Result<LlmModelConfig, AiLlmError> {
    let provider = match env_opt(env, "EMBEDDING_KIND") {
        None => LlmProvider::OpenAI,
        Some(kind) => LlmProvider::parse(&kind).ok_or(ConfigError::UnsupportedProvider(kind))?,
    };
    let timeout_secs = timeout_secs(env)?;

    match provider {
        LlmProvider::OpenAI => Ok(LlmModelConfig {
            provider,
            model: env_opt(env, "EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_EMBEDDING_MODEL.into()),
            endpoint: openai_base_url(env)?,
            api_key: Some(must_env(env, API_KEY_VAR)?),
            max_tokens: None,
            temperature: None,
            timeout_secs,
        }),
        LlmProvider::Ollama => Ok(LlmModelConfig {
            provider,
            model: env_opt(env, "EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_EMBEDDING_MODEL.into()),
            endpoint: ollama_endpoint(env)?,
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_secs,
        }),
    }
}
