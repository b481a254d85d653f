//! Application configuration read once at startup.
//!
//! Model settings come from [`ai_llm_service::config::default_config`];
//! this module adds the dataset, chunking, retrieval, prompt and retry
//! knobs. Every value has a default except the API credential.

use std::path::PathBuf;
use std::time::Duration;

use ai_llm_service::config::default_config::{self, API_KEY_VAR};
use ai_llm_service::config::env_source::EnvSource;
use ai_llm_service::config::llm_model_config::LlmModelConfig;
use ai_llm_service::error_handler::{env_flag, env_opt, env_opt_parse, must_env};
use qa_session::PipelineConfig;
use rag_index::ChunkConfig;

use crate::error_handler::StartupError;

pub const DEFAULT_DATASET_PATH: &str = "data/website_data.json";
pub const DEFAULT_SITE_NAME: &str = "AT Digital";
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chat: LlmModelConfig,
    pub embedding: LlmModelConfig,
    pub dataset_path: PathBuf,
    pub chunking: ChunkConfig,
    pub top_k: usize,
    pub embedding_batch_size: usize,
    pub site_name: String,
    pub always_answer: bool,
    pub template_file: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

/// Fails unless the API credential is present. Run before anything else.
///
/// # Errors
/// [`StartupError::MissingCredential`].
pub fn check_credential(env: &dyn EnvSource) -> Result<(), StartupError> {
    must_env(env, API_KEY_VAR)
        .map(|_| ())
        .map_err(|_| StartupError::MissingCredential { var: API_KEY_VAR })
}

impl AppConfig {
    /// # Errors
    /// The first missing, malformed or out-of-range variable.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, StartupError> {
        check_credential(env)?;

        let chat = default_config::config_openai_chat(env)?;
        let embedding = default_config::config_embedding(env)?;

        let defaults = ChunkConfig::default();
        let chunking = ChunkConfig {
            chunk_size: env_opt_parse(env, "CHUNK_SIZE", "expected a positive integer")?
                .unwrap_or(defaults.chunk_size),
            overlap: env_opt_parse(env, "CHUNK_OVERLAP", "expected a non-negative integer")?
                .unwrap_or(defaults.overlap),
        };

        let top_k = env_opt_parse(env, "RETRIEVAL_TOP_K", "expected a positive integer")?
            .unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(StartupError::InvalidValue {
                var: "RETRIEVAL_TOP_K",
                reason: "must be at least 1".into(),
            });
        }

        let embedding_batch_size =
            env_opt_parse(env, "EMBEDDING_BATCH_SIZE", "expected a positive integer")?
                .unwrap_or(DEFAULT_EMBEDDING_BATCH_SIZE);
        if embedding_batch_size == 0 {
            return Err(StartupError::InvalidValue {
                var: "EMBEDDING_BATCH_SIZE",
                reason: "must be at least 1".into(),
            });
        }

        let pipeline = PipelineConfig {
            max_retries: env_opt_parse(env, "LLM_MAX_RETRIES", "expected u32")?.unwrap_or(0),
            retry_backoff: Duration::from_millis(
                env_opt_parse(env, "LLM_RETRY_BACKOFF_MS", "expected milliseconds (u64)")?
                    .unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
            ),
            condense_question: env_flag(env, "CONDENSE_QUESTION", false)?,
        };

        Ok(Self {
            chat,
            embedding,
            dataset_path: env_opt(env, "DATASET_PATH")
                .map(|p| PathBuf::from(p.trim()))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
            chunking,
            top_k,
            embedding_batch_size,
            site_name: env_opt(env, "SITE_NAME")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            always_answer: env_flag(env, "PROMPT_ALWAYS_ANSWER", true)?,
            template_file: env_opt(env, "PROMPT_TEMPLATE_FILE").map(|p| PathBuf::from(p.trim())),
            pipeline,
        })
    }
}
