//! Fatal startup errors of the `site-qa` binary.
//!
//! Anything in here stops the process before the chat prompt appears.
//! Per-question failures never reach this type; the session turns them
//! into a fallback answer.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use qa_session::TemplateError;
use rag_index::RagError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

#[derive(Debug, Error)]
pub enum StartupError {
    /// The API credential is not configured.
    #[error("{var} is not set. Add it to your environment or .env file and restart.")]
    MissingCredential { var: &'static str },

    /// `.env` exists but cannot be read or parsed.
    #[error("[Startup] cannot load .env: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("[Startup] invalid configuration: {0}")]
    Config(#[from] AiLlmError),

    #[error("[Startup] invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    /// Dataset loading or index building failed.
    #[error("[Startup] cannot build the knowledge base: {0}")]
    Index(#[from] RagError),

    #[error("[Startup] cannot read prompt template {}: {source}", path.display())]
    TemplateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("[Startup] unusable prompt template: {0}")]
    Template(#[from] TemplateError),

    #[error("[Startup] cannot install the log subscriber: {0}")]
    Telemetry(#[from] TryInitError),

    /// Terminal I/O failed while chatting.
    #[error("[Shell] terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
