//! Unified error types for the crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Result alias for rag-index operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Top-level error for loading, chunking, embedding and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset file is not valid JSON.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The dataset is valid JSON but violates the record schema.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Chunking or retrieval parameters are unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The embedding backend failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] AiLlmError),

    /// The embedding backend answered with the wrong shape.
    #[error("invalid embedding output: {0}")]
    InvalidEmbeddings(String),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },
}
