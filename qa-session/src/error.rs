use ai_llm_service::AiLlmError;
use rag_index::RagError;
use thiserror::Error;

/// Failure of one pipeline run. Every variant is recoverable by the session.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Embedding the question or searching the index failed.
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RagError),

    /// The chat model call failed.
    #[error("chat model failed: {0}")]
    Llm(#[from] AiLlmError),
}

impl PipelineError {
    /// Backend failures that may succeed on a second attempt: timeouts,
    /// transport errors, rate limits and server errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Llm(e) => e.is_transient(),
            PipelineError::Retrieval(RagError::Embedding(e)) => e.is_transient(),
            PipelineError::Retrieval(_) => false,
        }
    }
}

/// A prompt template that cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("prompt template is missing the {{{0}}} placeholder")]
    MissingPlaceholder(&'static str),
}

/// `submit` called outside the `Idle` state or with nothing to ask.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a question is already waiting for its answer")]
    AnswerPending,

    #[error("question is empty")]
    EmptyQuestion,
}
