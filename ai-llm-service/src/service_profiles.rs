//! Shared LLM service with two profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once at startup, wrap in `Arc`, and pass clones to dependents.
//! - Both clients are built eagerly so configuration problems surface before
//!   the first question is asked.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::config::{default_config, env_source::ProcessEnv};
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chat = default_config::config_openai_chat(&ProcessEnv)?;
//! let embedding = default_config::config_embedding(&ProcessEnv)?;
//! let svc = Arc::new(LlmServiceProfiles::new(chat, embedding)?);
//!
//! let txt = svc.generate("Hello").await?;
//! println!("{txt:?}");
//! let vecs = svc.embed(&["Ferris".to_string()]).await?;
//! println!("dim = {}", vecs[0].len());
//! # Ok(()) }
//! ```

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Embedding backend selected by `EMBEDDING_KIND`.
#[derive(Debug)]
enum EmbeddingClient {
    OpenAI(OpenAiService),
    Ollama(OllamaService),
}

/// Shared service that manages the **chat** and **embedding** profiles.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    chat: OpenAiService,
    embedding: EmbeddingClient,
}

impl LlmServiceProfiles {
    /// Creates the service and both underlying HTTP clients.
    ///
    /// # Errors
    /// Any client construction error (wrong provider, missing key, bad endpoint).
    pub fn new(chat: LlmModelConfig, embedding: LlmModelConfig) -> Result<Self, AiLlmError> {
        let chat_client = OpenAiService::new(chat)?;
        let embedding_client = match embedding.provider {
            LlmProvider::OpenAI => EmbeddingClient::OpenAI(OpenAiService::new(embedding)?),
            LlmProvider::Ollama => EmbeddingClient::Ollama(OllamaService::new(embedding)?),
        };

        Ok(Self {
            chat: chat_client,
            embedding: embedding_client,
        })
    }

    /// Generates text with the **chat** profile.
    ///
    /// `Ok(None)` means the model answered with no content.
    pub async fn generate(&self, prompt: &str) -> Result<Option<String>, AiLlmError> {
        self.chat.generate(prompt).await
    }

    /// Computes embeddings for a batch with the **embedding** profile.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AiLlmError> {
        match &self.embedding {
            EmbeddingClient::OpenAI(cli) => cli.embeddings(inputs).await,
            EmbeddingClient::Ollama(cli) => cli.embeddings(inputs).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".into(),
            endpoint: "https://api.openai.com".into(),
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: Some(0.5),
            timeout_secs: Some(30),
        }
    }

    #[test]
    fn builds_with_ollama_embeddings() {
        let embedding = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "all-minilm".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
        };
        let svc = LlmServiceProfiles::new(chat_cfg(), embedding).unwrap();
        assert!(matches!(svc.embedding, EmbeddingClient::Ollama(_)));
    }

    #[test]
    fn chat_profile_must_be_openai() {
        let mut chat = chat_cfg();
        chat.provider = LlmProvider::Ollama;
        chat.endpoint = "http://localhost:11434".into();
        assert!(LlmServiceProfiles::new(chat, chat_cfg()).is_err());
    }
}
