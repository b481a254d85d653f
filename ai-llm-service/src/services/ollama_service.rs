//! Lightweight Ollama service for local embeddings.
//!
//! Talks to `POST {endpoint}/api/embeddings`, one input per request. Used
//! when `EMBEDDING_KIND=ollama` so passages can be embedded by a local
//! sentence-transformer model instead of the hosted API.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
};

/// Thin client for Ollama embeddings.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` is empty or lacks an http(s) scheme
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(Provider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = cfg.timeout();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let url_embeddings = format!("{}/api/embeddings", endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            cfg,
            timeout,
            url_embeddings,
        })
    }

    /// Embeds each input in turn, preserving order.
    ///
    /// # Errors
    /// The first failing request aborts the batch.
    pub async fn embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AiLlmError> {
        let mut out = Vec::with_capacity(inputs.len());
        for input in inputs {
            out.push(self.embed_one(input).await?);
        }
        Ok(out)
    }

    #[instrument(level = "debug", skip_all, fields(model = %self.cfg.model, input_len = input.len()))]
    async fn embed_one(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            error!(%status, url = %self.url_embeddings, %snippet, "Ollama /api/embeddings failed");
            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url: self.url_embeddings.clone(),
                    snippet,
                }),
            )
            .into());
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `embedding`")),
            )
        })?;

        if out.embedding.is_empty() {
            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::Decode("empty `embedding` in response".into()),
            )
            .into());
        }

        debug!(
            dim = out.embedding.len(),
            latency_ms = started.elapsed().as_millis(),
            "embedding completed"
        );
        Ok(out.embedding)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}
