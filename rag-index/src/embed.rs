//! Embedding seam.
//!
//! Async because every real provider performs HTTP requests. The trait uses
//! boxed futures so it stays object-safe and can be shared as
//! `Arc<dyn Embedder>`.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::service_profiles::LlmServiceProfiles;

use crate::errors::{RagError, Result};

/// A vector embedding.
pub type Embedding = Vec<f32>;

/// Boxed future returned by [`Embedder`] methods.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Provider interface for embedding generation.
pub trait Embedder: Send + Sync {
    /// Embeds a batch of passages for indexing. Output order matches input order.
    fn embed_documents<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Embedding>>;

    /// Embeds a single query for searching.
    fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Embedding>;
}

/// Embedder backed by the shared [`LlmServiceProfiles`] embedding profile.
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

impl Embedder for LlmEmbedder {
    fn embed_documents<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Embedding>> {
        Box::pin(async move {
            let out = self.svc.embed(texts).await?;
            if out.len() != texts.len() {
                return Err(RagError::InvalidEmbeddings(format!(
                    "expected {} vectors, got {}",
                    texts.len(),
                    out.len()
                )));
            }
            Ok(out)
        })
    }

    fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Embedding> {
        Box::pin(async move {
            self.svc
                .embed(&[text.to_string()])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| RagError::InvalidEmbeddings("no vector for query".into()))
        })
    }
}
