//! Query-time retrieval: embed the question, search the shared index.

use std::sync::Arc;

use tracing::debug;

use crate::embed::Embedder;
use crate::errors::{RagError, Result};
use crate::index::{MemoryIndex, ScoredPassage};

/// Top-k retriever over a read-only index.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<MemoryIndex>,
    top_k: usize,
}

impl Retriever {
    /// # Errors
    /// [`RagError::InvalidConfig`] if `top_k == 0`.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<MemoryIndex>, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(RagError::InvalidConfig("top_k must be > 0".into()));
        }
        Ok(Self {
            embedder,
            index,
            top_k,
        })
    }

    /// Returns up to `top_k` passages most similar to `query`, best first.
    ///
    /// # Errors
    /// Embedding failures and dimension mismatches.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredPassage>> {
        let vector = self.embedder.embed_query(query).await?;
        let hits = self.index.search(&vector, self.top_k)?;
        debug!(
            query_len = query.len(),
            hits = hits.len(),
            best = hits.first().map(|h| h.score).unwrap_or(0.0),
            "retrieved passages"
        );
        Ok(hits)
    }
}
