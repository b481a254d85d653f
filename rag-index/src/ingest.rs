//! Index construction: chunk every document, embed in batches, insert.

use std::time::Instant;

use tracing::{debug, info};

use crate::chunk::{ChunkConfig, Passage, chunk_document};
use crate::dataset::Document;
use crate::embed::Embedder;
use crate::errors::{RagError, Result};
use crate::index::MemoryIndex;

/// Builds the in-memory index for `docs`.
///
/// Chunking parameters are validated before any embedding request is made.
/// Passages are embedded `batch_size` at a time.
///
/// # Errors
/// - [`RagError::InvalidConfig`] for bad chunking parameters or `batch_size == 0`.
/// - Any embedding or dimension error; the build is aborted on the first one.
pub async fn build_index(
    docs: &[Document],
    chunking: &ChunkConfig,
    embedder: &dyn Embedder,
    batch_size: usize,
) -> Result<MemoryIndex> {
    chunking.validate()?;
    if batch_size == 0 {
        return Err(RagError::InvalidConfig("batch_size must be > 0".into()));
    }

    let started = Instant::now();
    let mut passages: Vec<Passage> = Vec::new();
    for doc in docs {
        passages.extend(chunk_document(doc, chunking)?);
    }
    info!(
        documents = docs.len(),
        passages = passages.len(),
        chunk_size = chunking.chunk_size,
        overlap = chunking.overlap,
        "documents chunked"
    );

    let mut index = MemoryIndex::new();
    for (n, batch) in passages.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
        let vectors = embedder.embed_documents(&texts).await?;
        index.insert(batch.to_vec(), vectors)?;
        debug!(batch = n, indexed = index.len(), "batch embedded");
    }

    info!(
        passages = index.len(),
        dim = index.dim().unwrap_or(0),
        elapsed_ms = started.elapsed().as_millis(),
        "index built"
    );
    Ok(index)
}
