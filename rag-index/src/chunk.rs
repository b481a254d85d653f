//! Fixed-size, overlapping character chunking.
//!
//! Sizes are counted in Unicode scalar values, so a passage never splits a
//! multi-byte character. Consecutive passages share exactly `overlap`
//! characters; dropping the first `overlap` characters of every passage but
//! the first and concatenating gives back the original text.

use serde::{Deserialize, Serialize};

use crate::dataset::Document;
use crate::errors::{RagError, Result};

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum passage length in characters.
    pub chunk_size: usize,
    /// Characters shared by neighbouring passages.
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

impl ChunkConfig {
    /// Checks `chunk_size > 0` and `overlap < chunk_size`.
    ///
    /// # Errors
    /// [`RagError::InvalidConfig`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// A chunk of a document, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// `"{page}#{ordinal}"`, unique within one index build.
    pub id: String,
    /// Page identifier of the source document.
    pub page: String,
    /// URL of the source document.
    pub url: String,
    /// Character offset of the passage inside the document content.
    pub offset: usize,
    pub text: String,
}

/// Splits `text` into passages of at most `chunk_size` characters, each
/// starting `chunk_size - overlap` characters after the previous one.
///
/// Splitting stops at the first passage that reaches the end of the text,
/// so no passage is empty or entirely contained in its predecessor. Empty
/// text yields no passages.
///
/// # Errors
/// [`RagError::InvalidConfig`] if `chunk_size == 0` or `overlap >= chunk_size`.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<&str>> {
    ChunkConfig {
        chunk_size,
        overlap,
    }
    .validate()?;

    Ok(split_with_offsets(text, chunk_size, overlap)
        .into_iter()
        .map(|(_, s)| s)
        .collect())
}

/// Same as [`split`] without validation, also returning each passage's char offset.
fn split_with_offsets(text: &str, chunk_size: usize, overlap: usize) -> Vec<(usize, &str)> {
    // Byte position of every char boundary, including the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = bounds.len() - 1;
    if total == 0 {
        return Vec::new();
    }

    let stride = chunk_size - overlap;
    let mut out = Vec::with_capacity(total.div_ceil(stride));
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(total);
        out.push((start, &text[bounds[start]..bounds[end]]));
        if end == total {
            break;
        }
        start += stride;
    }
    out
}

/// Chunks one document into owned passages carrying its provenance.
///
/// # Errors
/// [`RagError::InvalidConfig`] for unusable parameters.
pub fn chunk_document(doc: &Document, cfg: &ChunkConfig) -> Result<Vec<Passage>> {
    cfg.validate()?;
    Ok(split_with_offsets(&doc.content, cfg.chunk_size, cfg.overlap)
        .into_iter()
        .enumerate()
        .map(|(i, (offset, text))| Passage {
            id: format!("{}#{}", doc.page, i),
            page: doc.page.clone(),
            url: doc.url.clone(),
            offset,
            text: text.to_string(),
        })
        .collect())
}
