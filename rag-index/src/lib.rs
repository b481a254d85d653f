//! Retrieval side of the assistant.
//!
//! ```text
//! dataset.json -> Document -> split -> Passage -> Embedder -> MemoryIndex
//!                                                                 |
//! question ----------------------------> Embedder -> Retriever <--+
//! ```
//!
//! The index is built once at startup by [`ingest::build_index`] and is
//! read-only afterwards; share it behind an `Arc`.

pub mod chunk;
pub mod dataset;
pub mod embed;
pub mod errors;
pub mod index;
pub mod ingest;
pub mod retrieve;

pub use chunk::{ChunkConfig, Passage, split};
pub use dataset::{Document, load_dataset};
pub use embed::{EmbedFuture, Embedder, Embedding, LlmEmbedder};
pub use errors::{RagError, Result};
pub use index::{MemoryIndex, ScoredPassage};
pub use ingest::build_index;
pub use retrieve::Retriever;
