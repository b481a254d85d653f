use crate::chunk::Passage;
use crate::embed::Embedding;
use crate::errors::{RagError, Result};

/// A passage with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    pub passage: Passage,
    /// Cosine similarity in `[-1, 1]`; higher is closer.
    pub score: f32,
}

/// In-memory vector index with brute-force cosine search.
///
/// Built once at startup and read-only afterwards. Fine for a website-sized
/// corpus (a few thousand passages).
#[derive(Debug, Default)]
pub struct MemoryIndex {
    passages: Vec<Passage>,
    vectors: Vec<Embedding>,
    dim: Option<usize>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds passages with their embeddings (same length, same order).
    ///
    /// # Errors
    /// - [`RagError::InvalidEmbeddings`] if the slices differ in length.
    /// - [`RagError::VectorSizeMismatch`] if a vector's dimension differs from
    ///   the first one ever inserted.
    pub fn insert(&mut self, passages: Vec<Passage>, vectors: Vec<Embedding>) -> Result<()> {
        if passages.len() != vectors.len() {
            return Err(RagError::InvalidEmbeddings(format!(
                "{} passages but {} vectors",
                passages.len(),
                vectors.len()
            )));
        }
        let Some(want) = self.dim.or_else(|| vectors.first().map(Vec::len)) else {
            return Ok(());
        };
        if want == 0 {
            return Err(RagError::InvalidEmbeddings("empty vectors".into()));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != want) {
            return Err(RagError::VectorSizeMismatch {
                got: bad.len(),
                want,
            });
        }
        self.dim = Some(want);
        self.passages.extend(passages);
        self.vectors.extend(vectors);
        Ok(())
    }

    /// Returns the `k` passages most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order, so results are deterministic.
    ///
    /// # Errors
    /// [`RagError::VectorSizeMismatch`] if `query` has the wrong dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredPassage>> {
        if let Some(want) = self.dim {
            if query.len() != want {
                return Err(RagError::VectorSizeMismatch {
                    got: query.len(),
                    want,
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, score)| ScoredPassage {
                passage: self.passages[i].clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Embedding dimension, once anything has been inserted.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }
}

/// Cosine similarity; `0.0` when either vector has zero norm.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str) -> Passage {
        Passage {
            id: id.to_string(),
            page: "p".into(),
            url: "u".into(),
            offset: 0,
            text: id.to_string(),
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn search_returns_best_first_and_respects_k() {
        let mut idx = MemoryIndex::new();
        idx.insert(
            vec![passage("far"), passage("close"), passage("medium")],
            vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 0.0], vec![0.5, 0.5, 0.0]],
        )
        .unwrap();

        let hits = idx.search(&[1.0, 0.0, 0.0], 2).unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.passage.id.as_str()).collect();
        assert_eq!(ids, vec!["close", "medium"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn k_larger_than_index() {
        let mut idx = MemoryIndex::new();
        idx.insert(vec![passage("only")], vec![vec![1.0, 0.0]]).unwrap();
        assert_eq!(idx.search(&[1.0, 0.0], 100).unwrap().len(), 1);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut idx = MemoryIndex::new();
        idx.insert(
            vec![passage("a"), passage("b"), passage("c")],
            vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();
        let ids: Vec<_> = idx
            .search(&[1.0, 0.0], 3)
            .unwrap()
            .into_iter()
            .map(|h| h.passage.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn dimension_is_enforced() {
        let mut idx = MemoryIndex::new();
        idx.insert(vec![passage("a")], vec![vec![1.0, 0.0]]).unwrap();
        assert_eq!(idx.dim(), Some(2));
        assert!(matches!(
            idx.insert(vec![passage("b")], vec![vec![1.0, 0.0, 0.0]]),
            Err(RagError::VectorSizeMismatch { got: 3, want: 2 })
        ));
        assert!(matches!(
            idx.search(&[1.0], 1),
            Err(RagError::VectorSizeMismatch { got: 1, want: 2 })
        ));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut idx = MemoryIndex::new();
        assert!(matches!(
            idx.insert(vec![passage("a"), passage("b")], vec![vec![1.0]]),
            Err(RagError::InvalidEmbeddings(_))
        ));
        assert!(idx.is_empty());
    }

    #[test]
    fn empty_index_search() {
        let idx = MemoryIndex::new();
        assert!(idx.search(&[1.0, 0.0], 4).unwrap().is_empty());
    }
}
