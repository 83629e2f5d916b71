//! Exact nearest-neighbour index over chunk embeddings.
//!
//! [`FlatL2Index`] keeps (chunk, embedding) pairs in insertion order and
//! answers top-k queries with a brute-force squared Euclidean scan. There is
//! no approximation: the same contents and query always produce the same
//! ranking, with ties resolved by insertion order.

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

#[derive(Debug, Clone)]
struct Entry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// An in-memory, insertion-ordered vector index using squared L2 distance.
///
/// The dimension is fixed by the first non-empty [`add`](Self::add) and every
/// later embedding must match it.
///
/// # Example
///
/// ```rust,ignore
/// use wiki_rag::FlatL2Index;
///
/// let mut index = FlatL2Index::new();
/// index.add(chunks, embeddings)?;
/// let results = index.search(&query_embedding, 3)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlatL2Index {
    dimension: Option<usize>,
    entries: Vec<Entry>,
}

/// Squared Euclidean distance between two vectors of equal length.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + (x - y) * (x - y))
}

impl FlatL2Index {
    /// Create an index with zero entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The embedding dimension, once established.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Append chunks paired positionally with their embeddings.
    ///
    /// The call is all-or-nothing: on error the index is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`RagError::CountMismatch`] if `chunks.len() != embeddings.len()`
    /// - [`RagError::DimensionMismatch`] if any embedding disagrees with the
    ///   index dimension or with the first embedding of the batch
    pub fn add(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let Some(first) = embeddings.first() else {
            return Ok(());
        };
        let expected = self.dimension.unwrap_or(first.len());
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(RagError::DimensionMismatch { expected, actual: bad.len() });
        }

        self.dimension = Some(expected);
        self.entries.extend(
            chunks.into_iter().zip(embeddings).map(|(chunk, embedding)| Entry { chunk, embedding }),
        );
        Ok(())
    }

    /// Return the `k` entries nearest to `query`, ascending by distance.
    ///
    /// Equidistant entries keep their insertion order. If `k` exceeds the
    /// number of entries, every entry is returned. `k == 0` yields an empty
    /// result.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyIndex`] if the index is empty and `k > 0`
    /// - [`RagError::DimensionMismatch`] if `query` has the wrong dimension
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if self.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if let Some(expected) = self.dimension {
            if query.len() != expected {
                return Err(RagError::DimensionMismatch { expected, actual: query.len() });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, squared_l2(&entry.embedding, query)))
            .collect();

        // NaN ranks last; sort_by is stable so ties keep insertion order.
        scored.sort_by(|a, b| rank_key(a.1).total_cmp(&rank_key(b.1)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| SearchResult { chunk: self.entries[i].chunk.clone(), distance })
            .collect())
    }
}

fn rank_key(distance: f32) -> f32 {
    if distance.is_nan() { f32::INFINITY } else { distance }
}
