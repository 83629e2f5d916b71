//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-dimension vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed`](EmbeddingProvider::embed) implementation
/// issues a single-element [`embed_batch`](EmbeddingProvider::embed_batch).
///
/// `embed_batch` must return exactly one vector per input, in input order;
/// the pipeline pairs vectors with chunks positionally.
///
/// # Example
///
/// ```rust,ignore
/// use wiki_rag::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embeddings = provider.embed_batch(&["first", "second"]).await?;
/// assert_eq!(embeddings.len(), 2);
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text]).await?;
        match results.len() {
            1 => Ok(results.remove(0)),
            n => Err(crate::error::RagError::EmbeddingError {
                provider: self.name().to_string(),
                message: format!("expected 1 embedding, got {n}"),
            }),
        }
    }

    /// A short provider name used in logs and errors.
    fn name(&self) -> &str;
}
