//! Query resolution: embed a question and search an index with it.

use tracing::debug;

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::FlatL2Index;

/// Default number of chunks returned by [`resolve`].
pub const DEFAULT_TOP_K: usize = 3;

/// Embed `question` with a single-input call and return its `k` nearest chunks.
///
/// Errors from the embedding provider and from [`FlatL2Index::search`] are
/// returned unchanged.
pub async fn resolve(
    embedder: &dyn EmbeddingProvider,
    question: &str,
    index: &FlatL2Index,
    k: usize,
) -> Result<Vec<SearchResult>> {
    let query_embedding = embedder.embed(question).await?;
    debug!(provider = embedder.name(), dimension = query_embedding.len(), k, "resolving query");
    index.search(&query_embedding, k)
}
