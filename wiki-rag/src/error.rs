//! Error types for the `wiki-rag` crate.

use thiserror::Error;

/// Errors that can occur while answering a question over a document.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document source could not supply text for the topic.
    ///
    /// This is the only failure the pipeline converts into a user-facing
    /// message instead of propagating.
    #[error("Could not retrieve a document for '{topic}': {reason}")]
    RetrievalUnavailable {
        /// The topic that was requested.
        topic: String,
        /// Why the source failed.
        reason: String,
    },

    /// Segmentation produced zero chunks.
    #[error("Document '{source_id}' contains no words to index")]
    EmptyDocument {
        /// The identifier of the empty document.
        source_id: String,
    },

    /// An embedding's dimension disagrees with the index or its batch.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension already established for the index.
        expected: usize,
        /// The offending dimension.
        actual: usize,
    },

    /// The number of chunks and embeddings handed to the index differ.
    #[error("Chunk/embedding count mismatch: {chunks} chunks, {embeddings} embeddings")]
    CountMismatch {
        /// Number of chunks supplied.
        chunks: usize,
        /// Number of embeddings supplied.
        embeddings: usize,
    },

    /// A search with `k > 0` was issued against an index with no entries.
    #[error("Cannot search an empty index")]
    EmptyIndex,

    /// Chunking or retrieval parameters are malformed.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The embedding service failed or returned a malformed response.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The answering service failed or returned an empty answer.
    #[error("Answering error ({provider}): {message}")]
    AnsweringFailure {
        /// The answering service that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A pipeline was assembled without a required collaborator.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
