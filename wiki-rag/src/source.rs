//! Document source trait for fetching the text of a named topic.

use async_trait::async_trait;
use thiserror::Error;

use crate::document::Document;

/// Why a [`DocumentSource`] could not produce a document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No document matches the topic.
    #[error("no document found for '{0}'")]
    NotFound(String),

    /// The topic matches more than one document.
    #[error("'{topic}' is ambiguous; candidates: {}", options.join(", "))]
    Ambiguous {
        /// The topic as requested.
        topic: String,
        /// Titles the topic could refer to, possibly empty.
        options: Vec<String>,
    },

    /// The source could not be reached or answered with an error.
    #[error("document source unavailable: {0}")]
    Unavailable(String),
}

/// Fetches raw text for a topic.
///
/// # Example
///
/// ```rust,ignore
/// use wiki_rag::DocumentSource;
///
/// let document = source.fetch("Rust (programming language)").await?;
/// println!("{} words", document.text.split_whitespace().count());
/// ```
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the document for `topic`.
    async fn fetch(&self, topic: &str) -> Result<Document, SourceError>;
}
