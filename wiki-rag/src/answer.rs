//! Extractive answering trait.

use async_trait::async_trait;

use crate::document::Answer;
use crate::error::Result;

/// Extracts an answer span for a question from a given context.
///
/// Implementations operate purely on the provided context and perform no
/// retrieval of their own. Failures, including an empty answer, are reported
/// as [`RagError::AnsweringFailure`](crate::RagError::AnsweringFailure).
#[async_trait]
pub trait AnswerExtractor: Send + Sync {
    /// Extract an answer to `question` from `context`.
    async fn extract(&self, question: &str, context: &str) -> Result<Answer>;
}
