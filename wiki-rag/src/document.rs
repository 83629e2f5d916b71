//! Data types for documents, chunks, search results, and answers.

use serde::{Deserialize, Serialize};

/// The raw text for one topic, as returned by a [`DocumentSource`](crate::DocumentSource).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier of the document at its source (e.g. the resolved page title).
    pub source_id: String,
    /// The text content of the document.
    pub text: String,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with no source URI.
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), text: text.into(), source_uri: None }
    }

    /// Attach the URI the text was fetched from.
    pub fn with_source_uri(mut self, uri: impl Into<String>) -> Self {
        self.source_uri = Some(uri.into());
        self
    }
}

/// A contiguous word range `[start_word, end_word)` of a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in segmentation order.
    pub ordinal: usize,
    /// Index of the first word covered by the chunk.
    pub start_word: usize,
    /// One past the index of the last word covered by the chunk.
    pub end_word: usize,
    /// The chunk's words joined by single spaces.
    pub text: String,
}

impl Chunk {
    /// Number of words in the chunk.
    pub fn word_count(&self) -> usize {
        self.end_word - self.start_word
    }
}

/// A retrieved [`Chunk`] paired with its squared Euclidean distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Squared L2 distance to the query (lower is more relevant).
    pub distance: f32,
}

/// Character offsets of an extracted answer within its context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerSpan {
    /// Offset of the first character of the answer.
    pub start: usize,
    /// Offset one past the last character of the answer.
    pub end: usize,
}

/// An answer extracted from a context string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The extracted answer text, verbatim from the answering service.
    pub text: String,
    /// Confidence reported by the answering service, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Location of the answer within `context`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<AnswerSpan>,
    /// The context the answer was extracted from.
    pub context: String,
}
