//! Sliding-window document segmentation.
//!
//! Text is tokenized into words by whitespace. Windows of `max_length` words
//! start at word 0 and advance by `max_length - overlap` words, so adjacent
//! chunks share exactly `overlap` words. Segmentation stops after the first
//! window that reaches the final word, which may be shorter than the rest.
//!
//! # Example
//!
//! ```rust
//! use wiki_rag::chunking::segment;
//!
//! let chunks = segment("a b c d e f g h i", 4, 1).unwrap();
//! let starts: Vec<usize> = chunks.iter().map(|c| c.start_word).collect();
//! assert_eq!(starts, vec![0, 3, 6]);
//! ```

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Splits documents into overlapping word windows.
///
/// Parameters are validated once at construction, so [`chunk`](Self::chunk)
/// cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWindowChunker {
    max_length: usize,
    overlap: usize,
}

impl WordWindowChunker {
    /// Create a new `WordWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `max_length` — window size in words, must be greater than zero
    /// * `overlap` — words repeated between consecutive windows, must be less than `max_length`
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidParameter`] if either constraint is violated.
    pub fn new(max_length: usize, overlap: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(RagError::InvalidParameter(
                "max_length must be greater than zero".to_string(),
            ));
        }
        if overlap >= max_length {
            return Err(RagError::InvalidParameter(format!(
                "overlap ({overlap}) must be less than max_length ({max_length})"
            )));
        }
        Ok(Self { max_length, overlap })
    }

    /// Window size in words.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Words shared by consecutive windows.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Number of words each window advances by. Always at least one.
    pub fn step(&self) -> usize {
        self.max_length - self.overlap
    }

    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no words.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.split(&document.text)
    }

    /// Split raw text into chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let total = words.len();
        let mut chunks =
            Vec::with_capacity(expected_chunk_count(total, self.max_length, self.step()));
        let mut start = 0;

        while start < total {
            let end = (start + self.max_length).min(total);
            chunks.push(Chunk {
                ordinal: chunks.len(),
                start_word: start,
                end_word: end,
                text: words[start..end].join(" "),
            });
            if end == total {
                break;
            }
            start += self.step();
        }

        chunks
    }
}

/// Segment `text` into overlapping windows of at most `max_length` words.
///
/// # Errors
///
/// Returns [`RagError::InvalidParameter`] if `max_length == 0` or
/// `overlap >= max_length`.
pub fn segment(text: &str, max_length: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(WordWindowChunker::new(max_length, overlap)?.split(text))
}

/// Number of windows produced for `total` words.
fn expected_chunk_count(total: usize, max_length: usize, step: usize) -> usize {
    match total {
        0 => 0,
        n if n <= max_length => 1,
        n => (n - max_length).div_ceil(step) + 1,
    }
}
