//! Configuration for the question-answering pipeline.

use serde::{Deserialize, Serialize};

use crate::chunking::WordWindowChunker;
use crate::error::{RagError, Result};

/// Chunking and retrieval parameters for one request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QaConfig {
    /// Window size in words.
    pub max_length: usize,
    /// Number of words shared by consecutive windows.
    pub overlap: usize,
    /// Number of nearest chunks to retrieve.
    pub top_k: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self { max_length: 256, overlap: 20, top_k: 3 }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }

    /// Check the parameters without building anything.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidParameter`] if:
    /// - `max_length == 0`
    /// - `overlap >= max_length`
    /// - `top_k == 0`
    pub fn validate(&self) -> Result<()> {
        self.chunker()?;
        if self.top_k == 0 {
            return Err(RagError::InvalidParameter("top_k must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// The chunker described by `max_length` and `overlap`.
    pub fn chunker(&self) -> Result<WordWindowChunker> {
        WordWindowChunker::new(self.max_length, self.overlap)
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the window size in words.
    pub fn max_length(mut self, words: usize) -> Self {
        self.config.max_length = words;
        self
    }

    /// Set the overlap between consecutive windows in words.
    pub fn overlap(mut self, words: usize) -> Self {
        self.config.overlap = words;
        self
    }

    /// Set the number of nearest chunks to retrieve.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`QaConfig::validate`].
    pub fn build(self) -> Result<QaConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
