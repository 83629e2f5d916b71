//! # wiki-rag
//!
//! Retrieval core for answering a natural-language question from a single
//! fetched document.
//!
//! A request fetches the document for a topic, splits it into overlapping
//! word windows, embeds the windows, indexes them in an exact L2 index, and
//! hands the nearest windows (nearest first) to an extractive answering
//! service.
//!
//! The three external collaborators are traits injected into the pipeline:
//!
//! - [`DocumentSource`] — fetches raw text for a topic
//! - [`EmbeddingProvider`] — maps text to fixed-dimension vectors
//! - [`AnswerExtractor`] — extracts an answer span from a context
//!
//! ## Features
//!
//! - `wikipedia` — [`wikipedia::WikipediaSource`] over the MediaWiki API
//! - `huggingface` — embedding and question-answering adapters for the
//!   Hugging Face inference API
//! - `full` — both of the above

pub mod answer;
pub mod cache;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod resolver;
pub mod source;

#[cfg(feature = "huggingface")]
pub mod huggingface;
#[cfg(feature = "wikipedia")]
pub mod wikipedia;

pub use answer::AnswerExtractor;
pub use cache::{CacheKey, IndexCache};
pub use chunking::{WordWindowChunker, segment};
pub use config::{QaConfig, QaConfigBuilder};
pub use document::{Answer, AnswerSpan, Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::{FlatL2Index, squared_l2};
pub use pipeline::{
    CONTEXT_SEPARATOR, QaPipeline, QaPipelineBuilder, QaResponse, assemble_context,
};
pub use resolver::{DEFAULT_TOP_K, resolve};
pub use source::{DocumentSource, SourceError};

#[cfg(feature = "huggingface")]
pub use huggingface::{HuggingFaceAnswerer, HuggingFaceEmbeddingProvider};
#[cfg(feature = "wikipedia")]
pub use wikipedia::WikipediaSource;
