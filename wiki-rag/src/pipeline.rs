//! Question-answering pipeline orchestrator.
//!
//! The [`QaPipeline`] runs one request end to end by composing a
//! [`DocumentSource`], an [`EmbeddingProvider`], and an [`AnswerExtractor`]:
//!
//! fetch → segment → embed → index → resolve → assemble context → extract.
//!
//! Every request builds its own document, chunks, and index, so concurrent
//! requests through one pipeline share nothing mutable. An [`IndexCache`]
//! can be attached to reuse indexes for repeated topics.
//!
//! # Example
//!
//! ```rust,ignore
//! use wiki_rag::{QaConfig, QaPipeline};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .document_source(Arc::new(WikipediaSource::new()?))
//!     .embedding_provider(Arc::new(HuggingFaceEmbeddingProvider::from_env()?))
//!     .answer_extractor(Arc::new(HuggingFaceAnswerer::from_env()?))
//!     .build()?;
//!
//! let (answer, context) = pipeline.answer("Alan Turing", "Where was Turing born?").await?;
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::answer::AnswerExtractor;
use crate::cache::{CacheKey, IndexCache};
use crate::config::QaConfig;
use crate::document::{Answer, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::FlatL2Index;
use crate::resolver::resolve;
use crate::source::DocumentSource;

/// Separator placed between retrieved chunks in the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// The full outcome of a successful request.
#[derive(Debug, Clone)]
pub struct QaResponse {
    /// The extracted answer.
    pub answer: Answer,
    /// Retrieved chunk texts, nearest first, joined by [`CONTEXT_SEPARATOR`].
    pub context: String,
    /// The retrieval result the context was assembled from.
    pub results: Vec<SearchResult>,
}

/// Join retrieved chunk texts in rank order (nearest first).
pub fn assemble_context(results: &[SearchResult]) -> String {
    results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

/// The question-answering pipeline.
///
/// Collaborators are long-lived handles injected at construction; the
/// pipeline itself holds no per-request state. Construct one via
/// [`QaPipeline::builder()`].
pub struct QaPipeline {
    config: QaConfig,
    document_source: Arc<dyn DocumentSource>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    answer_extractor: Arc<dyn AnswerExtractor>,
    index_cache: Option<Arc<IndexCache>>,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline's default configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Answer `question` about `topic`, returning `(answer_text, context_text)`.
    ///
    /// If the document cannot be fetched or contains no words, the answer
    /// text is a user-facing message and the context is empty.
    ///
    /// # Errors
    ///
    /// Every failure after segmentation (embedding, indexing, retrieval,
    /// answering) is returned unchanged.
    pub async fn answer(&self, topic: &str, question: &str) -> Result<(String, String)> {
        self.answer_with(topic, question, &self.config).await
    }

    /// Like [`answer`](Self::answer) with per-request parameters.
    pub async fn answer_with(
        &self,
        topic: &str,
        question: &str,
        config: &QaConfig,
    ) -> Result<(String, String)> {
        match self.run_with(topic, question, config).await {
            Ok(response) => Ok((response.answer.text, response.context)),
            Err(e @ (RagError::RetrievalUnavailable { .. } | RagError::EmptyDocument { .. })) => {
                Ok((e.to_string(), String::new()))
            }
            Err(e) => Err(e),
        }
    }

    /// Run the pipeline with the default configuration, reporting every failure as a typed error.
    pub async fn run(&self, topic: &str, question: &str) -> Result<QaResponse> {
        self.run_with(topic, question, &self.config).await
    }

    /// Run the pipeline with per-request parameters.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidParameter`] if `config` is malformed
    /// - [`RagError::RetrievalUnavailable`] if the document source fails
    /// - [`RagError::EmptyDocument`] if the document has no words
    /// - embedding, indexing, and answering errors as produced
    pub async fn run_with(
        &self,
        topic: &str,
        question: &str,
        config: &QaConfig,
    ) -> Result<QaResponse> {
        config.validate()?;

        let index = self.index_for(topic, config).await?;

        let results =
            resolve(self.embedding_provider.as_ref(), question, &index, config.top_k).await?;
        let context = assemble_context(&results);
        info!(topic, result_count = results.len(), "retrieved context");

        let answer = self.answer_extractor.extract(question, &context).await?;
        if answer.text.trim().is_empty() {
            return Err(RagError::AnsweringFailure {
                provider: "answer_extractor".to_string(),
                message: "answering service returned an empty answer".to_string(),
            });
        }

        Ok(QaResponse { answer, context, results })
    }

    /// Return a cached index for the topic or build a fresh one.
    async fn index_for(&self, topic: &str, config: &QaConfig) -> Result<Arc<FlatL2Index>> {
        let Some(cache) = &self.index_cache else {
            return self.build_index(topic, config).await.map(Arc::new);
        };

        let key = CacheKey::new(topic, config.max_length, config.overlap);
        if let Some(index) = cache.get(&key).await {
            debug!(topic, entries = index.len(), "index cache hit");
            return Ok(index);
        }

        let index = Arc::new(self.build_index(topic, config).await?);
        cache.insert(key, Arc::clone(&index)).await;
        Ok(index)
    }

    /// Fetch → segment → embed → index.
    async fn build_index(&self, topic: &str, config: &QaConfig) -> Result<FlatL2Index> {
        let chunker = config.chunker()?;

        // 1. Fetch; the only boundary where failures are converted
        let document = self.document_source.fetch(topic).await.map_err(|e| {
            warn!(topic, error = %e, "document fetch failed");
            RagError::RetrievalUnavailable { topic: topic.to_string(), reason: e.to_string() }
        })?;

        // 2. Segment
        let chunks = chunker.chunk(&document);
        if chunks.is_empty() {
            return Err(RagError::EmptyDocument { source_id: document.source_id });
        }

        // 3. Embed all chunks in one batch, order preserved
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await?;

        // 4. Fresh index for this document only
        let mut index = FlatL2Index::new();
        index.add(chunks, embeddings)?;

        info!(
            topic,
            source_id = %document.source_id,
            chunk_count = index.len(),
            dimension = ?index.dimension(),
            "built index"
        );
        Ok(index)
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// The three collaborators are required; `config` defaults to
/// [`QaConfig::default()`] and the index cache is optional.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    document_source: Option<Arc<dyn DocumentSource>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    answer_extractor: Option<Arc<dyn AnswerExtractor>>,
    index_cache: Option<Arc<IndexCache>>,
}

impl QaPipelineBuilder {
    /// Set the default request configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document source.
    pub fn document_source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.document_source = Some(source);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the answering service.
    pub fn answer_extractor(mut self, extractor: Arc<dyn AnswerExtractor>) -> Self {
        self.answer_extractor = Some(extractor);
        self
    }

    /// Reuse indexes across requests through `cache`.
    pub fn index_cache(mut self, cache: Arc<IndexCache>) -> Self {
        self.index_cache = Some(cache);
        self
    }

    /// Build the [`QaPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a collaborator is missing, or
    /// [`RagError::InvalidParameter`] if the configuration is malformed.
    pub fn build(self) -> Result<QaPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let document_source = self
            .document_source
            .ok_or_else(|| RagError::ConfigError("document_source is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let answer_extractor = self
            .answer_extractor
            .ok_or_else(|| RagError::ConfigError("answer_extractor is required".to_string()))?;

        Ok(QaPipeline {
            config,
            document_source,
            embedding_provider,
            answer_extractor,
            index_cache: self.index_cache,
        })
    }
}
