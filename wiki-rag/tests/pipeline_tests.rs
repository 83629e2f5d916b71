//! End-to-end pipeline tests with in-process collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiki_rag::{
    Answer, AnswerExtractor, CONTEXT_SEPARATOR, Document, DocumentSource, EmbeddingProvider,
    IndexCache, QaConfig, QaPipeline, RagError, SourceError,
};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MapSource {
    documents: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MapSource {
    fn with(topic: &str, text: &str) -> Self {
        let mut source = Self::default();
        source.documents.insert(topic.to_string(), text.to_string());
        source
    }
}

#[async_trait]
impl DocumentSource for MapSource {
    async fn fetch(&self, topic: &str) -> Result<Document, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(topic)
            .map(|text| Document::new(topic, text.clone()))
            .ok_or_else(|| SourceError::NotFound(topic.to_string()))
    }
}

/// Places texts on a line: "alpha" at 0, "beta" at 1, "gamma" at 5, anything else at 4.
#[derive(Default)]
struct KeywordEmbedder {
    batch_sizes: Mutex<Vec<usize>>,
    drop_last: bool,
    fail: bool,
    /// Embed single-text calls (queries) with an extra dimension.
    wide_queries: bool,
}

impl KeywordEmbedder {
    fn position(text: &str) -> f32 {
        if text.contains("gamma") {
            5.0
        } else if text.contains("beta") {
            1.0
        } else if text.contains("alpha") {
            0.0
        } else {
            4.0
        }
    }

    fn calls(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> wiki_rag::Result<Vec<Vec<f32>>> {
        self.batch_sizes.lock().unwrap().push(texts.len());
        if self.fail {
            return Err(RagError::EmbeddingError {
                provider: self.name().into(),
                message: "service down".into(),
            });
        }
        let mut vectors: Vec<Vec<f32>> =
            texts.iter().map(|t| vec![Self::position(t), 0.0]).collect();
        if self.drop_last && texts.len() > 1 {
            vectors.pop();
        }
        if self.wide_queries && texts.len() == 1 {
            vectors.iter_mut().for_each(|v| v.push(0.0));
        }
        Ok(vectors)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Answers with the first word of the context.
#[derive(Default)]
struct FirstWordAnswerer {
    contexts: Mutex<Vec<String>>,
    blank: bool,
}

impl FirstWordAnswerer {
    fn calls(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerExtractor for FirstWordAnswerer {
    async fn extract(&self, _question: &str, context: &str) -> wiki_rag::Result<Answer> {
        self.contexts.lock().unwrap().push(context.to_string());
        let text = if self.blank {
            String::new()
        } else {
            context.split_whitespace().next().unwrap_or_default().to_string()
        };
        Ok(Answer { text, score: Some(0.5), span: None, context: context.to_string() })
    }
}

struct Harness {
    source: Arc<MapSource>,
    embedder: Arc<KeywordEmbedder>,
    answerer: Arc<FirstWordAnswerer>,
    pipeline: QaPipeline,
}

fn harness(source: MapSource, embedder: KeywordEmbedder, answerer: FirstWordAnswerer) -> Harness {
    harness_with_cache(source, embedder, answerer, None)
}

fn harness_with_cache(
    source: MapSource,
    embedder: KeywordEmbedder,
    answerer: FirstWordAnswerer,
    cache: Option<Arc<IndexCache>>,
) -> Harness {
    let source = Arc::new(source);
    let embedder = Arc::new(embedder);
    let answerer = Arc::new(answerer);
    let config = QaConfig::builder().max_length(2).overlap(0).top_k(3).build().unwrap();
    let mut builder = QaPipeline::builder()
        .config(config)
        .document_source(source.clone())
        .embedding_provider(embedder.clone())
        .answer_extractor(answerer.clone());
    if let Some(cache) = cache {
        builder = builder.index_cache(cache);
    }
    Harness { source, embedder, answerer, pipeline: builder.build().unwrap() }
}

const TEXT: &str = "alpha alpha beta beta gamma gamma";

fn greek() -> Harness {
    harness(
        MapSource::with("Greek", TEXT),
        KeywordEmbedder::default(),
        FirstWordAnswerer::default(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn context_is_in_rank_order_not_document_order() {
    let h = greek();

    let (answer, context) = h.pipeline.answer("Greek", "which letter?").await.unwrap();

    let expected = ["gamma gamma", "beta beta", "alpha alpha"].join(CONTEXT_SEPARATOR);
    assert_eq!(context, expected);
    assert_eq!(answer, "gamma");
    assert_eq!(h.answerer.contexts.lock().unwrap().as_slice(), &[expected]);
}

#[tokio::test]
async fn chunks_embedded_in_one_batch_and_query_in_one_call() {
    let h = greek();

    h.pipeline.run("Greek", "which letter?").await.unwrap();

    assert_eq!(h.embedder.calls(), vec![3, 1]);
}

#[tokio::test]
async fn response_exposes_ranked_results() {
    let h = greek();

    let response = h.pipeline.run("Greek", "which letter?").await.unwrap();

    let ordinals: Vec<usize> = response.results.iter().map(|r| r.chunk.ordinal).collect();
    let distances: Vec<f32> = response.results.iter().map(|r| r.distance).collect();
    assert_eq!(ordinals, vec![2, 1, 0]);
    assert_eq!(distances, vec![1.0, 9.0, 16.0]);
    assert_eq!(response.answer.score, Some(0.5));
}

#[tokio::test]
async fn top_k_limits_context() {
    let h = greek();
    let config = QaConfig::builder().max_length(2).overlap(0).top_k(1).build().unwrap();

    let (_, context) = h.pipeline.answer_with("Greek", "which letter?", &config).await.unwrap();

    assert_eq!(context, "gamma gamma");
}

#[tokio::test]
async fn fetch_failure_yields_message_and_no_service_calls() {
    let h = harness(MapSource::default(), KeywordEmbedder::default(), FirstWordAnswerer::default());

    let (answer, context) = h.pipeline.answer("Atlantis", "where is it?").await.unwrap();

    assert!(answer.contains("Atlantis"));
    assert!(context.is_empty());
    assert!(h.embedder.calls().is_empty());
    assert_eq!(h.answerer.calls(), 0);
}

#[tokio::test]
async fn fetch_failure_is_typed_on_run() {
    let h = harness(MapSource::default(), KeywordEmbedder::default(), FirstWordAnswerer::default());

    let err = h.pipeline.run("Atlantis", "where is it?").await.unwrap_err();

    assert!(matches!(err, RagError::RetrievalUnavailable { topic, .. } if topic == "Atlantis"));
}

#[tokio::test]
async fn blank_document_stops_before_embedding() {
    let source = MapSource::with("Void", " \n ");
    let h = harness(source, KeywordEmbedder::default(), FirstWordAnswerer::default());

    let err = h.pipeline.run("Void", "anything?").await.unwrap_err();
    assert!(matches!(err, RagError::EmptyDocument { source_id } if source_id == "Void"));

    let (answer, context) = h.pipeline.answer("Void", "anything?").await.unwrap();
    assert!(!answer.is_empty());
    assert!(context.is_empty());
    assert!(h.embedder.calls().is_empty());
}

#[tokio::test]
async fn embedding_failure_propagates() {
    let embedder = KeywordEmbedder { fail: true, ..Default::default() };
    let h = harness(MapSource::with("Greek", TEXT), embedder, FirstWordAnswerer::default());

    let err = h.pipeline.answer("Greek", "which letter?").await.unwrap_err();

    assert!(matches!(err, RagError::EmbeddingError { .. }));
    assert_eq!(h.answerer.calls(), 0);
}

#[tokio::test]
async fn short_embedding_batch_is_a_count_mismatch() {
    let embedder = KeywordEmbedder { drop_last: true, ..Default::default() };
    let h = harness(MapSource::with("Greek", TEXT), embedder, FirstWordAnswerer::default());

    let err = h.pipeline.answer("Greek", "which letter?").await.unwrap_err();

    assert!(matches!(err, RagError::CountMismatch { chunks: 3, embeddings: 2 }));
}

#[tokio::test]
async fn query_dimension_mismatch_propagates() {
    let embedder = KeywordEmbedder { wide_queries: true, ..Default::default() };
    let h = harness(MapSource::with("Greek", TEXT), embedder, FirstWordAnswerer::default());

    let err = h.pipeline.run("Greek", "which letter?").await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));

    let err = h.pipeline.answer("Greek", "which letter?").await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { .. }));
    assert_eq!(h.answerer.calls(), 0);
}

#[tokio::test]
async fn blank_answer_is_an_answering_failure() {
    let answerer = FirstWordAnswerer { blank: true, ..Default::default() };
    let h = harness(MapSource::with("Greek", TEXT), KeywordEmbedder::default(), answerer);

    let err = h.pipeline.answer("Greek", "which letter?").await.unwrap_err();

    assert!(matches!(err, RagError::AnsweringFailure { .. }));
}

#[tokio::test]
async fn invalid_request_parameters_propagate() {
    let h = greek();
    let config = QaConfig { max_length: 4, overlap: 4, top_k: 3 };

    let err = h.pipeline.answer_with("Greek", "which letter?", &config).await.unwrap_err();

    assert!(matches!(err, RagError::InvalidParameter(_)));
    assert_eq!(h.source.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn without_cache_every_request_rebuilds() {
    let h = greek();

    h.pipeline.run("Greek", "first?").await.unwrap();
    h.pipeline.run("Greek", "second?").await.unwrap();

    assert_eq!(h.source.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(h.embedder.calls(), vec![3, 1, 3, 1]);
}

#[tokio::test]
async fn cache_reuses_index_until_parameters_change() {
    let cache = Arc::new(IndexCache::new());
    let h = harness_with_cache(
        MapSource::with("Greek", TEXT),
        KeywordEmbedder::default(),
        FirstWordAnswerer::default(),
        Some(cache.clone()),
    );

    h.pipeline.run("Greek", "first?").await.unwrap();
    h.pipeline.run("Greek", "second?").await.unwrap();
    assert_eq!(h.source.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(h.embedder.calls(), vec![3, 1, 1]);

    let wider = QaConfig::builder().max_length(3).overlap(1).top_k(3).build().unwrap();
    h.pipeline.run_with("Greek", "third?", &wider).await.unwrap();
    assert_eq!(h.source.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn missing_collaborator_is_a_config_error() {
    let result = QaPipeline::builder()
        .document_source(Arc::new(MapSource::default()))
        .embedding_provider(Arc::new(KeywordEmbedder::default()))
        .build();

    assert!(matches!(result, Err(RagError::ConfigError(msg)) if msg.contains("answer_extractor")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_isolated() {
    let mut source = MapSource::with("Greek", TEXT);
    source.documents.insert("Latin".into(), "beta beta alpha alpha".into());
    let h = harness(source, KeywordEmbedder::default(), FirstWordAnswerer::default());
    let pipeline = Arc::new(h.pipeline);

    let mut handles = Vec::new();
    for i in 0..8 {
        let pipeline = Arc::clone(&pipeline);
        let topic = if i % 2 == 0 { "Greek" } else { "Latin" };
        handles.push(tokio::spawn(async move { (topic, pipeline.answer(topic, "q?").await) }));
    }

    for handle in handles {
        let (topic, result) = handle.await.unwrap();
        let (answer, _) = result.unwrap();
        match topic {
            "Greek" => assert_eq!(answer, "gamma"),
            _ => assert_eq!(answer, "beta"),
        }
    }
    assert_eq!(h.source.fetches.load(Ordering::SeqCst), 8);
}
