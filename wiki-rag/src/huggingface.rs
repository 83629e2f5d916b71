//! Hugging Face inference adapters for embeddings and extractive answering.
//!
//! This module is only available when the `huggingface` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::answer::AnswerExtractor;
use crate::document::{Answer, AnswerSpan};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default hosted inference endpoint.
const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// The default sentence embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-mpnet-base-v2";

/// The default extractive question-answering model.
pub const DEFAULT_QA_MODEL: &str = "deepset/roberta-base-squad2";

/// The default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP plumbing for both adapters.
#[derive(Clone)]
struct InferenceClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
    model: String,
    provider: &'static str,
}

impl InferenceClient {
    fn new(token: String, model: &str, provider: &'static str) -> Result<Self> {
        if token.is_empty() {
            return Err(RagError::ConfigError(format!("{provider}: API token must not be empty")));
        }
        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT)?,
            token,
            base_url: DEFAULT_BASE_URL.into(),
            model: model.into(),
            provider,
        })
    }

    fn token_from_env(provider: &'static str) -> Result<String> {
        std::env::var("HF_TOKEN").map_err(|_| {
            RagError::ConfigError(format!("{provider}: HF_TOKEN environment variable not set"))
        })
    }

    /// POST `body` to `url` and return the response text, or an error message.
    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> std::result::Result<String, String> {
        let response =
            self.client.post(url).bearer_auth(&self.token).json(body).send().await.map_err(|e| {
                error!(provider = self.provider, error = %e, "request failed");
                format!("request failed: {e}")
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| format!("failed to read response: {e}"))?;

        if !status.is_success() {
            let detail =
                serde_json::from_str::<ErrorResponse>(&text).map(|e| e.error).unwrap_or(text);
            error!(provider = self.provider, %status, "API error");
            return Err(format!("API returned {status}: {detail}"));
        }
        Ok(text)
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))
}

// ── Inference API request/response types ───────────────────────────

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [&'a str],
}

#[derive(Serialize)]
struct QuestionAnsweringRequest<'a> {
    inputs: QuestionAnsweringInputs<'a>,
}

#[derive(Serialize)]
struct QuestionAnsweringInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Deserialize, Debug, PartialEq)]
struct QuestionAnsweringOutput {
    answer: String,
    score: Option<f32>,
    start: Option<usize>,
    end: Option<usize>,
}

/// The QA pipeline answers with a single object or a ranked list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionAnsweringResponse {
    Single(QuestionAnsweringOutput),
    Ranked(Vec<QuestionAnsweringOutput>),
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn parse_embeddings(body: &str, expected: usize) -> std::result::Result<Vec<Vec<f32>>, String> {
    let vectors: Vec<Vec<f32>> = serde_json::from_str(body).map_err(|e| {
        format!("failed to parse response as one pooled vector per input: {e}")
    })?;
    if vectors.len() != expected {
        return Err(format!("expected {expected} embeddings, got {}", vectors.len()));
    }
    Ok(vectors)
}

fn parse_answer(body: &str) -> std::result::Result<QuestionAnsweringOutput, String> {
    match serde_json::from_str(body).map_err(|e| format!("failed to parse response: {e}"))? {
        QuestionAnsweringResponse::Single(output) => Ok(output),
        QuestionAnsweringResponse::Ranked(outputs) => {
            outputs.into_iter().next().ok_or_else(|| "API returned no answers".to_string())
        }
    }
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Hugging Face feature-extraction pipeline.
///
/// # Configuration
///
/// - `model` – defaults to `sentence-transformers/all-mpnet-base-v2`.
/// - `token` – from the constructor or the `HF_TOKEN` environment variable.
/// - `base_url` – defaults to the hosted inference router.
///
/// # Example
///
/// ```rust,ignore
/// use wiki_rag::huggingface::HuggingFaceEmbeddingProvider;
///
/// let provider = HuggingFaceEmbeddingProvider::from_env()?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct HuggingFaceEmbeddingProvider {
    inner: InferenceClient,
}

impl HuggingFaceEmbeddingProvider {
    const PROVIDER: &'static str = "HuggingFace";

    /// Create a new provider with the given API token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            inner: InferenceClient::new(token.into(), DEFAULT_EMBEDDING_MODEL, Self::PROVIDER)?,
        })
    }

    /// Create a new provider using the `HF_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(InferenceClient::token_from_env(Self::PROVIDER)?)
    }

    /// Set the model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.inner.model = model.into();
        self
    }

    /// Set the inference endpoint base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.inner.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.inner.client = build_client(timeout)?;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/pipeline/feature-extraction", self.inner.base_url, self.inner.model)
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = Self::PROVIDER,
            batch_size = texts.len(),
            model = %self.inner.model,
            "embedding batch"
        );

        let embedding_error =
            |message: String| RagError::EmbeddingError { provider: Self::PROVIDER.into(), message };

        let body = self
            .inner
            .post(&self.endpoint(), &FeatureExtractionRequest { inputs: texts })
            .await
            .map_err(embedding_error)?;

        parse_embeddings(&body, texts.len()).map_err(embedding_error)
    }

    fn name(&self) -> &str {
        Self::PROVIDER
    }
}

// ── Answer extractor ───────────────────────────────────────────────

/// An [`AnswerExtractor`] backed by the Hugging Face question-answering pipeline.
///
/// Defaults to `deepset/roberta-base-squad2`.
pub struct HuggingFaceAnswerer {
    inner: InferenceClient,
}

impl HuggingFaceAnswerer {
    const PROVIDER: &'static str = "HuggingFace";

    /// Create a new answerer with the given API token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self { inner: InferenceClient::new(token.into(), DEFAULT_QA_MODEL, Self::PROVIDER)? })
    }

    /// Create a new answerer using the `HF_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(InferenceClient::token_from_env(Self::PROVIDER)?)
    }

    /// Set the model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.inner.model = model.into();
        self
    }

    /// Set the inference endpoint base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.inner.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.inner.client = build_client(timeout)?;
        Ok(self)
    }
}

#[async_trait]
impl AnswerExtractor for HuggingFaceAnswerer {
    async fn extract(&self, question: &str, context: &str) -> Result<Answer> {
        debug!(
            provider = Self::PROVIDER,
            model = %self.inner.model,
            context_len = context.len(),
            "extracting answer"
        );

        let answering_failure = |message: String| RagError::AnsweringFailure {
            provider: Self::PROVIDER.into(),
            message,
        };

        let url = format!("{}/{}", self.inner.base_url, self.inner.model);
        let request =
            QuestionAnsweringRequest { inputs: QuestionAnsweringInputs { question, context } };
        let body = self.inner.post(&url, &request).await.map_err(answering_failure)?;
        let output = parse_answer(&body).map_err(answering_failure)?;

        let span = match (output.start, output.end) {
            (Some(start), Some(end)) => Some(AnswerSpan { start, end }),
            _ => None,
        };
        Ok(Answer { text: output.answer, score: output.score, span, context: context.to_string() })
    }
}
