//! # Offline QA Example
//!
//! Runs the full pipeline over an in-memory document with a deterministic
//! `HashEmbeddingProvider` and a keyword-overlap answerer, so it runs with
//! **zero API keys** and no network.
//!
//! Run: `cargo run -p wiki-rag --example offline_qa`

use std::sync::Arc;

use async_trait::async_trait;
use wiki_rag::{
    Answer, AnswerExtractor, Document, DocumentSource, EmbeddingProvider, QaConfig, QaPipeline,
    SourceError,
};

// ---------------------------------------------------------------------------
// HashEmbeddingProvider — bag-of-words hashed into a fixed number of buckets
// ---------------------------------------------------------------------------

struct HashEmbeddingProvider {
    dimensions: usize,
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> wiki_rag::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.hash(text)).collect())
    }

    fn name(&self) -> &str {
        "hash"
    }
}

impl HashEmbeddingProvider {
    fn hash(&self, text: &str) -> Vec<f32> {
        let mut emb = vec![0.0f32; self.dimensions];
        for word in text.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if word.len() < 4 {
                continue;
            }
            let bucket =
                word.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            emb[bucket % self.dimensions] += 1.0;
        }
        // L2-normalise so documents of different length are comparable.
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        emb
    }
}

// ---------------------------------------------------------------------------
// SentenceAnswerer — returns the context sentence sharing most question words
// ---------------------------------------------------------------------------

struct SentenceAnswerer;

#[async_trait]
impl AnswerExtractor for SentenceAnswerer {
    async fn extract(&self, question: &str, context: &str) -> wiki_rag::Result<Answer> {
        let keywords: Vec<String> = question
            .split_whitespace()
            .filter(|w| w.len() > 3)
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .collect();

        let best = context
            .split(". ")
            .max_by_key(|sentence| {
                let lower = sentence.to_lowercase();
                keywords.iter().filter(|kw| lower.contains(kw.as_str())).count()
            })
            .unwrap_or_default();

        Ok(Answer {
            text: best.trim().to_string(),
            score: None,
            span: None,
            context: context.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// StaticSource — one built-in article
// ---------------------------------------------------------------------------

struct StaticSource;

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, topic: &str) -> Result<Document, SourceError> {
        if !topic.eq_ignore_ascii_case("rust") {
            return Err(SourceError::NotFound(topic.to_string()));
        }
        Ok(Document::new(
            "Rust",
            "Rust is a general-purpose programming language emphasizing performance, type safety, \
             and concurrency. It enforces memory safety without a garbage collector. \
             The borrow checker tracks the lifetime of references at compile time. \
             Rust was started by Graydon Hoare at Mozilla Research in 2006. \
             Version 1.0 was released in May 2015. \
             Cargo is the official build system and package manager of Rust. \
             Crates are published to the crates.io registry.",
        ))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Small windows so this short article splits into several chunks.
    let config = QaConfig::builder().max_length(20).overlap(5).top_k(2).build()?;

    let pipeline = QaPipeline::builder()
        .config(config)
        .document_source(Arc::new(StaticSource))
        .embedding_provider(Arc::new(HashEmbeddingProvider { dimensions: 64 }))
        .answer_extractor(Arc::new(SentenceAnswerer))
        .build()?;

    let questions = [
        ("Rust", "Who started the Rust language?"),
        ("Rust", "What is the package manager called?"),
        ("Go", "Who designed Go?"),
    ];

    for (topic, question) in questions {
        println!("\n[{topic}] {question}");
        let (answer, context) = pipeline.answer(topic, question).await?;
        println!("  answer: {answer}");
        if !context.is_empty() {
            println!("  context:\n{context}");
        }
    }

    Ok(())
}
