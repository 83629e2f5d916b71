//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use wiki_rag::QaConfig;

/// Answer questions about a Wikipedia topic using retrieval over its article.
#[derive(Debug, Parser)]
#[command(name = "wiki-rag", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub retrieval: RetrievalArgs,

    #[command(flatten)]
    pub services: ServiceArgs,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a single question about a topic
    Ask {
        /// Wikipedia topic, e.g. "Artificial intelligence"
        #[arg(short, long)]
        topic: String,

        /// Question to answer from the topic's article
        #[arg(short, long)]
        question: String,

        /// Also print the retrieved context
        #[arg(long)]
        show_context: bool,
    },
    /// Ask repeated questions about one topic
    Chat {
        /// Wikipedia topic, e.g. "Artificial intelligence"
        #[arg(short, long)]
        topic: String,
    },
}

/// Chunking and retrieval parameters.
#[derive(Debug, Args)]
pub struct RetrievalArgs {
    /// Window size in words
    #[arg(long, env = "WIKI_RAG_MAX_LENGTH", default_value_t = 256, global = true)]
    pub max_length: usize,

    /// Words shared between consecutive windows
    #[arg(long, env = "WIKI_RAG_OVERLAP", default_value_t = 20, global = true)]
    pub overlap: usize,

    /// Number of chunks handed to the answering model
    #[arg(short = 'k', long, env = "WIKI_RAG_TOP_K", default_value_t = 3, global = true)]
    pub top_k: usize,
}

impl RetrievalArgs {
    /// Validate into a [`QaConfig`].
    pub fn to_config(&self) -> wiki_rag::Result<QaConfig> {
        QaConfig::builder()
            .max_length(self.max_length)
            .overlap(self.overlap)
            .top_k(self.top_k)
            .build()
    }
}

/// External service settings.
#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Wikipedia language edition
    #[arg(long, env = "WIKI_RAG_LANGUAGE", default_value = "en", global = true)]
    pub language: String,

    /// Hugging Face model used for embeddings
    #[arg(
        long,
        env = "WIKI_RAG_EMBEDDING_MODEL",
        default_value = wiki_rag::huggingface::DEFAULT_EMBEDDING_MODEL,
        global = true
    )]
    pub embedding_model: String,

    /// Hugging Face model used for extractive answering
    #[arg(
        long,
        env = "WIKI_RAG_QA_MODEL",
        default_value = wiki_rag::huggingface::DEFAULT_QA_MODEL,
        global = true
    )]
    pub qa_model: String,

    /// Hugging Face API token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true, global = true)]
    pub hf_token: Option<String>,

    /// Per-request timeout for external services, in seconds
    #[arg(long, env = "WIKI_RAG_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}
