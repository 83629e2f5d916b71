//! # wiki-rag-cli
//!
//! Command-line front end for [`wiki_rag`]: wires the Wikipedia source and
//! the Hugging Face services into a [`QaPipeline`] and runs single questions
//! or an interactive session.

pub mod cli;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, info};
use wiki_rag::{
    HuggingFaceAnswerer, HuggingFaceEmbeddingProvider, IndexCache, QaPipeline, WikipediaSource,
};

use crate::cli::{Cli, Command};

/// Build a pipeline from command-line settings.
///
/// The services are constructed once here and shared by every request the
/// pipeline serves.
pub fn build_pipeline(cli: &Cli, cache: Option<Arc<IndexCache>>) -> Result<QaPipeline> {
    let config = cli.retrieval.to_config()?;
    let services = &cli.services;
    let timeout = Duration::from_secs(services.timeout_secs);

    let token = services
        .hf_token
        .clone()
        .context("a Hugging Face token is required: pass --hf-token or set HF_TOKEN")?;

    let source = WikipediaSource::with_timeout(timeout)?.with_language(&services.language);
    let embedder = HuggingFaceEmbeddingProvider::new(token.clone())?
        .with_model(&services.embedding_model)
        .with_timeout(timeout)?;
    let answerer =
        HuggingFaceAnswerer::new(token)?.with_model(&services.qa_model).with_timeout(timeout)?;

    let mut builder = QaPipeline::builder()
        .config(config)
        .document_source(Arc::new(source))
        .embedding_provider(Arc::new(embedder))
        .answer_extractor(Arc::new(answerer));
    if let Some(cache) = cache {
        builder = builder.index_cache(cache);
    }
    Ok(builder.build()?)
}

/// Execute the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Ask { topic, question, show_context } => {
            let pipeline = build_pipeline(&cli, None)?;
            let (answer, context) = pipeline.answer(topic, question).await?;
            println!("{answer}");
            if *show_context && !context.is_empty() {
                println!("\n{context}");
            }
        }
        Command::Chat { topic } => {
            // Questions in one session share the topic's index.
            let pipeline = build_pipeline(&cli, Some(Arc::new(IndexCache::new())))?;
            chat(&pipeline, topic).await?;
        }
    }
    Ok(())
}

async fn chat(pipeline: &QaPipeline, topic: &str) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    info!(topic, "starting chat session");
    println!("Asking about '{topic}'. Ctrl-D to quit.");

    loop {
        let line = match editor.readline("? ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        editor.add_history_entry(question)?;

        if report_turn(pipeline.answer(topic, question).await) == Turn::Stop {
            break;
        }
    }
    Ok(())
}

/// What the chat loop does after one question.
#[derive(Debug, PartialEq, Eq)]
enum Turn {
    Continue,
    Stop,
}

/// Print the outcome of one question.
///
/// A failed request is reported and the session goes on; only a topic that
/// could not be loaded at all (empty context) ends it.
fn report_turn(outcome: wiki_rag::Result<(String, String)>) -> Turn {
    match outcome {
        Ok((answer, context)) => {
            println!("{answer}");
            // The topic itself could not be loaded; further questions would fail the same way.
            if context.is_empty() { Turn::Stop } else { Turn::Continue }
        }
        Err(e) => {
            error!(error = %e, "question failed");
            eprintln!("error: {e}");
            Turn::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use wiki_rag::RagError;

    use super::*;

    #[test]
    fn answered_question_keeps_session_open() {
        let turn = report_turn(Ok(("Paris".into(), "Paris is the capital.".into())));
        assert_eq!(turn, Turn::Continue);
    }

    #[test]
    fn service_failure_keeps_session_open() {
        let failures = [
            RagError::AnsweringFailure {
                provider: "HuggingFace".into(),
                message: "API returned 503 Service Unavailable".into(),
            },
            RagError::EmbeddingError { provider: "HuggingFace".into(), message: "timeout".into() },
        ];
        for failure in failures {
            assert_eq!(report_turn(Err(failure)), Turn::Continue);
        }
    }

    #[test]
    fn unloadable_topic_ends_session() {
        let turn = report_turn(Ok(("no document found for 'Qwxzv'".into(), String::new())));
        assert_eq!(turn, Turn::Stop);
    }
}
