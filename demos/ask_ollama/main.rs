//! # Ask Ollama Example
//!
//! Answers a question about a text file with a local Ollama server for both
//! embeddings and generation.
//!
//! Requires `ollama serve` with `all-minilm` and `llama3` pulled. Override
//! with `OLLAMA_URL`, `OLLAMA_EMBED_MODEL` and `OLLAMA_MODEL`.
//!
//! Run: `cargo run -p docqa-demos --example ask_ollama -- notes.txt "What is due on Friday?"`

use std::sync::Arc;

use anyhow::Context;
use docqa_agent::{OllamaGenerator, QaPipeline, load_document};
use docqa_rag::ollama::OllamaEmbeddingProvider;
use docqa_rag::{DocumentSession, RagConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().context("usage: ask_ollama <file> <question>")?;
    let question = args.next().context("usage: ask_ollama <file> <question>")?;
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;

    let mut session =
        DocumentSession::new(Arc::new(OllamaEmbeddingProvider::from_env()), RagConfig::default())?;
    let chunk_count = load_document(&mut session, &text).await?;
    println!("Indexed {chunk_count} chunks from {path}");

    let pipeline = QaPipeline::new(Arc::new(OllamaGenerator::from_env()));
    let answer = pipeline.ask(&session, &question).await?;

    println!("\n{}\n", answer.answer);
    println!("{} ({:.2})", answer.trust.label, answer.trust.combined_score);
    for result in &answer.results {
        println!("  chunk {} at distance {:.4}", result.chunk.index, result.distance);
    }
    Ok(())
}
