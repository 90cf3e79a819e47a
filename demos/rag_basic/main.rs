//! # Retrieval Basic Example
//!
//! Loads a short document into a `DocumentSession`, retrieves chunks for a
//! few queries and scores a canned answer against the retrieved context.
//!
//! Uses the deterministic `HashEmbedder`, so it runs with **no model server
//! and no API keys**.
//!
//! Run: `cargo run -p docqa-demos --example rag_basic`

use std::sync::Arc;

use docqa_demos::HashEmbedder;
use docqa_rag::{ContextOptions, DocumentSession, RagConfig};

const DOCUMENT: &str = "\
Rust is a systems programming language focused on safety, speed and concurrency. \
It achieves memory safety without a garbage collector through its ownership system.\n\
Python is a high-level interpreted language known for readability. It is widely used \
in data science, web development and automation.\n\
Retrieval-augmented generation combines a retrieval system with a language model. \
Documents are chunked, embedded and stored in a vector index. At query time the \
nearest chunks are retrieved and handed to the model as context.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // -- 1. Configure ------------------------------------------------------
    let config = RagConfig::builder().chunk_size(160).chunk_overlap(40).top_k(2).build()?;

    // -- 2. Load the document ----------------------------------------------
    let mut session = DocumentSession::new(Arc::new(HashEmbedder::new(128)), config)?;
    let chunk_count = session.load_text(DOCUMENT).await?;
    println!("Loaded document: {chunk_count} chunks");

    // -- 3. Retrieve -------------------------------------------------------
    let options = ContextOptions::default().numbered().with_max_chunk_chars(80);
    for query in ["memory safety without a garbage collector", "data science", "vector index"] {
        println!("\nQuery: \"{query}\"");
        let results = session.retrieve(query).await?;
        for result in results.iter() {
            println!(
                "  chunk {:>2} [{}, {})  distance {:.4}",
                result.chunk.index, result.chunk.start, result.chunk.end, result.distance
            );
        }
        println!("{}", results.to_context(&options));
    }

    // -- 4. Score an answer ------------------------------------------------
    let question = "How does Rust stay memory safe?";
    let results = session.retrieve(question).await?;
    let context = results.to_context(&ContextOptions::default());
    let answer = "Rust achieves memory safety through its ownership system.";
    let trust = session.score_trust(answer, &context, &results.distances());

    println!("\nQ: {question}\nA: {answer}");
    println!(
        "{} (score {:.2}; retrieval {:.2}, coverage {:.2})",
        trust.label, trust.combined_score, trust.retrieval_confidence, trust.context_coverage
    );
    Ok(())
}
