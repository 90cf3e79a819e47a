//! `docqa`: ask questions about a plain-text document from the terminal.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use docqa_agent::{
    AgentConfig, GeneratorBackend, PlannerAgent, PlannerOutcome, QaAnswer, QaPipeline,
    ResearchAgent, Stage, StageError, TextGenerator, load_document,
};
use docqa_rag::ollama::OllamaEmbeddingProvider;
use docqa_rag::{DocumentSession, RagConfig, TrustScore, chunk_text};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "docqa",
    version,
    about = "Document question answering grounded in retrieved context"
)]
struct Cli {
    /// Language model backend
    #[arg(long, value_enum, global = true, default_value_t = Backend::Ollama)]
    backend: Backend,

    /// Characters per chunk
    #[arg(long, global = true, default_value_t = 300)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, global = true, default_value_t = 50)]
    overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, global = true, default_value_t = 5)]
    top_k: usize,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how a document is chunked (no network access)
    Chunks { file: PathBuf },
    /// Answer one question from the document
    Ask { file: PathBuf, question: String },
    /// Summarize the document and extract action items for a goal
    Analyze {
        file: PathBuf,
        goal: String,
        /// Chunks retrieved for the goal (defaults to RETRIEVE_K or 4)
        #[arg(long)]
        retrieve_k: Option<usize>,
    },
    /// Let the model plan retrieval and answering step by step
    Plan {
        file: PathBuf,
        goal: String,
        /// Upper bound on planner steps
        #[arg(long, default_value_t = 5)]
        max_steps: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Ollama,
    Groq,
}

impl From<Backend> for GeneratorBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Ollama => GeneratorBackend::Ollama,
            Backend::Groq => GeneratorBackend::Groq,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = rag_config(&cli)?;

    match cli.command {
        Command::Chunks { file } => {
            let text = read_document(&file)?;
            let chunks = chunk_text(&text, config.chunk_size, config.chunk_overlap)
                .map_err(StageError::at(Stage::Chunking))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
            } else {
                for chunk in &chunks {
                    println!(
                        "{:>4}  [{}, {})  {} chars",
                        chunk.index,
                        chunk.start,
                        chunk.end,
                        chunk.char_len()
                    );
                }
                println!("{} chunks", chunks.len());
            }
        }
        Command::Ask { file, question } => {
            let session = open_session(&file, config).await?;
            let answer = QaPipeline::new(generator(cli.backend)?).ask(&session, &question).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}\n", answer.answer);
                print_trust(&answer.trust);
                print_sources(&answer);
            }
        }
        Command::Analyze { file, goal, retrieve_k } => {
            let session = open_session(&file, config).await?;
            let mut agent_config = AgentConfig::from_env();
            if let Some(k) = retrieve_k {
                agent_config = agent_config.with_retrieve_k(k);
            }
            let agent = ResearchAgent::new(generator(cli.backend)?, agent_config);
            let report = agent.run(&session, &goal).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("PLAN");
                for (i, step) in report.plan.iter().enumerate() {
                    println!("  {}. {step}", i + 1);
                }
                match (&report.summary, &report.actions) {
                    (Some(summary), Some(actions)) => {
                        println!("\nSUMMARY\n{summary}\n\nACTIONABLE INSIGHTS\n{actions}\n");
                    }
                    _ => println!("\nNo document context was retrieved for this goal.\n"),
                }
                if let Some(trust) = &report.trust {
                    print_trust(trust);
                }
            }
        }
        Command::Plan { file, goal, max_steps } => {
            let session = open_session(&file, config).await?;
            let agent_config = AgentConfig::from_env().with_max_steps(max_steps);
            let agent = PlannerAgent::new(generator(cli.backend)?, agent_config);
            let run = agent.run(&session, &goal).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&run)?);
            } else {
                println!("STEPS\n{}\n", run.memory.format());
                match &run.outcome {
                    PlannerOutcome::Unparsed { raw } => {
                        println!("The planner reply could not be parsed:\n{raw}");
                    }
                    outcome => match outcome.answer() {
                        Some(answer) => {
                            println!("{}\n", answer.text);
                            print_trust(&answer.trust);
                        }
                        None => println!("The planner finished without an answer."),
                    },
                }
            }
        }
    }
    Ok(())
}

/// Chunking settings from the global flags; a bad combination fails at chunking.
fn rag_config(cli: &Cli) -> Result<RagConfig> {
    let config = RagConfig::builder()
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.overlap)
        .top_k(cli.top_k)
        .build()
        .map_err(StageError::at(Stage::Chunking))?;
    Ok(config)
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow!("extraction failed: {}: {e}", path.display()))
}

async fn open_session(path: &Path, config: RagConfig) -> Result<DocumentSession> {
    let text = read_document(path)?;
    let mut session = DocumentSession::new(Arc::new(OllamaEmbeddingProvider::from_env()), config)
        .map_err(StageError::at(Stage::Chunking))?;
    let chunk_count = load_document(&mut session, &text).await?;
    info!(session.id = %session.id(), chunk_count, path = %path.display(), "document loaded");
    Ok(session)
}

fn generator(backend: Backend) -> Result<Arc<dyn TextGenerator>> {
    let generator = GeneratorBackend::from(backend)
        .generator_from_env()
        .map_err(StageError::at(Stage::Generation))?;
    Ok(generator)
}

fn print_trust(trust: &TrustScore) {
    println!(
        "{} (score {:.2}; retrieval {:.2}, coverage {:.2})",
        trust.label, trust.combined_score, trust.retrieval_confidence, trust.context_coverage
    );
}

fn print_sources(answer: &QaAnswer) {
    println!("\nRETRIEVED CONTEXT");
    for (rank, result) in answer.results.iter().enumerate() {
        println!(
            "  {}. chunk {:>2} [{}, {})  distance {:.4}",
            rank + 1,
            result.chunk.index,
            result.chunk.start,
            result.chunk.end,
            result.distance
        );
    }
}
