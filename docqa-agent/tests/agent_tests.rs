//! Orchestration tests with scripted generators and an in-process embedder.

mod common;

use std::sync::Arc;

use common::{LetterHistogramEmbedder, ScriptedGenerator, ZeroWidthEmbedder, loaded_session};
use docqa_agent::{
    AgentAction, AgentConfig, PlannerAgent, PlannerOutcome, QaPipeline, ResearchAgent, Stage,
    load_document,
};
use docqa_rag::{DocumentSession, RagConfig, RagError, RetrievedContext, TrustLabel};

fn top_one() -> RagConfig {
    RagConfig::builder().top_k(1).build().unwrap()
}

// ── Document loading ───────────────────────────────────────────────

#[tokio::test]
async fn empty_document_fails_at_chunking() {
    let mut session =
        DocumentSession::new(Arc::new(LetterHistogramEmbedder), RagConfig::default()).unwrap();
    let err = load_document(&mut session, "").await.unwrap_err();
    assert_eq!(err.stage, Stage::Chunking);
    assert!(matches!(err.source, RagError::EmptyInput));
}

#[tokio::test]
async fn whitespace_only_document_fails_at_chunking() {
    let mut session =
        DocumentSession::new(Arc::new(ZeroWidthEmbedder), RagConfig::default()).unwrap();
    // ZeroWidthEmbedder would fail at indexing if the text reached it.
    let err = load_document(&mut session, "  \n\t \n ").await.unwrap_err();
    assert_eq!(err.stage, Stage::Chunking);
    assert!(matches!(err.source, RagError::EmptyInput));
    assert!(session.handle().is_err());
}

#[tokio::test]
async fn bad_embeddings_fail_at_indexing() {
    let mut session =
        DocumentSession::new(Arc::new(ZeroWidthEmbedder), RagConfig::default()).unwrap();
    let err = load_document(&mut session, "some text").await.unwrap_err();
    assert_eq!(err.stage, Stage::Indexing);
    assert!(matches!(err.source, RagError::MalformedResponse { .. }));
    assert!(err.to_string().starts_with("indexing failed: "));
}

// ── QaPipeline ─────────────────────────────────────────────────────

#[tokio::test]
async fn answers_from_the_nearest_chunk() {
    let session = loaded_session(top_one()).await;
    let generator = ScriptedGenerator::new(["bbbb"]);
    let pipeline = QaPipeline::new(generator.clone());

    let answer = pipeline.ask(&session, "bbbb").await.unwrap();

    assert_eq!(answer.answer, "bbbb");
    assert_eq!(answer.results.len(), 1);
    assert_eq!(answer.results[0].chunk.index, 2);
    assert_eq!(answer.context, "b".repeat(100));

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(&"b".repeat(100)));
    assert!(prompts[0].contains("QUESTION:\nbbbb"));

    // Exact match: confidence 1, no shared tokens, so 0.7 overall.
    assert_eq!(answer.trust.retrieval_confidence, 1.0);
    assert_eq!(answer.trust.context_coverage, 0.0);
    assert_eq!(answer.trust.label, TrustLabel::High);
}

#[tokio::test]
async fn asking_before_loading_fails_at_retrieval() {
    let session =
        DocumentSession::new(Arc::new(LetterHistogramEmbedder), RagConfig::default()).unwrap();
    let generator = ScriptedGenerator::new(["unused"]);

    let err = QaPipeline::new(generator.clone()).ask(&session, "anything").await.unwrap_err();

    assert_eq!(err.stage, Stage::Retrieval);
    assert!(matches!(err.source, RagError::NotBuilt));
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn generator_failure_is_labelled_and_retryable() {
    let session = loaded_session(top_one()).await;
    let generator = ScriptedGenerator::failing(RagError::transport("scripted", "connection reset"));

    let err = QaPipeline::new(generator).ask(&session, "aaaa").await.unwrap_err();

    assert_eq!(err.stage, Stage::Generation);
    assert!(err.is_retryable());
    assert_eq!(
        err.to_string(),
        "generation failed: Transport failure (scripted): connection reset"
    );
}

// ── ResearchAgent ──────────────────────────────────────────────────

#[tokio::test]
async fn research_run_summarizes_then_extracts_actions() {
    let session = loaded_session(RagConfig::default()).await;
    let generator = ScriptedGenerator::new(["The document is about b.", "- Review the b section"]);
    let config = AgentConfig::default().with_retrieve_k(1).with_chunk_preview_chars(20);

    let report = ResearchAgent::new(generator.clone(), config).run(&session, "bbbb").await.unwrap();

    assert!(report.has_context());
    assert_eq!(report.plan.len(), 4);
    assert_eq!(report.summary.as_deref(), Some("The document is about b."));
    assert_eq!(report.actions.as_deref(), Some("- Review the b section"));
    assert!(report.trust.is_some());

    let expected_context = format!("[Chunk 1]\n{}...", "b".repeat(20));
    assert_eq!(report.context.context(), Some(expected_context.as_str()));

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].starts_with("Summarize"));
    assert!(prompts[0].contains(&expected_context));
    assert!(prompts[1].contains("actionable insights"));
    assert!(prompts[1].contains(&expected_context));
}

#[tokio::test]
async fn research_input_is_capped() {
    let session = loaded_session(RagConfig::default()).await;
    let generator = ScriptedGenerator::new(["summary", "actions"]);
    let config = AgentConfig::default().with_retrieve_k(1).with_max_prompt_context_chars(12);

    ResearchAgent::new(generator.clone(), config).run(&session, "bbbb").await.unwrap();

    let summary_prompt = &generator.prompts()[0];
    assert!(summary_prompt.ends_with("\n\n[Chunk 1]\nbb\n"));
}

#[tokio::test]
async fn empty_context_skips_generation() {
    let generator = ScriptedGenerator::new(["should not be used"]);
    let agent = ResearchAgent::new(generator.clone(), AgentConfig::default());

    let report = agent.analyze("anything", RetrievedContext::Empty).await.unwrap();

    assert!(!report.has_context());
    assert_eq!(report.summary, None);
    assert_eq!(report.actions, None);
    assert_eq!(report.trust, None);
    assert_eq!(generator.call_count(), 0);
}

// ── PlannerAgent ───────────────────────────────────────────────────

#[tokio::test]
async fn planner_recovers_from_one_malformed_reply() {
    let session = loaded_session(RagConfig::default()).await;
    let generator = ScriptedGenerator::new([
        "Let me think about this.",
        "```json\n{\"action\": \"RETRIEVE_CONTEXT\", \"input\": \"bbbb\"}\n```",
        "{\"action\": \"ANSWER\", \"input\": \"Which letter?\"}",
        "The letter b.",
        "{\"action\": \"FINISH\", \"input\": \"\"}",
    ]);
    let config = AgentConfig::default().with_retrieve_k(1);

    let run = PlannerAgent::new(generator.clone(), config).run(&session, "bbbb").await.unwrap();

    let actions: Vec<AgentAction> = run.memory.steps().iter().map(|s| s.action).collect();
    assert_eq!(
        actions,
        vec![AgentAction::RetrieveContext, AgentAction::Answer, AgentAction::Finish]
    );

    let PlannerOutcome::Finished { answer: Some(answer) } = &run.outcome else {
        panic!("expected a finished run with an answer, got {:?}", run.outcome);
    };
    assert_eq!(answer.text, "The letter b.");
    assert_eq!(answer.trust.retrieval_confidence, 1.0);

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 5);
    assert!(prompts[0].contains("PAST STEPS:\nNone\n"));
    assert!(prompts[1].contains("could not be parsed"));
    assert!(prompts[1].contains("Let me think about this."));
    assert!(prompts[2].contains("Action: RETRIEVE_CONTEXT | Observation: [Chunk 1]\nbbb"));
    assert!(prompts[3].contains("QUESTION:\nWhich letter?"));
}

#[tokio::test]
async fn planner_gives_up_after_the_second_malformed_reply() {
    let session = loaded_session(RagConfig::default()).await;
    let generator = ScriptedGenerator::new(["no json here", "still no json"]);

    let run = PlannerAgent::new(generator.clone(), AgentConfig::default())
        .run(&session, "goal")
        .await
        .unwrap();

    assert_eq!(run.outcome, PlannerOutcome::Unparsed { raw: "still no json".into() });
    assert!(run.memory.is_empty());
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn planner_stops_at_the_step_limit() {
    let session = loaded_session(RagConfig::default()).await;
    let answer = "{\"action\": \"ANSWER\", \"input\": \"q\"}";
    let generator = ScriptedGenerator::new([answer, answer]);
    let config = AgentConfig::default().with_max_steps(2);

    let run = PlannerAgent::new(generator.clone(), config).run(&session, "goal").await.unwrap();

    assert_eq!(run.outcome, PlannerOutcome::StepLimitReached { answer: None });
    assert_eq!(run.memory.len(), 2);
    assert!(run.memory.steps()[0].observation.contains("RETRIEVE_CONTEXT first"));
    assert_eq!(generator.call_count(), 2);
}
