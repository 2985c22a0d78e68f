//! End-to-end pipeline scenarios against a scripted model client.

use super::{CancellationToken, ComposeFn, Pipeline, PipelineBuilder, StageSpec};
use crate::config::PipelineConfig;
use crate::core::{FieldValue, UserInput};
use crate::errors::{ModelError, ScribeflowError, TemplateError};
use crate::model::{InvocationOptions, SelectionCriteria};
use crate::persona::PersonaRegistry;
use crate::schema::{FieldSpec, OutputSchema};
use crate::testing::MockModelClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("scribeflow=debug")
        .with_test_writer()
        .try_init();
}

fn bind_user_content() -> ComposeFn {
    Arc::new(|inputs| {
        let mut bindings = HashMap::new();
        bindings.insert("content".to_string(), inputs.user_content().to_string());
        Ok(bindings)
    })
}

fn bind_story_from(stage: &'static str) -> ComposeFn {
    Arc::new(move |inputs| {
        let story = inputs
            .artifact(stage)
            .map_err(|err| TemplateError::binding(err.to_string()))?
            .text()
            .ok_or_else(|| TemplateError::binding(format!("'{stage}' artifact is not text")))?
            .to_string();
        let mut bindings = HashMap::new();
        bindings.insert("story".to_string(), story);
        Ok(bindings)
    })
}

fn craft_stage() -> StageSpec {
    StageSpec::new(
        "craft",
        "storyteller",
        "Write a short story, at most {word_target} words, for this request: {content}",
        bind_user_content(),
        OutputSchema::Text,
    )
}

fn review_stage() -> StageSpec {
    StageSpec::new(
        "review",
        "reviewer",
        "Review this story and reply with 'verdict' and 'issues' fields:\n{story}",
        bind_story_from("craft"),
        OutputSchema::record([FieldSpec::text("verdict"), FieldSpec::text_list("issues")]),
    )
    .with_dependency("craft")
}

fn approve_stage() -> StageSpec {
    StageSpec::new(
        "approve",
        "editor",
        "Finalize the story given the review.\n{story}",
        bind_story_from("craft"),
        OutputSchema::Text,
    )
    .with_dependencies(["craft", "review"])
}

fn story_pipeline(
    stages: Vec<StageSpec>,
    config: PipelineConfig,
    client: Arc<MockModelClient>,
) -> Pipeline {
    let registry = PersonaRegistry::with_builtins();
    let mut builder = PipelineBuilder::new("story");
    for stage in stages {
        builder = builder.stage(stage).unwrap();
    }
    builder.build(&registry, config, client).unwrap()
}

#[tokio::test]
async fn test_single_stage_story_scenario() {
    init_logging();
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("Sir Aldric, the bravest knight of the realm, rode at dawn.");

    let options = InvocationOptions::new(SelectionCriteria::Auto, 0.9).unwrap();
    let pipeline = story_pipeline(
        vec![craft_stage().with_options(options).goal()],
        PipelineConfig::default(),
        Arc::clone(&client),
    );

    let report = pipeline
        .run(UserInput::new("Tell me a story about a brave knight"))
        .await
        .unwrap();

    assert!(report.goal().text().unwrap().contains("knight"));
    assert_eq!(report.pipeline, "story");

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].persona, "storyteller");
    assert!((requests[0].temperature - 0.9).abs() < f64::EPSILON);
    assert!(requests[0]
        .prompt
        .contains("Tell me a story about a brave knight"));
    // The orchestrator injects the default word target into the prompt.
    assert!(requests[0].prompt.contains("at most 100 words"));
}

#[tokio::test]
async fn test_parse_failure_aborts_run_before_later_stages() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("A tale of valor.");
    client.enqueue_reply("The model rambles on without any structured fields at all.");

    let pipeline = story_pipeline(
        vec![craft_stage(), review_stage(), approve_stage().goal()],
        PipelineConfig::default(),
        Arc::clone(&client),
    );

    let err = pipeline
        .run(UserInput::new("Tell me a story"))
        .await
        .unwrap_err();

    match err {
        ScribeflowError::Parse { ref stage, ref source } => {
            assert_eq!(stage, "review");
            assert_eq!(source.field, "verdict");
            assert!(!source.snippet.is_empty());
        }
        other => panic!("expected parse failure, got: {other}"),
    }
    // "approve" never executed.
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_input_word_cap_truncates_prompt_content() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("A story.");

    let long_input = (1..=250)
        .map(|i| format!("w{i}"))
        .collect::<Vec<_>>()
        .join(" ");

    let stage = StageSpec::new(
        "craft",
        "storyteller",
        "{content}",
        bind_user_content(),
        OutputSchema::Text,
    )
    .goal();
    let pipeline = story_pipeline(
        vec![stage],
        PipelineConfig::default().with_input_word_cap(100),
        Arc::clone(&client),
    );

    pipeline.run(UserInput::new(long_input)).await.unwrap();

    let prompt = client.requests()[0].prompt.clone();
    let words: Vec<&str> = prompt.split(' ').collect();
    assert_eq!(words.len(), 100);
    assert_eq!(words[0], "w1");
    assert_eq!(words[99], "w100");
}

#[tokio::test]
async fn test_later_stage_sees_exact_upstream_text() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("Sir Aldric rode at dawn, and the realm held its breath.");
    client.enqueue_reply(r#"{"verdict": "approve", "issues": []}"#);

    let pipeline = story_pipeline(
        vec![craft_stage(), review_stage().goal()],
        PipelineConfig::default(),
        Arc::clone(&client),
    );

    let report = pipeline.run(UserInput::new("A knight story")).await.unwrap();

    // The review prompt embeds exactly the text the craft stage published.
    let review_prompt = &client.requests()[1].prompt;
    assert!(review_prompt.contains("Sir Aldric rode at dawn, and the realm held its breath."));

    assert_eq!(
        report
            .goal()
            .field("verdict")
            .and_then(FieldValue::as_text),
        Some("approve")
    );
    // Full provenance: both artifacts travel with the report.
    assert_eq!(report.artifacts.len(), 2);
    assert!(report.artifacts.contains_key("craft"));
}

#[tokio::test]
async fn test_stages_after_goal_never_execute() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("A story.");

    let pipeline = story_pipeline(
        vec![craft_stage().goal(), review_stage()],
        PipelineConfig::default(),
        Arc::clone(&client),
    );

    let report = pipeline.run(UserInput::new("A story request")).await.unwrap();

    assert_eq!(report.goal().stage, "craft");
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_cancelled_run_starts_no_stage() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("never used");

    let pipeline = story_pipeline(
        vec![craft_stage().goal()],
        PipelineConfig::default(),
        Arc::clone(&client),
    );

    let token = CancellationToken::new();
    token.cancel("caller gave up");

    let err = pipeline
        .run_cancellable(UserInput::new("A story request"), &token)
        .await
        .unwrap_err();

    assert!(matches!(err, ScribeflowError::Cancelled { .. }));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_invocation_times_out() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_delayed_reply("too late", Duration::from_secs(60));

    let pipeline = story_pipeline(
        vec![craft_stage().goal()],
        PipelineConfig::default().with_invocation_timeout(Duration::from_secs(5)),
        Arc::clone(&client),
    );

    let err = pipeline
        .run(UserInput::new("A story request"))
        .await
        .unwrap_err();

    match err {
        ScribeflowError::Model { ref stage, ref source } => {
            assert_eq!(stage, "craft");
            assert!(matches!(source, ModelError::Timeout { .. }));
        }
        other => panic!("expected timeout, got: {other}"),
    }
}

#[tokio::test]
async fn test_unavailable_transport_fails_run() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_failure(ModelError::unavailable("connection refused"));

    let pipeline = story_pipeline(
        vec![craft_stage().goal()],
        PipelineConfig::default(),
        Arc::clone(&client),
    );

    let err = pipeline
        .run(UserInput::new("A story request"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some("craft"));
    assert!(matches!(
        err,
        ScribeflowError::Model {
            source: ModelError::Unavailable { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_stage_word_target_override_reaches_prompt() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("A story.");

    let pipeline = story_pipeline(
        vec![craft_stage().with_word_target(40).goal()],
        PipelineConfig::default(),
        Arc::clone(&client),
    );

    pipeline.run(UserInput::new("A story request")).await.unwrap();

    assert!(client.requests()[0].prompt.contains("at most 40 words"));
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let client = Arc::new(MockModelClient::new());
    client.enqueue_reply("First story about a knight.");
    client.enqueue_reply("Second story about a dragon.");

    let pipeline = Arc::new(story_pipeline(
        vec![craft_stage().goal()],
        PipelineConfig::default(),
        Arc::clone(&client),
    ));

    let a = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.run(UserInput::new("knight")).await }
    });
    let b = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.run(UserInput::new("dragon")).await }
    });

    let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.artifacts.len(), 1);
    assert_eq!(b.artifacts.len(), 1);
}
