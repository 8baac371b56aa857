//! End-to-end batch runs against a scripted generative service.

use super::test_utils::{alternating_artifact, spec, RecordingPacer, Reply, ScriptedProvider};
use nbforge::artifact::store::read_artifact;
use nbforge::artifact::{
    validate, Artifact, ArtifactStore, Block, CategoryDirectories, ValidationPolicy,
};
use nbforge::batch::{BatchRunner, OutcomeStatus};
use nbforge::error::ErrorKind;
use nbforge::generation::{ArtifactGenerator, GenerationClient, PromptBuilder};
use nbforge::provider::CompletionOptions;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn runner(root: &Path) -> BatchRunner {
    BatchRunner::new(
        ArtifactStore::new(root),
        CategoryDirectories::default(),
        ValidationPolicy::default(),
    )
}

fn client(provider: ScriptedProvider) -> GenerationClient {
    GenerationClient::new(
        Box::new(provider),
        PromptBuilder::new(None, ValidationPolicy::default(), 60),
        CompletionOptions::default(),
    )
}

fn encoded(heading: &str, pairs: usize) -> String {
    alternating_artifact(heading, pairs).to_json_string().unwrap()
}

#[tokio::test]
async fn transport_failure_on_second_item_is_recorded_and_third_still_runs() {
    let dir = TempDir::new().unwrap();
    let specs = vec![
        spec("079", "RAG_Fundamentals"),
        spec("080", "Advanced_RAG_Techniques"),
        spec("081", "Prompt_Engineering_Advanced"),
    ];
    let provider = ScriptedProvider::new(vec![
        Reply::Content(encoded("# 079: RAG Fundamentals", 14)),
        Reply::Transport("connection reset by peer".to_string()),
        Reply::Content(encoded("# 081: Prompt Engineering Advanced", 14)),
    ]);
    let requests = provider.requests.clone();
    let pacer = RecordingPacer::default();

    let report = runner(dir.path())
        .run_batch(&client(provider), &pacer, &specs, Duration::from_secs(10))
        .await;

    assert_eq!(report.total(), 3);
    let succeeded: Vec<_> = report.successes().map(|o| o.id.as_str()).collect();
    let failed: Vec<_> = report.failures().map(|o| o.id.as_str()).collect();
    assert_eq!(succeeded, vec!["079", "081"]);
    assert_eq!(failed, vec!["080"]);
    assert!(report.outcomes[1]
        .error
        .as_deref()
        .unwrap()
        .contains("connection reset"));
    assert_eq!(report.outcomes[1].error_kind, Some(ErrorKind::Generation));

    assert_eq!(requests.lock().len(), 3);
    assert_eq!(pacer.pauses.lock().len(), 2);
    assert_eq!(pacer.total(), Duration::from_secs(20));

    assert!(dir
        .path()
        .join("08_Modern_AI/079_RAG_Fundamentals.ipynb")
        .is_file());
    assert!(!dir
        .path()
        .join("08_Modern_AI/080_Advanced_RAG_Techniques.ipynb")
        .exists());
}

#[tokio::test]
async fn every_failure_still_produces_a_full_report() {
    let dir = TempDir::new().unwrap();
    let specs = vec![spec("079", "A"), spec("080", "B")];
    let provider = ScriptedProvider::new(vec![
        Reply::Content("Here is your notebook!".to_string()),
        Reply::Content(String::new()),
    ]);

    let report = runner(dir.path())
        .run_batch(
            &client(provider),
            &RecordingPacer::default(),
            &specs,
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(report.failure_count, 2);
    assert_eq!(report.success_count, 0);
    assert_eq!(
        report.outcomes[0].error_kind,
        Some(ErrorKind::MalformedResponse)
    );
    assert_eq!(report.outcomes[1].error_kind, Some(ErrorKind::Generation));
    assert!(report.finished_at.is_some());
}

#[tokio::test]
async fn fenced_response_is_parsed_and_normalized_before_persisting() {
    let dir = TempDir::new().unwrap();
    let mut generated = alternating_artifact("# 079: RAG Fundamentals", 13);
    generated.metadata.clear();
    for block in generated.blocks.iter_mut().filter(|b| b.is_executable()) {
        block.execution_count = Some(7);
        block.outputs.push(json!({"output_type": "stream", "text": ["stale\n"]}));
    }
    let fenced = format!("```json\n{}```\n", generated.to_json_string().unwrap());
    let provider = ScriptedProvider::new(vec![Reply::Content(fenced)]);

    let report = runner(dir.path())
        .run_batch(
            &client(provider),
            &RecordingPacer::default(),
            &[spec("079", "RAG_Fundamentals")],
            Duration::from_secs(10),
        )
        .await;

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.title_conforms, Some(true));

    let persisted = read_artifact(outcome.path.as_ref().unwrap()).unwrap();
    assert_eq!(persisted.blocks.len(), 26);
    assert!(persisted
        .blocks
        .iter()
        .filter(|b| b.is_executable())
        .all(|b| b.execution_count.is_none() && b.outputs.is_empty()));
    assert_eq!(persisted.metadata["kernelspec"]["name"], "python3");
}

#[tokio::test]
async fn truncated_unparseable_output_mentions_token_ceiling() {
    let provider = ScriptedProvider::new(vec![Reply::Truncated(
        "{\"cells\": [{\"cell_type\": \"markdown\", \"source\": [\"# 079".to_string(),
    )]);

    let err = client(provider)
        .generate(&spec("079", "RAG_Fundamentals"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(err.to_string().contains("token ceiling"));
}

#[tokio::test]
async fn quality_warnings_do_not_fail_the_item() {
    let dir = TempDir::new().unwrap();
    let short = Artifact::new(vec![
        Block::narrative("No heading here"),
        Block::executable("x = 1"),
        Block::executable("y = 2"),
    ]);
    let provider = ScriptedProvider::new(vec![Reply::Content(short.to_json_string().unwrap())]);

    let report = runner(dir.path())
        .run_batch(
            &client(provider),
            &RecordingPacer::default(),
            &[spec("085", "Vector_Databases")],
            Duration::from_secs(10),
        )
        .await;

    let outcome = &report.outcomes[0];
    assert!(outcome.is_success());
    let warnings = outcome.warnings();
    assert!(warnings.contains(&"block_count_in_range"));
    assert!(warnings.contains(&"alternation_ok"));
    assert!(warnings.contains(&"title_heading"));
    assert_eq!(report.with_warnings(), 1);
}

#[test]
fn well_formed_artifact_without_project_marker_fails_only_that_check() {
    let mut artifact = alternating_artifact("# 079: RAG Fundamentals", 13);
    artifact.blocks[2].set_text("## Architecture\n\n```mermaid\ngraph LR\n  A --> B\n```");

    let result = validate(&artifact, &ValidationPolicy::default());
    assert_eq!(artifact.blocks.len(), 26);
    assert!(result.has_blocks);
    assert!(result.block_count_in_range);
    assert!(result.alternation_ok);
    assert!(result.no_oversized_executable);
    assert!(result.has_diagram_marker);
    assert!(!result.has_project_marker);
    assert_eq!(result.warnings(), vec!["has_project_marker"]);
}
