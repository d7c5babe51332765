//! Exit status and output of the `rag-quickstart` binary

mod common;

use assert_cmd::Command;
use common::{Failure, MockVertex, ANSWER, PROJECT};
use predicates::prelude::*;
use std::io::Write;
use std::process::Output;
use tempfile::NamedTempFile;
use vertex_rag_quickstart::config::env;

const ALL_VARS: [&str; 10] = [
    env::PROJECT,
    env::RAG_LOCATION,
    env::LOCATION,
    env::CORPUS_DISPLAY_NAME,
    env::IMPORT_PATHS,
    env::EMBEDDING_MODEL,
    env::GENERATION_MODEL,
    env::API_ENDPOINT,
    env::ACCESS_TOKEN,
    env::CREDENTIALS,
];

fn fast_polling() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[api]\npoll_interval_ms = 10\noperation_timeout_secs = 5").unwrap();
    file
}

fn command(mock: &MockVertex, config: &NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("rag-quickstart").unwrap();
    for var in ALL_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "off")
        .env(env::API_ENDPOINT, mock.base_url())
        .env(env::ACCESS_TOKEN, "ya29.cli-token")
        .arg("--config")
        .arg(config.path());
    cmd
}

async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[test]
fn test_help() {
    Command::cargo_bin("rag-quickstart")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--import-path"));
}

#[test]
fn test_bad_flag_value_exits_with_status_one() {
    Command::cargo_bin("rag-quickstart")
        .unwrap()
        .env(env::PROJECT, PROJECT)
        .args(["--top-k", "many"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--top-k"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_project_exits_before_any_request() {
    let mock = MockVertex::start(Failure::None).await;
    let config = fast_polling();
    let cmd = command(&mock, &config);

    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GOOGLE_CLOUD_PROJECT"), "stderr: {stderr}");
    assert!(mock.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_import_path_exits_before_any_request() {
    let mock = MockVertex::start(Failure::None).await;
    let config = fast_polling();
    let mut cmd = command(&mock, &config);
    cmd.env(env::PROJECT, PROJECT)
        .env(env::IMPORT_PATHS, "/tmp/local.pdf");

    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("/tmp/local.pdf"));
    assert!(mock.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_successful_run_prints_transcript() {
    let mock = MockVertex::start(Failure::None).await;
    let config = fast_polling();
    let mut cmd = command(&mock, &config);
    cmd.env(env::PROJECT, PROJECT)
        .env(env::IMPORT_PATHS, "gs://zt-docs/sp800-207.pdf");

    let output = run(cmd).await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Initializing Vertex AI API for project: demo-project"));
    assert!(stdout.contains("Files imported successfully."));
    assert!(stdout.contains("Generation Response:"));
    assert!(stdout.contains(ANSWER));

    let generate = mock.find(":generateContent");
    assert_eq!(generate.len(), 1);
    assert_eq!(
        generate[0].authorization.as_deref(),
        Some("Bearer ya29.cli-token")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_import_paths_warn_and_continue() {
    let mock = MockVertex::start(Failure::None).await;
    let config = fast_polling();
    let mut cmd = command(&mock, &config);
    cmd.env(env::PROJECT, PROJECT);

    let output = run(cmd).await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Warning: no import paths configured"));
    assert!(mock.find("/ragFiles:import").is_empty());
    assert_eq!(mock.find(":generateContent").len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remote_failure_exits_with_status_one() {
    let mock = MockVertex::start(Failure::Retrieve).await;
    let config = fast_polling();
    let mut cmd = command(&mock, &config);
    cmd.env(env::PROJECT, PROJECT)
        .env(env::IMPORT_PATHS, "gs://zt-docs/sp800-207.pdf");

    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Direct context retrieval failed"), "stderr: {stderr}");
    assert!(mock.find(":generateContent").is_empty());
}
