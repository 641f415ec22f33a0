//! Binary-level tests for argument handling and failure reporting.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn airlift() -> Command {
    Command::cargo_bin("airlift").unwrap()
}

#[test]
fn help_shows_the_about_line() {
    airlift()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Publish over-the-air updates for Expo and React Native apps",
        ));
}

#[test]
fn version_flag_prints_the_crate_version() {
    airlift()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommands_are_rejected() {
    airlift()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn update_requires_an_initialized_project() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();

    airlift()
        .current_dir(dir.path())
        .arg("update")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not initialized"))
        .stdout(predicate::str::contains("Recovery suggestions"))
        .stdout(predicate::str::contains("airlift init"));
}

#[test]
fn quiet_mode_keeps_errors_but_drops_suggestions() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();

    airlift()
        .current_dir(dir.path())
        .args(["update", "--quiet"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not initialized"))
        .stdout(predicate::str::is_empty());
}

// Worker threads keep the mock server responsive while the test thread
// blocks on the child process.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_message_flag_falls_back_to_the_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/proj_1/update"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();
    std::fs::write(
        dir.path().join("airlift.json"),
        format!(
            r#"{{"apiBaseUrl": "{}", "protocol": "expo", "projectID": "proj_1"}}"#,
            server.uri()
        ),
    )
    .unwrap();

    // The child's stdin is closed, so reaching the prompt fails loudly
    // instead of publishing an update with an empty message.
    airlift()
        .current_dir(dir.path())
        .args(["update", "--message", ""])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stdin closed"));
}

#[test]
fn init_requires_an_npm_package() {
    let dir = tempfile::tempdir().unwrap();

    airlift()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No package.json found"));
}
