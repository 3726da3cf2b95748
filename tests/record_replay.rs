//! Record-replay round-trip integration test.
//!
//! A scenario is recorded through the recording adapter over a scripted
//! shell, then the same scenario is replayed from the written cassette
//! with no shell at all.

use std::path::Path;
use std::sync::{Arc, Mutex};

use wpenv_bdd::adapters::recording::RecordingShellExecutor;
use wpenv_bdd::assertions::Stream;
use wpenv_bdd::cassette::{Cassette, CassetteRecorder, ReplayError};
use wpenv_bdd::config::Config;
use wpenv_bdd::context::ServiceContext;
use wpenv_bdd::ports::{ShellExecutor, ShellOutput};
use wpenv_bdd::{StepError, TestSession};

/// Answers each command by the first rule whose needle it contains.
struct Scripted(Vec<(&'static str, &'static str, i32)>);

impl ShellExecutor for Scripted {
    fn run(&self, command: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
        let (_, stdout, exit_code) = self
            .0
            .iter()
            .find(|(needle, _, _)| command.contains(needle))
            .ok_or_else(|| format!("unscripted command: {command}"))?;
        Ok(ShellOutput { exit_code: *exit_code, stdout: (*stdout).to_string(), stderr: String::new() })
    }
}

fn config() -> Config {
    Config { plugin: "hello-dolly".into(), ..Config::default() }
}

fn scripted() -> Scripted {
    Scripted(vec![
        (
            "post create",
            "ℹ Starting 'wp post create' on the cli container.\n42\n✔ Ran `wp post create` in 'cli'. (in 1s 204ms)\n",
            0,
        ),
        ("post get 42", "{\"ID\":42,\"post_title\":\"Hello\",\"post_status\":\"publish\"}\n", 0),
        ("post get 999", "Error: Could not find the post with ID 999.\n", 1),
    ])
}

/// The scenario under test; identical for recording and replay.
fn scenario(session: &mut TestSession) -> Result<(), StepError> {
    session.run("post create --post_title='Hello' --porcelain")?;
    session.save_output("POST_ID")?;
    session.run("post get {POST_ID} --format=json")?;
    session.expect().json_subset(r#"{"ID": {POST_ID}, "post_title": "Hello"}"#)?;
    session.try_run("post get 999")?;
    session.expect().exit_code(1, false)?;
    session.expect().contains(Stream::Stderr, "Could not find the post", false)?;
    session.expect().is_empty(Stream::Stdout, false)
}

fn record(path: &Path) {
    let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "posts", "hello-dolly")));
    let shell = RecordingShellExecutor::new(Box::new(scripted()), Arc::clone(&recorder));
    let mut session = TestSession::from_config(&config(), Arc::new(shell));
    scenario(&mut session).unwrap();
    recorder.lock().unwrap().save().unwrap();
}

#[test]
fn recorded_scenario_replays_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.cassette.yaml");
    record(&path);

    let cassette = Cassette::load(&path).unwrap();
    assert_eq!(cassette.plugin, "hello-dolly");
    assert_eq!(cassette.interactions.len(), 3);
    assert!(cassette.interactions[1].input["command"]
        .as_str()
        .unwrap()
        .contains("'wp post get 42 --format=json 2>&1'"));

    for _ in 0..2 {
        let ctx = ServiceContext::replaying(&path).unwrap();
        let mut session = TestSession::from_config(&config(), Arc::clone(&ctx.shell));
        scenario(&mut session).unwrap();
        assert_eq!(session.variables().get("POST_ID"), Some("42"));
    }
}

#[test]
fn replay_rejects_a_different_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.cassette.yaml");
    record(&path);

    let ctx = ServiceContext::replaying(&path).unwrap();
    let mut session = TestSession::from_config(&config(), Arc::clone(&ctx.shell));
    let err = session.run("post list").unwrap_err();
    assert!(matches!(err, StepError::Replay(ReplayError::OutOfSync { .. })));
}

#[test]
fn replay_reports_exhaustion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.cassette.yaml");
    record(&path);

    let ctx = ServiceContext::replaying(&path).unwrap();
    let mut session = TestSession::from_config(&config(), Arc::clone(&ctx.shell));
    scenario(&mut session).unwrap();
    let err = session.repeat_previous().unwrap_err();
    assert!(matches!(err, StepError::Replay(ReplayError::Exhausted { .. })));
}
