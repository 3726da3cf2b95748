//! Recording adapter for the `ShellExecutor` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{ShellExecutor, ShellOutput};

/// Records shell interactions while delegating to an inner implementation.
pub struct RecordingShellExecutor {
    inner: Box<dyn ShellExecutor>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingShellExecutor {
    /// Creates a new recording shell executor wrapping the given implementation.
    pub fn new(inner: Box<dyn ShellExecutor>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
pub(crate) struct CommandInput<'a> {
    pub(crate) command: &'a str,
}

impl ShellExecutor for RecordingShellExecutor {
    fn run(&self, command: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.run(command);
        let input = CommandInput { command };
        record_result(&self.recorder, "shell", "run", &input, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::shell::LiveShellExecutor;
    use crate::cassette::format::Cassette;
    use serde_json::json;

    #[test]
    fn records_run_interaction() {
        let dir = tempfile::tempdir().unwrap();
        let cassette_path = dir.path().join("shell.cassette.yaml");

        let recorder =
            Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "test", "my-plugin")));

        let shell = RecordingShellExecutor::new(Box::new(LiveShellExecutor), Arc::clone(&recorder));
        let result = shell.run("echo hello");
        assert!(result.is_ok());

        recorder.lock().unwrap().save().unwrap();

        let cassette = Cassette::load(&cassette_path).unwrap();
        assert_eq!(cassette.interactions.len(), 1);
        let interaction = &cassette.interactions[0];
        assert_eq!(interaction.port, "shell");
        assert_eq!(interaction.method, "run");
        assert_eq!(interaction.input, json!({"command": "echo hello"}));
        assert_eq!(interaction.output["ok"]["stdout"], json!("hello\n"));
    }

    struct Unlaunchable;

    impl ShellExecutor for Unlaunchable {
        fn run(&self, _: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
            Err("no such file or directory".into())
        }
    }

    #[test]
    fn records_launch_failures() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            dir.path().join("shell.cassette.yaml"),
            "test",
            "my-plugin",
        )));

        let shell = RecordingShellExecutor::new(Box::new(Unlaunchable), Arc::clone(&recorder));
        assert!(shell.run("whatever").is_err());

        let path = recorder.lock().unwrap().save().unwrap();
        let cassette = Cassette::load(&path).unwrap();
        assert_eq!(cassette.interactions[0].output, json!({"err": "no such file or directory"}));
    }
}
