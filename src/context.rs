//! Service context bundling the shell port with optional recording.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::live::LiveShellExecutor;
use crate::adapters::recording::RecordingShellExecutor;
use crate::adapters::replaying::ReplayingShellExecutor;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::ports::shell::{ShellExecutor, ShellOutput};

/// The shell every session of a run executes through.
///
/// Constructors wire up different adapters (live, recording, replaying).
/// The shell is shared so that consecutive scenarios advance the same
/// recording or replay cursor.
pub struct ServiceContext {
    /// Shell executor for running commands.
    pub shell: Arc<dyn ShellExecutor>,
    /// Cassette recorder; written on [`ServiceContext::save_recording`] and on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext").field("recording", &self.recorder.is_some()).finish()
    }
}

impl ServiceContext {
    /// Creates a live context that runs commands for real.
    #[must_use]
    pub fn live() -> Self {
        Self::with_shell(Arc::new(LiveShellExecutor))
    }

    /// Creates a context around an arbitrary executor.
    #[must_use]
    pub fn with_shell(shell: Arc<dyn ShellExecutor>) -> Self {
        Self { shell, recorder: None }
    }

    /// Creates a live context that records every command to `path`.
    #[must_use]
    pub fn recording(path: &Path, plugin: &str) -> Self {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map_or_else(|| "wpenv-bdd".to_string(), |stem| stem.trim_end_matches(".cassette").to_string());
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, name, plugin)));
        let shell = RecordingShellExecutor::new(Box::new(LiveShellExecutor), Arc::clone(&recorder));
        Self { shell: Arc::new(shell), recorder: Some(recorder) }
    }

    /// Creates a context that answers every command from a cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        info!(
            cassette = %path.display(),
            interactions = cassette.interactions.len(),
            "replaying recorded commands"
        );
        let shell = ReplayingShellExecutor::new(CassetteReplayer::new(&cassette));
        Ok(Self::with_shell(Arc::new(shell)))
    }

    /// Creates the context selected by `config`'s cassette settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a replay cassette cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        match (&config.cassette.record, &config.cassette.replay) {
            (_, Some(replay)) => Self::replaying(replay),
            (Some(record), None) => Ok(Self::recording(record, &config.plugin)),
            (None, None) => Ok(Self::live()),
        }
    }

    /// Writes the cassette recorded so far, if recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn save_recording(&self) -> Result<Option<PathBuf>, String> {
        let Some(recorder) = &self.recorder else {
            return Ok(None);
        };
        let guard = recorder.lock().map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        let path = guard
            .save()
            .map_err(|e| format!("Failed to write cassette {}: {e}", guard.path().display()))?;
        Ok(Some(path))
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        if let Err(e) = self.save_recording() {
            warn!("failed to write cassette: {e}");
        }
    }
}

/// Executor used when no usable configuration exists.
///
/// Every command fails to launch with the configuration problem, so the
/// first step of each scenario reports it.
#[derive(Debug, Clone)]
pub struct UnconfiguredShellExecutor {
    reason: String,
}

impl UnconfiguredShellExecutor {
    /// Creates an executor that always fails with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl ShellExecutor for UnconfiguredShellExecutor {
    fn run(&self, _command: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("harness not configured: {}", self.reason).into())
    }
}
