//! Command execution inside the WordPress environment.
//!
//! A command such as `post list --format=ids` is wrapped into a wp-env
//! invocation, run through the [`ShellExecutor`] port, and its output is
//! cleaned and split into a [`CommandOutcome`].

pub mod output;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cassette::ReplayError;
use crate::config::EnvironmentSettings;
use crate::error::StepError;
use crate::ports::ShellExecutor;
use crate::target::PluginTarget;
use crate::variables::VariableStore;

/// Result of one executed command.
///
/// All three fields always come from the same execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Filtered output outside any error block.
    pub stdout: String,
    /// `Error:`/`Warning:` blocks, when extraction ran.
    pub stderr: String,
    /// Raw exit status of the environment tool.
    pub exit_code: i32,
}

/// Escapes `text` for use inside a single-quoted shell argument.
#[must_use]
pub fn escape_single_quoted(text: &str) -> String {
    text.replace('\'', r"'\''")
}

/// How a bare command is wrapped to run inside the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    env_binary: String,
    service: String,
    working_dir: String,
    tool: String,
}

impl Invocation {
    /// Builds the invocation for `target` in the given environment.
    #[must_use]
    pub fn new(env: &EnvironmentSettings, target: &dyn PluginTarget) -> Self {
        Self {
            env_binary: env.binary.clone(),
            service: env.service.clone(),
            working_dir: format!(
                "{}/{}",
                env.plugin_root.trim_end_matches('/'),
                target.plugin_slug()
            ),
            tool: target.tool_command().to_string(),
        }
    }

    /// Full shell command line for `command`.
    ///
    /// The tool's stderr is redirected into stdout inside the container so
    /// both arrive in one capture.
    #[must_use]
    pub fn command_line(&self, command: &str) -> String {
        format!(
            "{} run {} --env-cwd={} bash -c '{} {} 2>&1'",
            self.env_binary,
            self.service,
            self.working_dir,
            self.tool,
            escape_single_quoted(command)
        )
    }
}

/// Runs commands in the environment and classifies their output.
pub struct CommandRunner {
    shell: Arc<dyn ShellExecutor>,
    invocation: Invocation,
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner").field("invocation", &self.invocation).finish_non_exhaustive()
    }
}

impl CommandRunner {
    /// Creates a runner that executes through `shell`.
    #[must_use]
    pub fn new(shell: Arc<dyn ShellExecutor>, invocation: Invocation) -> Self {
        Self { shell, invocation }
    }

    /// Executes `command` and returns its classified outcome.
    ///
    /// `{NAME}` placeholders are resolved against `variables` first. Error
    /// blocks are separated into `stderr` when `tolerates_failure` is set or
    /// the command exits nonzero. A nonzero exit is never an error here.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Launch`] if the process cannot be started, or
    /// [`StepError::Replay`] if a replayed cassette does not match.
    pub fn execute(
        &self,
        command: &str,
        tolerates_failure: bool,
        variables: &VariableStore,
    ) -> Result<CommandOutcome, StepError> {
        let resolved = variables.resolve(command);
        let command_line = self.invocation.command_line(&resolved);
        debug!(command = %resolved, %command_line, "executing");

        let raw = self.shell.run(&command_line).map_err(|source| {
            match source.downcast::<ReplayError>() {
                Ok(replay) => StepError::Replay(*replay),
                Err(source) => StepError::Launch { command: command_line.clone(), source },
            }
        })?;

        if !raw.stderr.trim().is_empty() {
            debug!(stderr = %raw.stderr.trim_end(), "environment tool stderr");
        }

        let extract = tolerates_failure || raw.exit_code != 0;
        let classified = output::classify(&raw.stdout, extract);
        debug!(exit_code = raw.exit_code, "command finished");

        Ok(CommandOutcome {
            stdout: classified.stdout,
            stderr: classified.stderr,
            exit_code: raw.exit_code,
        })
    }
}
