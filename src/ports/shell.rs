//! Shell executor port for running external commands.

use serde::{Deserialize, Serialize};

/// The output of a shell command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellOutput {
    /// The exit code of the process, or -1 when it was killed by a signal.
    pub exit_code: i32,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

/// Executes shell commands.
///
/// Abstracting shell execution lets a test suite be recorded against a
/// live environment and replayed later without one.
pub trait ShellExecutor: Send + Sync {
    /// Runs a command string in the system shell and returns its output.
    ///
    /// A nonzero exit status is reported through [`ShellOutput::exit_code`],
    /// never as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned at all.
    fn run(&self, command: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>>;
}
