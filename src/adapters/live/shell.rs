//! Live shell executor using `std::process::Command`.

use std::process::Command;

use tracing::debug;

use crate::ports::shell::{ShellExecutor, ShellOutput};

/// Runs command lines through `sh -c` and waits for them to exit.
///
/// A process killed by a signal has no exit code and is reported as `-1`,
/// which step assertions treat as an ordinary failure.
pub struct LiveShellExecutor;

impl ShellExecutor for LiveShellExecutor {
    fn run(&self, command: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
        debug!(command, "spawning shell");
        let output = Command::new("sh").arg("-c").arg(command).output()?;
        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
