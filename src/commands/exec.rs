//! `wpenv-bdd exec` command.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::runner::CommandOutcome;
use crate::session::TestSession;

/// Formats an outcome the way `exec` prints it.
#[must_use]
pub fn render(outcome: &CommandOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "STDOUT:\n{}", outcome.stdout);
    let _ = writeln!(out, "STDERR:\n{}", outcome.stderr);
    let _ = write!(out, "exit code: {}", outcome.exit_code);
    out
}

/// Runs `command` once and returns the rendered outcome.
///
/// # Errors
///
/// Returns an error if the command cannot be run, or exits nonzero
/// without `tolerate_failure`.
pub fn execute(
    config: &Config,
    ctx: &ServiceContext,
    command: &str,
    tolerate_failure: bool,
) -> Result<String, String> {
    let mut session = TestSession::from_config(config, Arc::clone(&ctx.shell));
    let result =
        if tolerate_failure { session.try_run(command) } else { session.run(command) };
    result.map_err(|e| e.to_string())?;
    Ok(render(session.outcome()))
}

/// Execute the `exec` command.
///
/// # Errors
///
/// Returns an error string if [`execute`] fails.
pub fn run(
    config: &Config,
    ctx: &ServiceContext,
    command: &str,
    tolerate_failure: bool,
) -> Result<(), String> {
    println!("{}", execute(config, ctx, command, tolerate_failure)?);
    Ok(())
}
