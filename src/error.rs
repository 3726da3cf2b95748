//! Error types raised by steps and the operations behind them.

use thiserror::Error;

use crate::cassette::ReplayError;
use crate::runner::CommandOutcome;

/// Failure of a single step.
///
/// Every variant is fatal to the current scenario; nothing is retried.
#[derive(Debug, Error)]
pub enum StepError {
    /// The process could not be started at all.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        /// Full invocation that was attempted.
        command: String,
        /// Underlying executor error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A command run with "must succeed" semantics exited nonzero.
    #[error(
        "command `{command}` failed with exit code {exit_code}\n\
         STDOUT:\n{stdout}\nSTDERR:\n{stderr}",
        exit_code = .outcome.exit_code,
        stdout = .outcome.stdout,
        stderr = .outcome.stderr
    )]
    CommandFailed {
        /// The command as written in the step, before variable resolution.
        command: String,
        /// What the command produced.
        outcome: CommandOutcome,
    },

    /// An expectation about the last outcome was not met.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// A step that takes a doc string was written without one.
    #[error("step `{0}` needs a doc string")]
    MissingDocString(String),

    /// "Repeat previous" was used before any command ran.
    #[error("no previous command to repeat")]
    NoPreviousCommand,

    /// Variable names are uppercase letters, digits and underscores.
    #[error("invalid variable name `{0}`: expected uppercase letters, digits and underscores")]
    InvalidVariableName(String),

    /// A regex expectation was not a valid delimited pattern.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// Pattern as supplied, delimiters included.
        pattern: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The replayed cassette does not match the commands being run.
    #[error("replay failed: {0}")]
    Replay(#[from] ReplayError),

    /// A multi-command maintenance operation failed part way.
    #[error("{operation} failed: {detail}")]
    Maintenance {
        /// Name of the operation, e.g. "database reset".
        operation: &'static str,
        /// Which command failed and what it printed.
        detail: String,
    },
}

/// An expectation about the last command outcome that did not hold.
///
/// Messages carry the expected and actual text verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssertionError {
    /// Generic expected/actual mismatch.
    #[error("{what}\nExpected:\n{expected}\nActual:\n{actual}")]
    Mismatch {
        /// Human description of the failed check.
        what: String,
        /// The expectation, after variable resolution.
        expected: String,
        /// The observed value.
        actual: String,
    },

    /// Exit code check failed; both streams are attached.
    #[error(
        "expected exit code {expected}, got {actual}\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}"
    )]
    ExitCode {
        /// Rendered expectation, e.g. `0` or `not 0`.
        expected: String,
        /// Observed exit code.
        actual: i32,
        /// Observed standard output.
        stdout: String,
        /// Observed structured error output.
        stderr: String,
    },

    /// Standard output could not be parsed as JSON.
    #[error("actual output is not valid JSON ({reason}):\n{actual}")]
    ActualNotJson {
        /// Parser message.
        reason: String,
        /// Output that failed to parse.
        actual: String,
    },

    /// The expectation could not be parsed as JSON.
    #[error("expected value is not valid JSON ({reason}):\n{expected}")]
    ExpectedNotJson {
        /// Parser message.
        reason: String,
        /// Expectation that failed to parse.
        expected: String,
    },
}
