//! Assertions over the last command outcome.
//!
//! Text expectations are resolved against the scenario variables before
//! comparison. Every failure carries the expected and actual values.

pub mod json;
pub mod pattern;

use std::fmt;
use std::str::FromStr;

use crate::error::{AssertionError, StepError};
use crate::runner::CommandOutcome;
use crate::variables::VariableStore;

/// Which captured stream an assertion reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Output outside error blocks.
    Stdout,
    /// `Error:`/`Warning:` blocks.
    Stderr,
}

impl FromStr for Stream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STDOUT" => Ok(Self::Stdout),
            "STDERR" => Ok(Self::Stderr),
            other => Err(format!("unknown stream {other:?}, expected STDOUT or STDERR")),
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "STDOUT",
            Self::Stderr => "STDERR",
        })
    }
}

/// Assertions against one outcome with one set of variables.
#[derive(Debug, Clone, Copy)]
pub struct Expectations<'a> {
    outcome: &'a CommandOutcome,
    variables: &'a VariableStore,
}

fn negation(negated: bool) -> &'static str {
    if negated {
        " not"
    } else {
        ""
    }
}

impl<'a> Expectations<'a> {
    /// Creates assertions over `outcome`.
    #[must_use]
    pub fn new(outcome: &'a CommandOutcome, variables: &'a VariableStore) -> Self {
        Self { outcome, variables }
    }

    fn stream(&self, stream: Stream) -> &'a str {
        match stream {
            Stream::Stdout => &self.outcome.stdout,
            Stream::Stderr => &self.outcome.stderr,
        }
    }

    fn mismatch(what: String, expected: String, actual: &str) -> StepError {
        AssertionError::Mismatch { what, expected, actual: actual.to_string() }.into()
    }

    /// Trimmed equality.
    ///
    /// # Errors
    ///
    /// Returns an assertion error if the outcome does not (or, when
    /// `negated`, does) equal `expected`.
    pub fn equals(&self, stream: Stream, expected: &str, negated: bool) -> Result<(), StepError> {
        let expected = self.variables.resolve(expected);
        let actual = self.stream(stream);
        if (actual.trim() == expected.trim()) == negated {
            return Err(Self::mismatch(
                format!("{stream} should{} be equal to the expected text", negation(negated)),
                expected,
                actual,
            ));
        }
        Ok(())
    }

    /// Trimmed containment.
    ///
    /// # Errors
    ///
    /// Returns an assertion error if the outcome does not (or, when
    /// `negated`, does) contain `expected`.
    pub fn contains(&self, stream: Stream, expected: &str, negated: bool) -> Result<(), StepError> {
        let expected = self.variables.resolve(expected);
        let actual = self.stream(stream);
        if actual.trim().contains(expected.trim()) == negated {
            return Err(Self::mismatch(
                format!("{stream} should{} contain the expected text", negation(negated)),
                expected,
                actual,
            ));
        }
        Ok(())
    }

    /// Regex match against the untrimmed stream.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidPattern`] for a malformed pattern, or an
    /// assertion error if the match result is not the expected one.
    pub fn matches(&self, stream: Stream, pattern: &str, negated: bool) -> Result<(), StepError> {
        let written = self.variables.resolve(pattern);
        let regex = pattern::compile(&written)?;
        let actual = self.stream(stream);
        if regex.is_match(actual) == negated {
            return Err(Self::mismatch(
                format!("{stream} should{} match the pattern", negation(negated)),
                written,
                actual,
            ));
        }
        Ok(())
    }

    /// Trimmed emptiness.
    ///
    /// # Errors
    ///
    /// Returns an assertion error if the stream is not empty (or, when
    /// `negated`, is empty).
    pub fn is_empty(&self, stream: Stream, negated: bool) -> Result<(), StepError> {
        let actual = self.stream(stream);
        if actual.trim().is_empty() == negated {
            let expected = if negated { "(anything)" } else { "(nothing)" };
            return Err(Self::mismatch(
                format!("{stream} should{} be empty", negation(negated)),
                expected.to_string(),
                actual,
            ));
        }
        Ok(())
    }

    /// Exit code equality.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::ExitCode`], with both streams attached, if
    /// the exit code does not (or, when `negated`, does) equal `expected`.
    pub fn exit_code(&self, expected: i32, negated: bool) -> Result<(), StepError> {
        if (self.outcome.exit_code == expected) == negated {
            return Err(AssertionError::ExitCode {
                expected: if negated { format!("not {expected}") } else { expected.to_string() },
                actual: self.outcome.exit_code,
                stdout: self.outcome.stdout.clone(),
                stderr: self.outcome.stderr.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Standard output contains at least the keys and values of `expected`.
    ///
    /// # Errors
    ///
    /// Returns an assertion error if either side is not JSON or a value
    /// in `expected` is missing or different in the output.
    pub fn json_subset(&self, expected: &str) -> Result<(), StepError> {
        let expected = self.variables.resolve(expected);
        json::assert_subset(&self.outcome.stdout, &expected)?;
        Ok(())
    }
}
