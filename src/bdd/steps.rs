//! Step definitions.
//!
//! Commands are written in backticks and passed to the configured tool,
//! e.g. ``When I run `plugin list --status=active` ``. Multi-line
//! expectations and plugin sources come from the step's doc string.

use std::str::FromStr;

use cucumber::gherkin::Step;
use cucumber::{given, then, when};

use super::WpEnvWorld;
use crate::assertions::Stream;
use crate::error::StepError;
use crate::session::PathKind;

/// "should" or "should not".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polarity {
    negated: bool,
}

impl Polarity {
    /// Whether the expectation is inverted.
    #[must_use]
    pub fn negated(self) -> bool {
        self.negated
    }
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "should" => Ok(Self { negated: false }),
            "should not" => Ok(Self { negated: true }),
            other => Err(format!("expected `should` or `should not`, got {other:?}")),
        }
    }
}

fn docstring(step: &Step) -> Result<&str, StepError> {
    step.docstring.as_deref().ok_or_else(|| StepError::MissingDocString(step.value.clone()))
}

#[given(regex = r"^I run `(.+)`$")]
#[when(regex = r"^I run `(.+)`$")]
fn run_command(world: &mut WpEnvWorld, command: String) -> Result<(), StepError> {
    world.session.run(&command)
}

#[given(regex = r"^I try `(.+)`$")]
#[when(regex = r"^I try `(.+)`$")]
fn try_command(world: &mut WpEnvWorld, command: String) -> Result<(), StepError> {
    world.session.try_run(&command)
}

#[when(regex = r"^I run the previous command again$")]
fn run_previous(world: &mut WpEnvWorld) -> Result<(), StepError> {
    world.session.repeat_previous()
}

#[given(regex = r"^I save STDOUT as \{([^}]*)\}$")]
#[when(regex = r"^I save STDOUT as \{([^}]*)\}$")]
fn save_stdout(world: &mut WpEnvWorld, name: String) -> Result<(), StepError> {
    world.session.save_output(&name)
}

#[then(regex = r"^(STDOUT|STDERR) (should|should not) be:$")]
fn stream_equals(
    world: &mut WpEnvWorld,
    stream: Stream,
    polarity: Polarity,
    step: &Step,
) -> Result<(), StepError> {
    world.session.expect().equals(stream, docstring(step)?, polarity.negated())
}

#[then(regex = r"^(STDOUT|STDERR) (should|should not) contain:$")]
fn stream_contains(
    world: &mut WpEnvWorld,
    stream: Stream,
    polarity: Polarity,
    step: &Step,
) -> Result<(), StepError> {
    world.session.expect().contains(stream, docstring(step)?, polarity.negated())
}

#[then(regex = r"^(STDOUT|STDERR) (should|should not) match (.+)$")]
fn stream_matches(
    world: &mut WpEnvWorld,
    stream: Stream,
    polarity: Polarity,
    pattern: String,
) -> Result<(), StepError> {
    world.session.expect().matches(stream, &pattern, polarity.negated())
}

#[then(regex = r"^(STDOUT|STDERR) (should|should not) be empty$")]
fn stream_empty(world: &mut WpEnvWorld, stream: Stream, polarity: Polarity) -> Result<(), StepError> {
    world.session.expect().is_empty(stream, polarity.negated())
}

#[then(regex = r"^the return code (should|should not) be (-?\d+)$")]
fn return_code(world: &mut WpEnvWorld, polarity: Polarity, code: i32) -> Result<(), StepError> {
    world.session.expect().exit_code(code, polarity.negated())
}

#[then(regex = r"^STDOUT should be JSON containing:$")]
fn stdout_json(world: &mut WpEnvWorld, step: &Step) -> Result<(), StepError> {
    world.session.expect().json_subset(docstring(step)?)
}

#[then(regex = r"^the (file|directory) (\S+) (should|should not) exist$")]
fn path_exists(
    world: &mut WpEnvWorld,
    kind: PathKind,
    path: String,
    polarity: Polarity,
) -> Result<(), StepError> {
    world.session.assert_path(&path, kind, polarity.negated())
}

#[given(regex = r"^a clean database$")]
#[when(regex = r"^I reset the database$")]
fn clean_database(world: &mut WpEnvWorld) -> Result<(), StepError> {
    world.session.reset_database()
}

#[given(regex = r"^a must-use plugin (\S+) containing:$")]
fn inject_plugin(world: &mut WpEnvWorld, name: String, step: &Step) -> Result<(), StepError> {
    world.session.inject_mu_plugin(&name, docstring(step)?)
}

#[when(regex = r"^I remove the must-use plugin (\S+)$")]
fn remove_plugin(world: &mut WpEnvWorld, name: String) -> Result<(), StepError> {
    world.session.remove_mu_plugin(&name)
}
