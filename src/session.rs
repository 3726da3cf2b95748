//! Per-scenario state and the operations steps perform on it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::assertions::Expectations;
use crate::config::{Config, EnvironmentSettings, ResetSettings};
use crate::database;
use crate::error::StepError;
use crate::mu_plugins;
use crate::php;
use crate::ports::ShellExecutor;
use crate::runner::{CommandOutcome, CommandRunner, Invocation};
use crate::target::{ConfiguredTarget, PluginTarget};
use crate::variables::VariableStore;

/// Marker printed by the existence probe when the path exists.
const EXISTS_MARKER: &str = "EXISTS";
/// Marker printed by the existence probe when it does not.
const MISSING_MARKER: &str = "MISSING";

/// Kind of filesystem entry an existence check looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

impl PathKind {
    fn php_check(self) -> &'static str {
        match self {
            Self::File => "is_file",
            Self::Directory => "is_dir",
        }
    }
}

impl FromStr for PathKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "directory" | "dir" | "folder" => Ok(Self::Directory),
            other => Err(format!("unknown path kind {other:?}, expected file or directory")),
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PreviousCommand {
    command: String,
    tolerates_failure: bool,
}

/// State of one scenario: the last outcome, variables, the last command
/// and any must-use plugins it injected.
///
/// Commands run one at a time; each replaces the outcome wholesale.
#[derive(Debug)]
pub struct TestSession {
    runner: CommandRunner,
    target: Arc<dyn PluginTarget>,
    reset: ResetSettings,
    outcome: CommandOutcome,
    variables: VariableStore,
    previous: Option<PreviousCommand>,
    mu_plugins: Vec<String>,
}

impl TestSession {
    /// Creates a session for `target` running through `shell`.
    #[must_use]
    pub fn new(
        shell: Arc<dyn ShellExecutor>,
        environment: &EnvironmentSettings,
        target: Arc<dyn PluginTarget>,
        reset: ResetSettings,
    ) -> Self {
        let invocation = Invocation::new(environment, target.as_ref());
        Self {
            runner: CommandRunner::new(shell, invocation),
            target,
            reset,
            outcome: CommandOutcome::default(),
            variables: VariableStore::new(),
            previous: None,
            mu_plugins: Vec::new(),
        }
    }

    /// Creates a session described by `config`.
    #[must_use]
    pub fn from_config(config: &Config, shell: Arc<dyn ShellExecutor>) -> Self {
        let target = Arc::new(ConfiguredTarget::from_config(config));
        Self::new(shell, &config.environment, target, config.reset.clone())
    }

    /// Outcome of the most recent command.
    #[must_use]
    pub fn outcome(&self) -> &CommandOutcome {
        &self.outcome
    }

    /// Scenario variables.
    #[must_use]
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// The last command as written, before variable resolution.
    #[must_use]
    pub fn previous_command(&self) -> Option<&str> {
        self.previous.as_ref().map(|p| p.command.as_str())
    }

    /// Must-use plugins injected and not yet removed.
    #[must_use]
    pub fn injected_plugins(&self) -> &[String] {
        &self.mu_plugins
    }

    /// Forgets everything from a previous scenario.
    ///
    /// Injected plugins are not removed here; see
    /// [`TestSession::remove_injected_plugins`].
    pub fn reset(&mut self) {
        self.outcome = CommandOutcome::default();
        self.variables.clear();
        self.previous = None;
    }

    fn execute(&mut self, command: &str, tolerates_failure: bool) -> Result<(), StepError> {
        self.previous =
            Some(PreviousCommand { command: command.to_string(), tolerates_failure });
        self.outcome = self.runner.execute(command, tolerates_failure, &self.variables)?;
        if !tolerates_failure && self.outcome.exit_code != 0 {
            return Err(StepError::CommandFailed {
                command: command.to_string(),
                outcome: self.outcome.clone(),
            });
        }
        Ok(())
    }

    /// Runs `command`, failing if it exits nonzero.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::CommandFailed`] on a nonzero exit, or the
    /// runner's error if the command could not be run.
    pub fn run(&mut self, command: &str) -> Result<(), StepError> {
        self.execute(command, false)
    }

    /// Runs `command`, accepting any exit code.
    ///
    /// # Errors
    ///
    /// Returns the runner's error if the command could not be run.
    pub fn try_run(&mut self, command: &str) -> Result<(), StepError> {
        self.execute(command, true)
    }

    /// Runs the previous command again, with the same failure tolerance.
    ///
    /// Variables are resolved again, so values saved since then apply.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NoPreviousCommand`] if nothing has run yet,
    /// otherwise whatever [`TestSession::run`] or [`TestSession::try_run`]
    /// would.
    pub fn repeat_previous(&mut self) -> Result<(), StepError> {
        let previous = self.previous.clone().ok_or(StepError::NoPreviousCommand)?;
        self.execute(&previous.command, previous.tolerates_failure)
    }

    /// Saves the trimmed standard output under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidVariableName`] for a malformed name.
    pub fn save_output(&mut self, name: &str) -> Result<(), StepError> {
        let value = self.outcome.stdout.trim().to_string();
        debug!(name, %value, "saving variable");
        self.variables.set(name, value)
    }

    /// Assertions over the current outcome.
    #[must_use]
    pub fn expect(&self) -> Expectations<'_> {
        Expectations::new(&self.outcome, &self.variables)
    }

    /// Checks whether `path` exists inside the environment.
    ///
    /// Relative paths are relative to the plugin directory. The probe does
    /// not replace the current outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe cannot run or prints something other
    /// than its markers.
    pub fn path_exists(&self, path: &str, kind: PathKind) -> Result<bool, StepError> {
        let path = self.variables.resolve(path);
        let probe = php::eval_command(&format!(
            "echo {}({}) ? \"{EXISTS_MARKER}\" : \"{MISSING_MARKER}\";",
            kind.php_check(),
            php::string_literal(&path),
        ));
        let outcome = self.runner.execute(&probe, false, &VariableStore::new())?;
        match outcome.stdout.trim() {
            EXISTS_MARKER if outcome.exit_code == 0 => Ok(true),
            MISSING_MARKER if outcome.exit_code == 0 => Ok(false),
            _ => Err(StepError::Maintenance {
                operation: "existence check",
                detail: format!(
                    "probe for {kind} {path:?} exited with {}\nSTDOUT:\n{}\nSTDERR:\n{}",
                    outcome.exit_code, outcome.stdout, outcome.stderr
                ),
            }),
        }
    }

    /// Asserts that `path` is (or, when `negated`, is not) a `kind`.
    ///
    /// # Errors
    ///
    /// Returns an assertion error if the expectation does not hold, or the
    /// probe's error.
    pub fn assert_path(&self, path: &str, kind: PathKind, negated: bool) -> Result<(), StepError> {
        let exists = self.path_exists(path, kind)?;
        if exists == negated {
            let (expected, actual) = if negated {
                ("absent", "present")
            } else {
                ("present", "absent")
            };
            return Err(crate::error::AssertionError::Mismatch {
                what: format!("{kind} {path} should{} exist", if negated { " not" } else { "" }),
                expected: expected.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Deletes scenario-created content and accounts and clears caches.
    ///
    /// # Errors
    ///
    /// Returns an error as soon as one reset command fails.
    pub fn reset_database(&self) -> Result<(), StepError> {
        database::reset(&self.runner, &self.reset, self.target.as_ref())
    }

    /// Installs `source` as the must-use plugin `name`.
    ///
    /// The plugin is removed again by
    /// [`TestSession::remove_injected_plugins`].
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name or if the file cannot be written.
    pub fn inject_mu_plugin(&mut self, name: &str, source: &str) -> Result<(), StepError> {
        let name = mu_plugins::normalize_name(name)?.to_string();
        self.maintenance("must-use plugin injection", &mu_plugins::inject_command(&name, source))?;
        info!(plugin = %name, "injected must-use plugin");
        if !self.mu_plugins.contains(&name) {
            self.mu_plugins.push(name);
        }
        Ok(())
    }

    /// Removes the must-use plugin `name`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name or if the file cannot be removed.
    pub fn remove_mu_plugin(&mut self, name: &str) -> Result<(), StepError> {
        let name = mu_plugins::normalize_name(name)?.to_string();
        self.maintenance("must-use plugin removal", &mu_plugins::remove_command(&name))?;
        self.mu_plugins.retain(|injected| *injected != name);
        Ok(())
    }

    /// Removes every must-use plugin this session injected.
    ///
    /// # Errors
    ///
    /// Returns the first removal error; the remaining plugins stay tracked.
    pub fn remove_injected_plugins(&mut self) -> Result<(), StepError> {
        while let Some(name) = self.mu_plugins.last().cloned() {
            self.remove_mu_plugin(&name)?;
        }
        Ok(())
    }

    fn maintenance(&self, operation: &'static str, command: &str) -> Result<(), StepError> {
        let outcome = self.runner.execute(command, false, &VariableStore::new())?;
        if outcome.exit_code != 0 {
            return Err(StepError::Maintenance {
                operation,
                detail: format!(
                    "exited with {}\nSTDOUT:\n{}\nSTDERR:\n{}",
                    outcome.exit_code, outcome.stdout, outcome.stderr
                ),
            });
        }
        Ok(())
    }
}
