//! The plugin under test.

use crate::config::Config;
use crate::error::StepError;
use crate::runner::CommandRunner;
use crate::variables::VariableStore;

/// Describes the plugin a suite exercises.
///
/// Implement this once per plugin. Only the slug is required; the tool
/// defaults to WP-CLI and cleanup to nothing.
pub trait PluginTarget: Send + Sync + std::fmt::Debug {
    /// Directory name of the plugin under the plugins root.
    fn plugin_slug(&self) -> &str;

    /// Executable every step command is passed to.
    fn tool_command(&self) -> &str {
        "wp"
    }

    /// Plugin-specific cleanup run at the end of a database reset.
    ///
    /// # Errors
    ///
    /// Returns an error if a cleanup command cannot be run or fails.
    fn cleanup(&self, _runner: &CommandRunner) -> Result<(), StepError> {
        Ok(())
    }
}

/// A [`PluginTarget`] built from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredTarget {
    slug: String,
    tool: String,
    cleanup_commands: Vec<String>,
}

impl ConfiguredTarget {
    /// Target for `slug` using WP-CLI and no cleanup.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into(), tool: "wp".to_string(), cleanup_commands: Vec::new() }
    }

    /// Target described by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            slug: config.plugin.clone(),
            tool: config.tool.clone(),
            cleanup_commands: config.reset.cleanup_commands.clone(),
        }
    }
}

impl PluginTarget for ConfiguredTarget {
    fn plugin_slug(&self) -> &str {
        &self.slug
    }

    fn tool_command(&self) -> &str {
        &self.tool
    }

    fn cleanup(&self, runner: &CommandRunner) -> Result<(), StepError> {
        let variables = VariableStore::new();
        for command in &self.cleanup_commands {
            let outcome = runner.execute(command, false, &variables)?;
            if outcome.exit_code != 0 {
                return Err(StepError::CommandFailed { command: command.clone(), outcome });
            }
        }
        Ok(())
    }
}
