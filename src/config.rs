//! Harness configuration.
//!
//! Settings come from `wpenv-bdd.yaml` and are then overridden by
//! `WPENV_BDD_*` environment variables (a `.env` file is loaded first by the
//! binary). Only the plugin slug is mandatory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wpenv-bdd.yaml";

/// How commands reach the WordPress container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentSettings {
    /// Environment tool, e.g. `npx wp-env`.
    pub binary: String,
    /// Service (container) commands run in.
    pub service: String,
    /// Plugins directory relative to the WordPress root.
    pub plugin_root: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            binary: "npx wp-env".to_string(),
            service: "cli".to_string(),
            plugin_root: "wp-content/plugins".to_string(),
        }
    }
}

/// What a database reset keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResetSettings {
    /// Content created by a fresh install (sample post, sample page, privacy policy).
    pub keep_post_ids: Vec<u64>,
    /// The primary administrator account.
    pub admin_id: u64,
    /// Plugin-specific commands run at the end of every reset.
    pub cleanup_commands: Vec<String>,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self { keep_post_ids: vec![1, 2, 3], admin_id: 1, cleanup_commands: Vec::new() }
    }
}

/// Optional record/replay of shell interactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CassetteSettings {
    /// Record every command to this cassette.
    pub record: Option<PathBuf>,
    /// Serve every command from this cassette instead of the environment.
    pub replay: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Plugin slug; its directory under `plugin_root` is the working directory.
    pub plugin: String,
    /// Executable every command is passed to.
    pub tool: String,
    /// Container access.
    pub environment: EnvironmentSettings,
    /// Database reset behaviour.
    pub reset: ResetSettings,
    /// Directory holding `.feature` files.
    pub features: PathBuf,
    /// Record/replay.
    pub cassette: CassetteSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin: String::new(),
            tool: "wp".to_string(),
            environment: EnvironmentSettings::default(),
            reset: ResetSettings::default(),
            features: PathBuf::from("features"),
            cassette: CassetteSettings::default(),
        }
    }
}

impl Config {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or has unknown keys.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse configuration: {e}"))
    }

    /// Loads configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if
    /// it exists, then applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `path` cannot be read, the file
    /// cannot be parsed, or the result is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut config = match path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
                Self::from_yaml(&yaml)?
            }
            None => match std::fs::read_to_string(DEFAULT_CONFIG_FILE) {
                Ok(yaml) => Self::from_yaml(&yaml)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
                Err(e) => return Err(format!("Failed to read config {DEFAULT_CONFIG_FILE}: {e}")),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `WPENV_BDD_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(plugin) = lookup("WPENV_BDD_PLUGIN") {
            self.plugin = plugin;
        }
        if let Some(tool) = lookup("WPENV_BDD_TOOL") {
            self.tool = tool;
        }
        if let Some(binary) = lookup("WPENV_BDD_ENV_BINARY") {
            self.environment.binary = binary;
        }
        if let Some(service) = lookup("WPENV_BDD_SERVICE") {
            self.environment.service = service;
        }
        if let Some(record) = lookup("WPENV_BDD_RECORD") {
            self.cassette.record = Some(PathBuf::from(record));
        }
        if let Some(replay) = lookup("WPENV_BDD_REPLAY") {
            self.cassette.replay = Some(PathBuf::from(replay));
        }
    }

    /// Checks that the configuration can be used.
    ///
    /// # Errors
    ///
    /// Returns an error if no plugin slug is set, the slug contains path
    /// separators, or recording and replaying are both requested.
    pub fn validate(&self) -> Result<(), String> {
        if self.plugin.trim().is_empty() {
            return Err(format!(
                "No plugin configured: set `plugin` in {DEFAULT_CONFIG_FILE} or WPENV_BDD_PLUGIN"
            ));
        }
        if self.plugin.contains(['/', '\\']) {
            return Err(format!("Invalid plugin slug {:?}", self.plugin));
        }
        if self.tool.trim().is_empty() {
            return Err("Tool command must not be empty".to_string());
        }
        if self.cassette.record.is_some() && self.cassette.replay.is_some() {
            return Err("Cannot record and replay a cassette at the same time".to_string());
        }
        Ok(())
    }
}
