//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `wpenv-bdd`.
#[derive(Debug, Parser)]
#[command(
    name = "wpenv-bdd",
    version,
    about = "Run behaviour scenarios against a WordPress plugin in wp-env"
)]
pub struct Cli {
    /// Configuration file (defaults to `wpenv-bdd.yaml` if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Record every command and its output to this cassette.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "replay")]
    pub record: Option<PathBuf>,

    /// Answer commands from this cassette instead of the environment.
    #[arg(long, global = true, value_name = "PATH")]
    pub replay: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run Gherkin features.
    Test {
        /// Feature file or directory (defaults to the configured `features`).
        features: Option<PathBuf>,
        /// Only run scenarios whose name contains this text.
        #[arg(long)]
        name: Option<String>,
    },
    /// Run one command through the harness and print what it captured.
    Exec {
        /// Accept a nonzero exit code.
        #[arg(long = "try")]
        tolerate_failure: bool,
        /// Command passed to the configured tool, e.g. `plugin list`.
        command: String,
    },
    /// Delete scenario-created content and accounts and clear caches.
    ResetDb,
}
