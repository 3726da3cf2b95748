//! Behaviour-driven test harness for WordPress plugins running in wp-env.
//!
//! Commands are run inside the environment's CLI container, their output
//! is cleaned of environment noise and split into standard output and
//! `Error:`/`Warning:` blocks, and Gherkin steps assert on the result.

pub mod adapters;
pub mod assertions;
pub mod bdd;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod mu_plugins;
pub mod php;
pub mod ports;
pub mod runner;
pub mod session;
pub mod target;
pub mod variables;

pub use error::{AssertionError, StepError};
pub use session::TestSession;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug output for
/// this crate with `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "warn,wpenv_bdd=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    init_logging(cli.verbose);
    commands::dispatch(&cli)
}
