//! Command dispatch and handlers.

pub mod exec;
pub mod reset;
pub mod test;

use std::path::PathBuf;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::context::ServiceContext;

/// Loads configuration and applies the command line's cassette flags.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
pub fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(record) = &cli.record {
        config.cassette.record = Some(record.clone());
        config.cassette.replay = None;
    }
    if let Some(replay) = &cli.replay {
        config.cassette.replay = Some(replay.clone());
        config.cassette.record = None;
    }
    config.validate()?;
    Ok(config)
}

/// Dispatch a parsed command to its handler.
///
/// With `--record` (or `WPENV_BDD_RECORD`), every command run is written
/// to a cassette once the handler finishes, even if it failed.
///
/// # Errors
///
/// Returns an error string if configuration fails or the selected command
/// handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let config = load_config(cli)?;
    let ctx = ServiceContext::from_config(&config)?;

    match &cli.command {
        Command::Test { features, name } => {
            let features = features.clone().unwrap_or_else(|| config.features.clone());
            test::run(config, ctx, &features, name.clone())
        }
        Command::Exec { tolerate_failure, command } => {
            let result = exec::run(&config, &ctx, command, *tolerate_failure);
            finish_recording(&ctx)?;
            result
        }
        Command::ResetDb => {
            let result = reset::run(&config, &ctx);
            finish_recording(&ctx)?;
            result
        }
    }
}

/// Writes the cassette, if recording, and prints where it went.
fn finish_recording(ctx: &ServiceContext) -> Result<Option<PathBuf>, String> {
    let saved = ctx.save_recording()?;
    if let Some(path) = &saved {
        eprintln!("Recording saved to: {}", path.display());
    }
    Ok(saved)
}
