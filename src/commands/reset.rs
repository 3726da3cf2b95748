//! `wpenv-bdd reset-db` command.

use std::sync::Arc;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::session::TestSession;

/// Execute the `reset-db` command.
///
/// # Errors
///
/// Returns an error string if any reset command fails.
pub fn run(config: &Config, ctx: &ServiceContext) -> Result<(), String> {
    let session = TestSession::from_config(config, Arc::clone(&ctx.shell));
    session.reset_database().map_err(|e| e.to_string())?;
    println!("Database reset for {}", config.plugin);
    Ok(())
}
