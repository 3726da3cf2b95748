//! Returning the WordPress database to a near-fresh state between scenarios.

use tracing::info;

use crate::config::ResetSettings;
use crate::error::StepError;
use crate::runner::{CommandOutcome, CommandRunner};
use crate::target::PluginTarget;
use crate::variables::VariableStore;

const OPERATION: &str = "database reset";

/// Lists every post id of every type and status.
pub const LIST_POSTS: &str =
    "post list --post_type=any --post_status=any --posts_per_page=-1 --format=ids";
/// Lists every user id.
pub const LIST_USERS: &str = "user list --field=ID";
/// Clears transients.
pub const DELETE_TRANSIENTS: &str = "transient delete --all";
/// Clears the object cache.
pub const FLUSH_CACHE: &str = "cache flush";

fn failed(command: &str, outcome: &CommandOutcome) -> StepError {
    StepError::Maintenance {
        operation: OPERATION,
        detail: format!(
            "`{command}` exited with {}\nSTDOUT:\n{}\nSTDERR:\n{}",
            outcome.exit_code, outcome.stdout, outcome.stderr
        ),
    }
}

fn run(runner: &CommandRunner, command: &str) -> Result<CommandOutcome, StepError> {
    let outcome = runner.execute(command, false, &VariableStore::new())?;
    if outcome.exit_code != 0 {
        return Err(failed(command, &outcome));
    }
    Ok(outcome)
}

/// Parses whitespace-separated numeric ids.
///
/// # Errors
///
/// Returns [`StepError::Maintenance`] naming the first token that is not an id.
pub fn parse_ids(command: &str, output: &str) -> Result<Vec<u64>, StepError> {
    output
        .split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| StepError::Maintenance {
                operation: OPERATION,
                detail: format!("`{command}` printed {token:?} where an id was expected"),
            })
        })
        .collect()
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter().map(u64::to_string).collect::<Vec<_>>().join(" ")
}

/// Deletes content and accounts created by scenarios and clears caches.
///
/// Keeps the default content and the primary administrator, then runs the
/// target's own cleanup.
///
/// # Errors
///
/// Returns an error as soon as one of the commands fails.
pub fn reset(
    runner: &CommandRunner,
    settings: &ResetSettings,
    target: &dyn PluginTarget,
) -> Result<(), StepError> {
    info!(plugin = target.plugin_slug(), "resetting database");

    let posts: Vec<u64> = parse_ids(LIST_POSTS, &run(runner, LIST_POSTS)?.stdout)?
        .into_iter()
        .filter(|id| !settings.keep_post_ids.contains(id))
        .collect();
    if !posts.is_empty() {
        run(runner, &format!("post delete {} --force", join_ids(&posts)))?;
    }

    let users: Vec<u64> = parse_ids(LIST_USERS, &run(runner, LIST_USERS)?.stdout)?
        .into_iter()
        .filter(|id| *id != settings.admin_id)
        .collect();
    if !users.is_empty() {
        run(
            runner,
            &format!("user delete {} --yes --reassign={}", join_ids(&users), settings.admin_id),
        )?;
    }

    run(runner, DELETE_TRANSIENTS)?;
    run(runner, FLUSH_CACHE)?;
    target.cleanup(runner)?;

    info!(posts = posts.len(), users = users.len(), "database reset complete");
    Ok(())
}
