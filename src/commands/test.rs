//! `wpenv-bdd test` command.

use std::path::Path;

use crate::bdd::{self, Suite};
use crate::config::Config;
use crate::context::ServiceContext;

/// Execute the `test` command.
///
/// Scenarios run on a single-threaded runtime. A recording is written after
/// the run whether or not it passed.
///
/// # Errors
///
/// Returns an error string if the features path does not exist, the
/// runtime cannot start, any scenario failed, or the cassette cannot be
/// written.
pub fn run(
    config: Config,
    ctx: ServiceContext,
    features: &Path,
    name: Option<String>,
) -> Result<(), String> {
    if !features.exists() {
        return Err(format!("Features path not found: {}", features.display()));
    }

    let suite = Suite::new(config, ctx).install()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;
    let result = runtime.block_on(bdd::run_features(features, name));

    if let Some(path) = suite.context().save_recording()? {
        eprintln!("Recording saved to: {}", path.display());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_features_path_is_reported() {
        let config = Config { plugin: "hello-dolly".into(), ..Config::default() };
        let err =
            run(config, ServiceContext::live(), Path::new("/nonexistent/features"), None)
                .unwrap_err();
        assert!(err.contains("Features path not found"));
    }
}
