//! Gherkin integration.
//!
//! [`WpEnvWorld`] wraps a [`TestSession`] per scenario; the step
//! definitions in [`steps`] bind the step vocabulary to session operations.
//! All scenarios of a run share one [`Suite`], so they go through the same
//! shell (and the same recording or replay cursor).

pub mod steps;

use std::path::Path;
use std::sync::{Arc, OnceLock};

use cucumber::writer::Stats as _;
use cucumber::World;
use tracing::{info, warn};

use crate::config::Config;
use crate::context::{ServiceContext, UnconfiguredShellExecutor};
use crate::session::TestSession;
use crate::target::{ConfiguredTarget, PluginTarget};

/// Configuration, plugin target and shell shared by every scenario of a run.
#[derive(Debug)]
pub struct Suite {
    config: Config,
    context: ServiceContext,
    target: Arc<dyn PluginTarget>,
}

static SUITE: OnceLock<Suite> = OnceLock::new();

impl Suite {
    /// Bundles a configuration with the context commands run through.
    ///
    /// The plugin target is built from the configuration.
    #[must_use]
    pub fn new(config: Config, context: ServiceContext) -> Self {
        let target = Arc::new(ConfiguredTarget::from_config(&config));
        Self::with_target(config, context, target)
    }

    /// Like [`Suite::new`], for a plugin that implements its own target.
    #[must_use]
    pub fn with_target(
        config: Config,
        context: ServiceContext,
        target: Arc<dyn PluginTarget>,
    ) -> Self {
        Self { config, context, target }
    }

    /// Builds a suite from the working directory's configuration.
    ///
    /// A configuration problem does not abort the run: every command then
    /// fails with it, so each scenario reports the cause.
    #[must_use]
    pub fn from_environment() -> Self {
        let loaded =
            Config::load(None).and_then(|config| Ok((ServiceContext::from_config(&config)?, config)));
        match loaded {
            Ok((context, config)) => Self::new(config, context),
            Err(reason) => {
                warn!("harness not configured: {reason}");
                let context =
                    ServiceContext::with_shell(Arc::new(UnconfiguredShellExecutor::new(reason)));
                Self::new(Config::default(), context)
            }
        }
    }

    /// Makes this the suite of the current process.
    ///
    /// # Errors
    ///
    /// Returns an error if a suite was already installed.
    pub fn install(self) -> Result<&'static Self, String> {
        SUITE.set(self).map_err(|_| "A test suite is already installed".to_string())?;
        SUITE.get().ok_or_else(|| "Test suite vanished after install".to_string())
    }

    /// The installed suite, building one from the environment if needed.
    #[must_use]
    pub fn current() -> &'static Self {
        SUITE.get_or_init(Self::from_environment)
    }

    /// Context commands run through.
    #[must_use]
    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    /// Creates a fresh session for one scenario.
    #[must_use]
    pub fn session(&self) -> TestSession {
        TestSession::new(
            Arc::clone(&self.context.shell),
            &self.config.environment,
            Arc::clone(&self.target),
            self.config.reset.clone(),
        )
    }
}

/// Cucumber world holding one scenario's session.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct WpEnvWorld {
    /// State of the running scenario.
    pub session: TestSession,
}

impl WpEnvWorld {
    /// Creates a world with a clean session from the current suite.
    #[must_use]
    pub fn new() -> Self {
        let mut session = Suite::current().session();
        session.reset();
        Self { session }
    }
}

impl Drop for WpEnvWorld {
    fn drop(&mut self) {
        if let Err(e) = self.session.remove_injected_plugins() {
            warn!("failed to remove must-use plugins: {e}");
        }
    }
}

/// Runs the features under `features` against the installed suite.
///
/// Scenarios run one at a time and a step without a definition fails.
/// With `name`, only scenarios whose name contains it are run.
///
/// # Errors
///
/// Returns an error if any step failed or was undefined, a hook failed, or
/// a feature file could not be parsed.
pub async fn run_features(features: &Path, name: Option<String>) -> Result<(), String> {
    info!(features = %features.display(), "running features");
    let writer = WpEnvWorld::cucumber()
        .fail_on_skipped()
        .max_concurrent_scenarios(1)
        .with_default_cli()
        .filter_run(features.to_path_buf(), move |_, _, scenario| {
            name.as_deref().is_none_or(|name| scenario.name.contains(name))
        })
        .await;

    if writer.execution_has_failed() {
        return Err(format!(
            "{} step(s) failed, {} parsing error(s), {} hook error(s)",
            writer.failed_steps(),
            writer.parsing_errors(),
            writer.hook_errors()
        ));
    }
    Ok(())
}
