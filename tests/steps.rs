//! Step definitions driven through cucumber against a scripted environment.
//!
//! The suite is process-wide, so every feature run lives in one test.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wpenv_bdd::bdd::{self, Suite};
use wpenv_bdd::config::Config;
use wpenv_bdd::context::ServiceContext;
use wpenv_bdd::ports::{ShellExecutor, ShellOutput};
use wpenv_bdd::runner::CommandRunner;
use wpenv_bdd::target::PluginTarget;
use wpenv_bdd::variables::VariableStore;
use wpenv_bdd::StepError;

/// Answers each command line by the first rule whose needle it contains.
struct ScriptedEnv {
    rules: Vec<(&'static str, &'static str, i32)>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedEnv {
    fn commands(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    fn count(&self, needles: &[&str]) -> usize {
        self.commands().iter().filter(|c| needles.iter().all(|n| c.contains(n))).count()
    }
}

impl ShellExecutor for ScriptedEnv {
    fn run(&self, command: &str) -> Result<ShellOutput, Box<dyn std::error::Error + Send + Sync>> {
        self.seen.lock().unwrap().push(command.to_string());
        let (_, stdout, exit_code) = self
            .rules
            .iter()
            .find(|(needle, _, _)| command.contains(needle))
            .ok_or_else(|| format!("unscripted command: {command}"))?;
        Ok(ShellOutput { exit_code: *exit_code, stdout: (*stdout).to_string(), stderr: String::new() })
    }
}

fn scripted_env() -> ScriptedEnv {
    ScriptedEnv {
        rules: vec![
            ("post list --post_type=any", "1 2 3 12\n", 0),
            ("post delete 12 --force", "Success: Deleted post 12.\n", 0),
            ("user list --field=ID", "1\n", 0),
            ("transient delete --all", "Success: 3 transients deleted from the database.\n", 0),
            ("cache flush", "Success: The cache was flushed.\n", 0),
            ("option delete hello_dolly_cache", "Success: Deleted 'hello_dolly_cache' option.\n", 0),
            ("is_file(\"hello.php\")", "EXISTS", 0),
            ("is_file(\"gone.txt\")", "MISSING", 0),
            ("is_dir(\"assets\")", "EXISTS", 0),
            ("is_dir(\"missing-dir\")", "MISSING", 0),
            ("base64_decode", "", 0),
            ("unlink", "", 0),
            ("option get hello_dolly_lyric", "Well, hello, Dolly\n", 0),
            ("option update hello_dolly_echo", "Success: Updated 'hello_dolly_echo' option.\n", 0),
            ("option get missing_option", "Error: Could not get 'missing_option' option.\n", 1),
            (
                "plugin get hello-dolly",
                "{\"name\":\"hello-dolly\",\"status\":\"active\",\"version\":\"1.7.2\"}\n",
                0,
            ),
            (
                "plugin activate hello-dolly",
                "ℹ Starting 'wp plugin activate hello-dolly' on the cli container.\n\
                 Plugin 'hello-dolly' activated.\n\
                 Success: Activated 1 of 1 plugins.\n",
                0,
            ),
            ("post create", "42\n", 0),
            (
                "post get 42 --format=json",
                "{\"ID\":42,\"post_title\":\"Lyrics\",\"post_status\":\"publish\"}\n",
                0,
            ),
            ("post get 999999", "Error: Could not find the post with ID 999999.\n", 1),
            ("get_the_title", "Forced\n", 0),
        ],
        seen: Mutex::new(Vec::new()),
    }
}

/// Plugin with its own tool flags and cleanup.
#[derive(Debug, Default)]
struct HelloDolly {
    cleanups: AtomicUsize,
}

impl PluginTarget for HelloDolly {
    fn plugin_slug(&self) -> &str {
        "hello-dolly"
    }

    fn tool_command(&self) -> &str {
        "wp --skip-themes"
    }

    fn cleanup(&self, runner: &CommandRunner) -> Result<(), StepError> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        let command = "option delete hello_dolly_cache";
        let outcome = runner.execute(command, false, &VariableStore::new())?;
        if outcome.exit_code != 0 {
            return Err(StepError::CommandFailed { command: command.to_string(), outcome });
        }
        Ok(())
    }
}

fn write_feature(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn step_vocabulary_runs_against_custom_target() {
    let env = Arc::new(scripted_env());
    let target = Arc::new(HelloDolly::default());
    let config = Config { plugin: "hello-dolly".into(), ..Config::default() };
    let shell: Arc<dyn ShellExecutor> = env.clone();
    Suite::with_target(config, ServiceContext::with_shell(shell), target.clone())
        .install()
        .unwrap();

    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    bdd::run_features(&manifest.join("tests/features"), None).await.unwrap();
    bdd::run_features(&manifest.join("demos/features"), None).await.unwrap();

    // Three backgrounds plus one explicit reset, then four demo backgrounds.
    assert_eq!(target.cleanups.load(Ordering::SeqCst), 8);
    assert!(env.commands().iter().all(|c| c.contains("bash -c 'wp --skip-themes ")));
    assert_eq!(env.count(&["hello_dolly_echo '\\''Well, hello, Dolly'\\''"]), 1);
    assert_eq!(env.count(&["option get missing_option"]), 2);
    // lyric-filter is removed by its step; force-title when its scenario ends.
    assert_eq!(env.count(&["unlink", "/lyric-filter.php"]), 1);
    assert_eq!(env.count(&["unlink", "/force-title.php"]), 1);

    let dir = tempfile::tempdir().unwrap();
    let mismatch = write_feature(
        dir.path(),
        "mismatch.feature",
        "Feature: Plugin status\n\
         \n\
         \x20 Scenario: Expect the wrong status\n\
         \x20   When I run `plugin get hello-dolly --format=json`\n\
         \x20   Then STDOUT should be JSON containing:\n\
         \x20     \"\"\"\n\
         \x20     {\"status\": \"inactive\"}\n\
         \x20     \"\"\"\n",
    );
    let err = bdd::run_features(&mismatch, None).await.unwrap_err();
    assert!(err.starts_with("1 step(s) failed"), "{err}");

    let undefined = write_feature(
        dir.path(),
        "undefined.feature",
        "Feature: Unknown steps\n\
         \n\
         \x20 Scenario: A step nobody defined\n\
         \x20   When I run `option get hello_dolly_lyric`\n\
         \x20   Then the lyric should be catchy\n",
    );
    assert!(bdd::run_features(&undefined, None).await.is_err());

    let filtered = bdd::run_features(&mismatch, Some("no such scenario".to_string())).await;
    assert!(filtered.is_ok());
}
