//! Binary entrypoint for the `wpenv-bdd` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Environment overrides may come from a .env file next to the features.
    dotenvy::dotenv().ok();
    match wpenv_bdd::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
